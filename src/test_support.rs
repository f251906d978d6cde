use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use std::io::Cursor;

/// Encode an image as a browser-style PNG data URI
pub(crate) fn png_data_uri(image: &DynamicImage) -> String {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("PNG encoding of test image");
    format!("data:image/png;base64,{}", STANDARD.encode(buffer.into_inner()))
}

/// Plain grey frame with no content
pub(crate) fn blank_frame_uri(width: u32, height: u32) -> String {
    let image = RgbImage::from_pixel(width, height, image::Rgb([128, 128, 128]));
    png_data_uri(&DynamicImage::ImageRgb8(image))
}
