use crate::error::DetectorError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::GrayImage;

/// Extract and decode the base64 payload of a `"<prefix>,<payload>"` string.
/// Only the segment between the first and second comma is used. Line breaks
/// and other ASCII whitespace inside the payload are ignored.
pub fn decode_data_uri(image_data: &str) -> Result<Vec<u8>, DetectorError> {
    let payload = image_data
        .split(',')
        .nth(1)
        .ok_or(DetectorError::MissingPayload)?;

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a single-channel frame
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage, DetectorError> {
    let image = image::load_from_memory(bytes).map_err(|_| DetectorError::InvalidImage)?;
    Ok(image.to_luma8())
}
