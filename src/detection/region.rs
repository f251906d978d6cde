use image::{imageops, GrayImage};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from signed classifier output, dropping boxes that fall
    /// entirely outside the image origin
    pub fn from_signed(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width);
        let y1 = y.saturating_add(height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }

    /// Clamp to the image bounds; None if nothing of the box remains
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> Option<Self> {
        if self.x >= image_width || self.y >= image_height {
            return None;
        }
        let width = self.width.min(image_width - self.x);
        let height = self.height.min(image_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self::new(self.x, self.y, width, height))
    }

    /// Copy the region of interest out of a grayscale frame
    pub fn crop(&self, gray: &GrayImage) -> Option<GrayImage> {
        let bounded = self.clamp_to(gray.width(), gray.height())?;
        Some(
            imageops::crop_imm(gray, bounded.x, bounded.y, bounded.width, bounded.height)
                .to_image(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_signed_clips_negative_origin() {
        assert_eq!(
            Region::from_signed(-5, 10, 20, 20),
            Some(Region::new(0, 10, 15, 20))
        );
        assert_eq!(Region::from_signed(-30, 0, 20, 20), None);
        assert_eq!(Region::from_signed(0, 0, 0, 10), None);
    }

    #[test]
    fn test_crop_clamps_to_image() {
        let gray = GrayImage::new(40, 30);

        let roi = Region::new(30, 20, 20, 20).crop(&gray).unwrap();
        assert_eq!(roi.dimensions(), (10, 10));

        assert!(Region::new(40, 0, 5, 5).crop(&gray).is_none());
        let full = Region::new(0, 0, 40, 30).crop(&gray).unwrap();
        assert_eq!(full.dimensions(), (40, 30));
    }
}
