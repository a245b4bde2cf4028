use image::GrayImage;
use imageproc::distance_transform::Norm;
use crate::{error::Result, traits::ImagePreprocessor};

/// Morphological opening (erosion then dilation) to drop speckle noise
#[derive(Debug, Clone, Default)]
pub struct OpeningPreprocessor {
    /// Radius of the structuring element; 0 leaves the mask untouched
    pub radius: u8,
}

impl OpeningPreprocessor {
    /// Build from a kernel size in pixels, as configured for the extractor.
    pub fn from_kernel_size(kernel_size: u32) -> Self {
        Self {
            radius: u8::try_from(kernel_size / 2).unwrap_or(u8::MAX),
        }
    }
}

impl ImagePreprocessor for OpeningPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        if self.radius == 0 {
            return Ok(image.clone());
        }
        Ok(imageproc::morphology::open(image, Norm::L1, self.radius))
    }
}

/// Collapse class labels to a binary mask: every non-zero label becomes 255
#[derive(Debug, Clone, Default)]
pub struct ForegroundPreprocessor;

impl ImagePreprocessor for ForegroundPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(imageproc::map::map_pixels(image, |_, _, p| {
            image::Luma([if p[0] > 0 { 255u8 } else { 0u8 }])
        }))
    }
}
