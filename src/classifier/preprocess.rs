use image::{DynamicImage, imageops::FilterType};

use crate::config::ClassifierConfig;

/// Resize + normalize into a `[1, 3, size, size]` CHW tensor buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    pub image_size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

impl Preprocessor {
    #[must_use]
    pub const fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            image_size: config.image_size,
            mean: config.mean,
            std: config.std,
        }
    }

    #[must_use]
    pub const fn input_shape(&self) -> [usize; 4] {
        let side = self.image_size as usize;
        [1, 3, side, side]
    }

    #[must_use]
    pub fn run(&self, image: &DynamicImage) -> Vec<f32> {
        let resized = image.resize_exact(self.image_size, self.image_size, FilterType::Triangle);
        let rgb = resized.to_rgb8();
        let num_pixels = (rgb.width() * rgb.height()) as usize;

        let mut normalized = vec![0.0f32; 3 * num_pixels];

        for (i, pixel) in rgb.pixels().enumerate() {
            for c in 0..3 {
                let value = f32::from(pixel[c]) / 255.0;
                normalized[c * num_pixels + i] = (value - self.mean[c]) / self.std[c];
            }
        }

        normalized
    }
}
