use image::imageops::{self, FilterType};
use image::GrayImage;

/// Smallest side of any level above the base
pub const MIN_LEVEL_SIZE: u32 = 32;

/// Scale information for pyramid levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub level: usize,
    /// Base-image pixels per level pixel
    pub scale: f32,
    pub width: u32,
    pub height: u32,
}

/// Downscaled copies of one image, finest first
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<(ScaleLevel, GrayImage)>,
}

impl ImagePyramid {
    /// Level geometry for a `width` x `height` base. The base is always present.
    pub fn scale_levels(width: u32, height: u32, max_levels: usize, scale_factor: f32) -> Vec<ScaleLevel> {
        let mut levels = vec![ScaleLevel { level: 0, scale: 1.0, width, height }];
        let mut scale = 1.0f32;

        for level in 1..max_levels {
            scale *= scale_factor;
            let scaled_width = (width as f32 / scale) as u32;
            let scaled_height = (height as f32 / scale) as u32;
            if scaled_width < MIN_LEVEL_SIZE || scaled_height < MIN_LEVEL_SIZE {
                break;
            }
            levels.push(ScaleLevel { level, scale, width: scaled_width, height: scaled_height });
        }
        levels
    }

    pub fn build(base: &GrayImage, max_levels: usize, scale_factor: f32) -> Self {
        let levels = Self::scale_levels(base.width(), base.height(), max_levels, scale_factor)
            .into_iter()
            .map(|sl| {
                let image = if sl.level == 0 {
                    base.clone()
                } else {
                    imageops::resize(base, sl.width, sl.height, FilterType::Triangle)
                };
                (sl, image)
            })
            .collect();
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&(ScaleLevel, GrayImage)> {
        self.levels.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (ScaleLevel, GrayImage)> {
        self.levels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_levels_stop_at_min_size() {
        let levels = ImagePyramid::scale_levels(100, 100, 8, 1.2);
        // 100, 83, 69, 57, 48, 40, 33; the next would be 27
        assert_eq!(levels.len(), 7);
        assert_eq!(levels[0].scale, 1.0);
        assert!(levels.iter().skip(1).all(|l| l.width >= MIN_LEVEL_SIZE && l.height >= MIN_LEVEL_SIZE));
    }

    #[test]
    fn test_level_cap() {
        let levels = ImagePyramid::scale_levels(2000, 1500, 8, 1.2);
        assert_eq!(levels.len(), 8);
        assert_eq!(levels[7].level, 7);
    }

    #[test]
    fn test_small_base_keeps_one_level() {
        let levels = ImagePyramid::scale_levels(20, 20, 8, 1.2);
        assert_eq!(levels.len(), 1);
        assert_eq!((levels[0].width, levels[0].height), (20, 20));
    }

    #[test]
    fn test_build_matches_geometry() {
        let base = GrayImage::from_fn(160, 120, |x, y| image::Luma([((x + y) % 256) as u8]));
        let pyramid = ImagePyramid::build(&base, 4, 1.5);
        assert_eq!(pyramid.len(), 4);
        for (level, image) in pyramid.iter() {
            assert_eq!((image.width(), image.height()), (level.width, level.height));
        }
    }
}
