use image::GrayImage;
use rayon::prelude::*;
use region_core::Keypoint;

use crate::config::KeypointConfig;
use crate::error::{KeypointError, KeypointResult};
use crate::fast::{detect_corners, non_maximum_suppression};
use crate::pyramid::{ImagePyramid, ScaleLevel};

/// Intensity-centroid orientation of a square patch, degrees in [0, 360).
/// The patch is clipped at the image border.
pub fn intensity_centroid_angle(img: &GrayImage, x: u32, y: u32, half: u32) -> f32 {
    let (w, h) = img.dimensions();
    let (x0, x1) = (x.saturating_sub(half), (x + half + 1).min(w));
    let (y0, y1) = (y.saturating_sub(half), (y + half + 1).min(h));

    let mut m10 = 0i64;
    let mut m01 = 0i64;
    for v in y0..y1 {
        let dy = v as i64 - y as i64;
        for u in x0..x1 {
            let dx = u as i64 - x as i64;
            let pixel = img.get_pixel(u, v)[0] as i64;
            m10 += pixel * dx;
            m01 += pixel * dy;
        }
    }

    if m10 == 0 && m01 == 0 {
        return 0.0;
    }
    let mut degrees = (m01 as f32).atan2(m10 as f32).to_degrees();
    if degrees < 0.0 {
        degrees += 360.0;
    }
    // -0.00001 + 360 rounds up in f32
    if degrees >= 360.0 { 0.0 } else { degrees }
}

/// Multi-scale FAST-9 detector
#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: KeypointConfig,
}

impl FastDetector {
    /// Creates a new FAST detector with validation
    pub fn new(cfg: KeypointConfig) -> KeypointResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &KeypointConfig {
        &self.cfg
    }

    pub fn build_pyramid(&self, img: &GrayImage) -> KeypointResult<ImagePyramid> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(KeypointError::InvalidInput { width, height });
        }
        Ok(ImagePyramid::build(img, self.cfg.levels, self.cfg.scale_factor))
    }

    /// Keypoints in base-image coordinates, strongest first, at most `max_keypoints`
    pub fn detect(&self, img: &GrayImage) -> KeypointResult<Vec<Keypoint>> {
        let pyramid = self.build_pyramid(img)?;
        Ok(self.detect_in_pyramid(&pyramid))
    }

    pub fn detect_in_pyramid(&self, pyramid: &ImagePyramid) -> Vec<Keypoint> {
        let per_level: Vec<Vec<Keypoint>> = pyramid
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(level, image)| self.detect_at_level(image, level))
            .collect();

        let mut keypoints: Vec<Keypoint> = per_level.into_iter().flatten().collect();
        keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
        keypoints.truncate(self.cfg.max_keypoints);
        keypoints
    }

    /// FAST, suppression and orientation on one pyramid level
    pub fn detect_at_level(&self, img: &GrayImage, level: &ScaleLevel) -> Vec<Keypoint> {
        let corners = detect_corners(img, self.cfg.threshold);
        let suppressed = non_maximum_suppression(&corners, self.cfg.nms_distance);
        log::debug!(
            "level {} ({}x{}): {} corners, {} after suppression",
            level.level,
            level.width,
            level.height,
            corners.len(),
            suppressed.len()
        );

        let half = (self.cfg.patch_size / 2) as u32;
        suppressed
            .into_iter()
            .map(|c| Keypoint {
                x: c.x as f32 * level.scale,
                y: c.y as f32 * level.scale,
                size: self.cfg.patch_size as f32 * level.scale,
                angle: intensity_centroid_angle(img, c.x, c.y, half),
                response: c.response,
                octave: level.level as i32,
                class_id: Keypoint::NO_CLASS,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn squares(size: u32, origins: &[(u32, u32)], side: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let inside = origins
                .iter()
                .any(|&(x0, y0)| x >= x0 && x < x0 + side && y >= y0 && y < y0 + side);
            if inside { Luma([230]) } else { Luma([20]) }
        })
    }

    #[test]
    fn test_centroid_angle_points_to_bright_side() {
        // bright right half
        let img = GrayImage::from_fn(31, 31, |x, _| if x > 15 { Luma([200]) } else { Luma([0]) });
        assert!(intensity_centroid_angle(&img, 15, 15, 7).abs() < 1e-3);

        // bright bottom half, +y is down
        let img = GrayImage::from_fn(31, 31, |_, y| if y > 15 { Luma([200]) } else { Luma([0]) });
        assert!((intensity_centroid_angle(&img, 15, 15, 7) - 90.0).abs() < 1e-3);

        // bright top half
        let img = GrayImage::from_fn(31, 31, |_, y| if y < 15 { Luma([200]) } else { Luma([0]) });
        assert!((intensity_centroid_angle(&img, 15, 15, 7) - 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_detect_keypoint_fields() {
        let detector = FastDetector::new(KeypointConfig::new()).unwrap();
        let keypoints = detector.detect(&squares(100, &[(30, 30)], 30)).unwrap();
        assert!(!keypoints.is_empty());

        for kp in &keypoints {
            assert!(kp.x >= 0.0 && kp.x < 100.0 && kp.y >= 0.0 && kp.y < 100.0);
            assert!((0.0..360.0).contains(&kp.angle));
            assert_eq!(kp.class_id, -1);
            assert!(kp.octave >= 0 && kp.octave < 8);
            assert!(kp.size >= 31.0);
        }
        // strongest first
        assert!(keypoints.windows(2).all(|w| w[0].response >= w[1].response));
        // the top-left corner is found on the base level
        assert!(keypoints.iter().any(|kp| kp.octave == 0 && kp.x == 30.0 && kp.y == 30.0));
    }

    #[test]
    fn test_max_keypoints_cap() {
        let origins: Vec<(u32, u32)> = (0..8).flat_map(|i| (0..8).map(move |j| (5 + i * 24, 5 + j * 24))).collect();
        let img = squares(200, &origins, 12);
        let cfg = KeypointConfig { max_keypoints: 10, ..KeypointConfig::new() };
        let keypoints = FastDetector::new(cfg).unwrap().detect(&img).unwrap();
        assert_eq!(keypoints.len(), 10);
    }

    #[test]
    fn test_flat_image_has_no_keypoints() {
        let detector = FastDetector::new(KeypointConfig::new()).unwrap();
        assert!(detector.detect(&GrayImage::from_pixel(64, 64, Luma([90]))).unwrap().is_empty());
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let detector = FastDetector::new(KeypointConfig::new()).unwrap();
        let result = detector.detect(&GrayImage::new(0, 0));
        assert!(matches!(result, Err(KeypointError::InvalidInput { width: 0, height: 0 })));
    }
}
