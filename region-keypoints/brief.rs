use image::GrayImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use region_core::{Descriptor, Keypoint};

use crate::pyramid::ImagePyramid;

/// Bits per descriptor
pub const DESCRIPTOR_BITS: usize = 256;

/// Sampling offsets stay inside this radius so a rotated pair fits a 31 px patch
pub const PATTERN_RADIUS: i32 = 13;

/// Seed of the default sampling pattern. Descriptors are only comparable
/// when they were built from the same pattern.
pub const DEFAULT_PATTERN_SEED: u64 = 0x0b12_1ef5;

/// One intensity comparison: bit set when `p1` is darker than `p2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePair {
    pub p1: (i32, i32),
    pub p2: (i32, i32),
}

/// Steered BRIEF over the pyramid level a keypoint was found on
#[derive(Debug, Clone)]
pub struct BriefExtractor {
    pattern: Vec<SamplePair>,
}

impl Default for BriefExtractor {
    fn default() -> Self {
        Self::with_seed(DEFAULT_PATTERN_SEED)
    }
}

impl BriefExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut offset = || (rng.random_range(-PATTERN_RADIUS..=PATTERN_RADIUS), rng.random_range(-PATTERN_RADIUS..=PATTERN_RADIUS));
        let pattern = (0..DESCRIPTOR_BITS)
            .map(|_| {
                let p1 = offset();
                let mut p2 = offset();
                while p2 == p1 {
                    p2 = offset();
                }
                SamplePair { p1, p2 }
            })
            .collect();
        Self { pattern }
    }

    pub fn pattern(&self) -> &[SamplePair] {
        &self.pattern
    }

    /// One descriptor per keypoint, in keypoint order. Keypoints must come from
    /// a detector run over `pyramid`.
    pub fn compute(&self, pyramid: &ImagePyramid, keypoints: &[Keypoint]) -> Vec<Descriptor> {
        keypoints
            .par_iter()
            .map(|kp| match pyramid.level(kp.octave.max(0) as usize) {
                Some((level, image)) => self.describe(image, kp.x / level.scale, kp.y / level.scale, kp.angle),
                None => [0u8; 32],
            })
            .collect()
    }

    /// Descriptor of the patch around `(cx, cy)` rotated by `angle_degrees`
    pub fn describe(&self, img: &GrayImage, cx: f32, cy: f32, angle_degrees: f32) -> Descriptor {
        let (s, c) = angle_degrees.to_radians().sin_cos();
        let rotate = |(dx, dy): (i32, i32)| {
            let (dx, dy) = (dx as f32, dy as f32);
            (cx + c * dx - s * dy, cy + s * dx + c * dy)
        };

        let mut d = [0u8; 32];
        for (i, pair) in self.pattern.iter().enumerate() {
            let (x1, y1) = rotate(pair.p1);
            let (x2, y2) = rotate(pair.p2);
            if bilinear_sample(img, x1, y1) < bilinear_sample(img, x2, y2) {
                d[i / 8] |= 1 << (i % 8);
            }
        }
        d
    }
}

/// Bilinear interpolation, nearest pixel outside the image
pub fn bilinear_sample(img: &GrayImage, x: f32, y: f32) -> f32 {
    let (w, h) = img.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();

    if x0 < 0.0 || y0 < 0.0 || x0 + 1.0 >= w as f32 || y0 + 1.0 >= h as f32 {
        let cx = x.round().clamp(0.0, (w - 1) as f32) as u32;
        let cy = y.round().clamp(0.0, (h - 1) as f32) as u32;
        return img.get_pixel(cx, cy)[0] as f32;
    }

    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as u32, y0 as u32);
    let p00 = img.get_pixel(x0, y0)[0] as f32;
    let p10 = img.get_pixel(x0 + 1, y0)[0] as f32;
    let p01 = img.get_pixel(x0, y0 + 1)[0] as f32;
    let p11 = img.get_pixel(x0 + 1, y0 + 1)[0] as f32;

    let top = p00 * (1.0 - fx) + p10 * fx;
    let bottom = p01 * (1.0 - fx) + p11 * fx;
    top * (1.0 - fy) + bottom * fy
}
