use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use region_core::{Descriptor, Keypoint};

use crate::brief::BriefExtractor;
use crate::config::KeypointConfig;
use crate::csv_export::write_keypoints_csv;
use crate::detector::FastDetector;
use crate::error::{KeypointError, KeypointResult};
use crate::matcher::{BruteForceMatcher, DescriptorMatch};

/// Keypoints and descriptors of one image, index-aligned
#[derive(Debug, Clone, Default)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

/// Result of comparing two images
#[derive(Debug, Clone)]
pub struct KeypointComparison {
    pub first: Features,
    /// Detected on the second image after resizing it to the first image's size
    pub second: Features,
    /// `query_idx` indexes `first`, `train_idx` indexes `second`
    pub matches: Vec<DescriptorMatch>,
}

/// Detect, describe and match keypoints between exactly two images
#[derive(Debug, Clone)]
pub struct KeypointPipeline {
    detector: FastDetector,
    extractor: BriefExtractor,
    matcher: BruteForceMatcher,
}

impl KeypointPipeline {
    pub fn new(config: KeypointConfig) -> KeypointResult<Self> {
        let matcher = BruteForceMatcher::new(config.cross_check);
        let detector = FastDetector::new(config)?;
        Ok(Self { detector, extractor: BriefExtractor::new(), matcher })
    }

    pub fn config(&self) -> &KeypointConfig {
        self.detector.config()
    }

    pub fn detector(&self) -> &FastDetector {
        &self.detector
    }

    pub fn matcher(&self) -> &BruteForceMatcher {
        &self.matcher
    }

    /// Keypoints and their descriptors for one grayscale image
    pub fn detect_and_compute(&self, img: &GrayImage) -> KeypointResult<Features> {
        let pyramid = self.detector.build_pyramid(img)?;
        let keypoints = self.detector.detect_in_pyramid(&pyramid);
        let descriptors = self.extractor.compute(&pyramid, &keypoints);
        Ok(Features { keypoints, descriptors })
    }

    /// Requires exactly two images. The second is resized to the first
    /// image's dimensions, then each image is described on its own.
    pub fn compare(&self, images: &[DynamicImage]) -> KeypointResult<KeypointComparison> {
        let [first, second] = images else {
            return Err(KeypointError::ImageCount { expected: 2, actual: images.len() });
        };
        for image in [first, second] {
            if image.width() == 0 || image.height() == 0 {
                return Err(KeypointError::InvalidInput { width: image.width(), height: image.height() });
            }
        }

        let gray1 = first.to_luma8();
        let mut gray2 = second.to_luma8();
        if gray2.dimensions() != gray1.dimensions() {
            log::debug!(
                "resizing second image {}x{} -> {}x{}",
                gray2.width(),
                gray2.height(),
                gray1.width(),
                gray1.height()
            );
            gray2 = imageops::resize(&gray2, gray1.width(), gray1.height(), FilterType::Triangle);
        }

        let first = self.detect_and_compute(&gray1)?;
        let second = self.detect_and_compute(&gray2)?;
        let matches = self.matcher.match_descriptors(&first.descriptors, &second.descriptors);

        log::info!(
            "{} / {} keypoints, {} matches",
            first.keypoints.len(),
            second.keypoints.len(),
            matches.len()
        );
        Ok(KeypointComparison { first, second, matches })
    }

    /// Compare and write both keypoint sets. Nothing is written when the
    /// comparison fails.
    pub fn compare_and_export<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        images: &[DynamicImage],
        first_csv: P,
        second_csv: Q,
    ) -> KeypointResult<KeypointComparison> {
        let comparison = self.compare(images)?;
        write_keypoints_csv(&comparison.first.keypoints, first_csv)?;
        write_keypoints_csv(&comparison.second.keypoints, second_csv)?;
        Ok(comparison)
    }
}
