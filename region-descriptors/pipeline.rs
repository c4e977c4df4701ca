use std::path::Path;

use image::DynamicImage;
use region_core::Contour;

use crate::calculator::DescriptorCalculator;
use crate::collection::{DescriptorCollection, RegionPairing};
use crate::config::DescriptorConfig;
use crate::error::{DescriptorError, DescriptorResult};
use crate::extractor::RegionExtractor;

/// Result of describing two images and pairing their regions by shape
#[derive(Debug, Clone, PartialEq)]
pub struct RegionComparison {
    pub first: DescriptorCollection,
    pub second: DescriptorCollection,
    pub pairs: Vec<RegionPairing>,
}

/// Image to descriptor collection: extract, represent, measure, filter, order
#[derive(Debug, Clone)]
pub struct DescriptorPipeline {
    config: DescriptorConfig,
    extractor: RegionExtractor,
    calculator: DescriptorCalculator,
}

impl DescriptorPipeline {
    /// Validates the configuration before anything runs
    pub fn new(config: DescriptorConfig) -> DescriptorResult<Self> {
        config.validate()?;
        let extractor = RegionExtractor::new(config.binarization, config.retrieval, config.approximation);
        let calculator = DescriptorCalculator::new(config.angle_convention, config.hu_moments);
        Ok(Self { config, extractor, calculator })
    }

    pub fn config(&self) -> &DescriptorConfig {
        &self.config
    }

    pub fn extractor(&self) -> &RegionExtractor {
        &self.extractor
    }

    pub fn describe(&self, image: &DynamicImage) -> DescriptorResult<DescriptorCollection> {
        let contours = self.extractor.extract_regions(image)?;
        Ok(self.describe_contours(&contours))
    }

    /// Degenerate regions and regions outside the size filter are dropped;
    /// everything else is kept in detection order unless sorting is enabled.
    pub fn describe_contours(&self, contours: &[Contour]) -> DescriptorCollection {
        let mut collection = DescriptorCollection::new();
        let mut skipped = 0usize;
        let mut filtered = 0usize;

        for (index, region) in self.config.strategy.describe_all(contours).iter().enumerate() {
            match self.calculator.compute_descriptor(region) {
                Ok(descriptor) if self.config.size_filter.accepts(descriptor.area) => collection.push(descriptor),
                Ok(_) => filtered += 1,
                Err(DescriptorError::DegenerateGeometry(kind)) => {
                    match region.contour().bounding_box() {
                        Some(bounds) => log::debug!("skipping region {} at {}: {}", index, bounds, kind),
                        None => log::debug!("skipping region {}: {}", index, kind),
                    }
                    skipped += 1;
                }
                Err(e) => {
                    log::warn!("skipping region {}: {}", index, e);
                    skipped += 1;
                }
            }
        }

        if self.config.sort_by_area {
            collection.sort_by_area();
        }

        log::info!(
            "{} contours -> {} descriptors ({} degenerate, {} outside size filter, strategy {})",
            contours.len(),
            collection.len(),
            skipped,
            filtered,
            self.config.strategy
        );
        collection
    }

    /// Describe and write the configured CSV format to `path`.
    /// The collection is returned even though it is also on disk.
    pub fn describe_and_export<P: AsRef<Path>>(&self, image: &DynamicImage, path: P) -> DescriptorResult<DescriptorCollection> {
        let collection = self.describe(image)?;
        self.export(&collection, path)?;
        Ok(collection)
    }

    pub fn export<P: AsRef<Path>>(&self, collection: &DescriptorCollection, path: P) -> DescriptorResult<()> {
        collection.write_csv(path, self.config.csv_format)
    }

    /// Describe both images and pair each region of the first with the
    /// closest region of the second by Hu-moment distance
    pub fn compare(&self, first: &DynamicImage, second: &DynamicImage) -> DescriptorResult<RegionComparison> {
        if !self.config.hu_moments {
            log::warn!("Hu moments disabled, no regions can be paired");
        }
        let first = self.describe(first)?;
        let second = self.describe(second)?;
        let pairs = first.pair_by_shape(&second);
        Ok(RegionComparison { first, second, pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CsvFormat, SizeFilter};
    use crate::strategy::DescriptorStrategy;

    fn square(x: i32, y: i32, side: i32) -> Contour {
        Contour::from_coords(&[(x, y), (x + side, y), (x + side, y + side), (x, y + side)])
    }

    #[test]
    fn test_filter_and_skip() {
        let pipeline = DescriptorPipeline::new(DescriptorConfig::new()).unwrap();
        let contours = vec![
            square(0, 0, 10),                                // 100, kept
            Contour::from_coords(&[(0, 0), (5, 5)]),         // too few points
            Contour::from_coords(&[(0, 0), (5, 5), (9, 9)]), // collinear
            square(0, 0, 9),                                 // 81, filtered
            square(0, 0, 400),                               // 160000, filtered
            square(50, 50, 20),                              // 400, kept
        ];
        let collection = pipeline.describe_contours(&contours);
        let areas: Vec<f64> = collection.iter().map(|d| d.area).collect();
        assert_eq!(areas, [100.0, 400.0]);
    }

    #[test]
    fn test_sort_by_area_option() {
        let mut config = DescriptorConfig::new();
        config.sort_by_area = true;
        config.strategy = DescriptorStrategy::Unmodified;
        let pipeline = DescriptorPipeline::new(config).unwrap();

        let collection = pipeline.describe_contours(&[square(0, 0, 30), square(0, 0, 12), square(0, 0, 20)]);
        let areas: Vec<f64> = collection.iter().map(|d| d.area).collect();
        assert_eq!(areas, [144.0, 400.0, 900.0]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = DescriptorConfig::new();
        config.size_filter = SizeFilter::new(10.0, 1.0);
        assert!(matches!(DescriptorPipeline::new(config), Err(DescriptorError::InvalidConfig(_))));
    }

    #[test]
    fn test_describe_and_export_writes_configured_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.csv");
        let mut config = DescriptorConfig::new();
        config.csv_format = CsvFormat::Legacy;
        let pipeline = DescriptorPipeline::new(config).unwrap();

        let image = DynamicImage::new_luma8(50, 50);
        let collection = pipeline.describe_and_export(&image, &path).unwrap();
        assert!(collection.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Area,Perimeter,roundness,orientation\n");
    }

    #[test]
    fn test_zero_sized_image_fails_fast() {
        let pipeline = DescriptorPipeline::new(DescriptorConfig::new()).unwrap();
        let result = pipeline.describe(&DynamicImage::new_luma8(0, 0));
        assert!(matches!(result, Err(DescriptorError::InvalidInput { .. })));
    }
}
