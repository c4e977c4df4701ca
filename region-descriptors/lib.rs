//! Region descriptors: contour extraction, region representation strategies,
//! geometric measurements and CSV export.
//!
//! ```no_run
//! use region_descriptors::PipelineBuilder;
//!
//! let image = image::open("coins.png")?;
//! let pipeline = PipelineBuilder::new().sort_by_area(true).build()?;
//! let descriptors = pipeline.describe_and_export(&image, "out/coins.csv")?;
//! print!("{}", descriptors.report());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod calculator;
pub mod collection;
pub mod config;
pub mod csv_export;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod strategy;
pub mod types;

pub use builder::PipelineBuilder;
pub use calculator::{centroid, log_scaled_hu, orientation, roundness, DescriptorCalculator};
pub use collection::{shape_distance, DescriptorCollection, RegionPairing};
pub use config::{
    AngleConvention, ApproximationMode, Binarization, CsvFormat, DescriptorConfig, RetrievalMode, SizeFilter,
};
pub use csv_export::{EXTENDED_HEADER, LEGACY_HEADER};
pub use error::{DegenerateKind, DescriptorError, DescriptorResult};
pub use extractor::{RegionExtractor, TracedContour};
pub use pipeline::{DescriptorPipeline, RegionComparison};
pub use strategy::DescriptorStrategy;
pub use types::{ImageDescriptor, RegionDescriptor};

pub use region_core::{BoundingBox, Contour, Point};
