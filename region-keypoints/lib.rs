//! Scale-space keypoints for pairwise image comparison: FAST-9 over an image
//! pyramid, steered BRIEF descriptors and brute-force Hamming matching.

pub mod brief;
pub mod builder;
pub mod config;
pub mod csv_export;
pub mod detector;
pub mod error;
pub mod fast;
pub mod matcher;
pub mod pipeline;
pub mod pyramid;

pub use brief::{BriefExtractor, SamplePair};
pub use builder::KeypointPipelineBuilder;
pub use config::KeypointConfig;
pub use csv_export::{write_keypoints_csv, write_keypoints_to, KEYPOINT_HEADER};
pub use detector::{intensity_centroid_angle, FastDetector};
pub use error::{KeypointError, KeypointResult};
pub use matcher::{hamming_distance, BruteForceMatcher, DescriptorMatch};
pub use pipeline::{Features, KeypointComparison, KeypointPipeline};
pub use pyramid::{ImagePyramid, ScaleLevel};

pub use region_core::{Descriptor, Keypoint};
