use crate::config::KeypointConfig;
use crate::error::KeypointResult;
use crate::pipeline::KeypointPipeline;

/// Builder for creating a `KeypointPipeline`
#[derive(Debug, Clone, Default)]
pub struct KeypointPipelineBuilder {
    config: KeypointConfig,
}

impl KeypointPipelineBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from an existing `KeypointConfig`
    pub fn from_config(config: KeypointConfig) -> Self {
        Self { config }
    }

    /// Set the FAST threshold (1-127)
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the patch size for orientation calculation
    pub fn patch_size(mut self, patch_size: usize) -> Self {
        self.config.patch_size = patch_size;
        self
    }

    pub fn levels(mut self, levels: usize) -> Self {
        self.config.levels = levels;
        self
    }

    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.config.scale_factor = scale_factor;
        self
    }

    /// Set the non-maximum suppression (NMS) distance
    pub fn nms_distance(mut self, distance: f32) -> Self {
        self.config.nms_distance = distance;
        self
    }

    pub fn max_keypoints(mut self, max: usize) -> Self {
        self.config.max_keypoints = max;
        self
    }

    /// Enable or disable mutual nearest-neighbour filtering
    pub fn cross_check(mut self, enable: bool) -> Self {
        self.config.cross_check = enable;
        self
    }

    /// Apply the dense preset
    pub fn preset_dense(mut self) -> Self {
        self.config = KeypointConfig::dense_preset();
        self
    }

    /// Apply the coarse preset
    pub fn preset_coarse(mut self) -> Self {
        self.config = KeypointConfig::coarse_preset();
        self
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Convert the builder into a validated `KeypointConfig`
    pub fn to_config(self) -> KeypointResult<KeypointConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build the `KeypointPipeline`
    pub fn build(self) -> KeypointResult<KeypointPipeline> {
        KeypointPipeline::new(self.config)
    }
}
