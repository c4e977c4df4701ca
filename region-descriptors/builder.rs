use crate::config::{
    AngleConvention, ApproximationMode, Binarization, CsvFormat, DescriptorConfig, RetrievalMode, SizeFilter,
};
use crate::error::DescriptorResult;
use crate::pipeline::DescriptorPipeline;
use crate::strategy::DescriptorStrategy;

/// Builder for creating a `DescriptorPipeline`
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: DescriptorConfig,
}

impl PipelineBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from an existing `DescriptorConfig`
    pub fn from_config(config: DescriptorConfig) -> Self {
        Self { config }
    }

    /// Set the region representation strategy
    pub fn strategy(mut self, strategy: DescriptorStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn binarization(mut self, binarization: Binarization) -> Self {
        self.config.binarization = binarization;
        self
    }

    /// Use a Canny edge map with the given hysteresis thresholds
    pub fn edge_thresholds(mut self, low: f32, high: f32) -> Self {
        self.config.binarization = Binarization::Edge { low, high };
        self
    }

    /// Use a global Otsu threshold instead of edges
    pub fn otsu(mut self) -> Self {
        self.config.binarization = Binarization::Otsu;
        self
    }

    pub fn retrieval(mut self, retrieval: RetrievalMode) -> Self {
        self.config.retrieval = retrieval;
        self
    }

    pub fn approximation(mut self, approximation: ApproximationMode) -> Self {
        self.config.approximation = approximation;
        self
    }

    /// Set the inclusive plausible-area window
    pub fn size_filter(mut self, min_area: f64, max_area: f64) -> Self {
        self.config.size_filter = SizeFilter::new(min_area, max_area);
        self
    }

    /// Keep every measurable region regardless of area
    pub fn unbounded_size(mut self) -> Self {
        self.config.size_filter = SizeFilter::unbounded();
        self
    }

    pub fn angle_convention(mut self, convention: AngleConvention) -> Self {
        self.config.angle_convention = convention;
        self
    }

    /// Enable or disable Hu moment invariants
    pub fn hu_moments(mut self, enable: bool) -> Self {
        self.config.hu_moments = enable;
        self
    }

    /// Enable or disable ascending area order
    pub fn sort_by_area(mut self, enable: bool) -> Self {
        self.config.sort_by_area = enable;
        self
    }

    pub fn csv_format(mut self, format: CsvFormat) -> Self {
        self.config.csv_format = format;
        self
    }

    /// Apply the legacy preset
    pub fn preset_legacy(mut self) -> Self {
        self.config = DescriptorConfig::legacy_preset();
        self
    }

    pub fn metadata(mut self, name: &str, description: &str) -> Self {
        self.config = self.config.with_metadata(name, description);
        self
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Convert the builder into a validated `DescriptorConfig`
    pub fn to_config(self) -> DescriptorResult<DescriptorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build the `DescriptorPipeline`
    pub fn build(self) -> DescriptorResult<DescriptorPipeline> {
        DescriptorPipeline::new(self.config)
    }
}
