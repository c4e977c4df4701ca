use crate::error::{DescriptorError, DescriptorResult};
use crate::strategy::DescriptorStrategy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the grayscale image is turned into a map that contours are traced on
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Binarization {
    /// Canny edge map with hysteresis thresholds
    Edge { low: f32, high: f32 },
    /// Global threshold at the Otsu level, foreground above it
    Otsu,
}

impl Binarization {
    pub const DEFAULT_EDGE: Binarization = Binarization::Edge { low: 50.0, high: 255.0 };
}

impl Default for Binarization {
    fn default() -> Self {
        Self::DEFAULT_EDGE
    }
}

/// Which traced borders are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RetrievalMode {
    /// Outermost borders only
    #[default]
    External,
    /// Every border, hierarchy discarded
    List,
    /// Every border, organised as outer borders and their holes
    CComp,
    /// Every border with the full nesting hierarchy
    Tree,
}

/// Point reduction applied to traced borders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ApproximationMode {
    /// Keep every border pixel
    None,
    /// Keep only the end points of horizontal, vertical and diagonal runs
    #[default]
    Simple,
}

/// Reporting range for the principal-axis angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AngleConvention {
    /// `0.5 * atan(2 mu11 / (mu20 - mu02))` in degrees as computed, within [-45, 45]
    #[default]
    Signed,
    /// Signed angle shifted by 180 when negative, within [0, 180)
    Unsigned,
}

/// Column layout of the descriptor CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CsvFormat {
    /// `Area,Perimeter,roundness,cx,cy,orientation,h0..h6`
    #[default]
    Extended,
    /// `Area,Perimeter,roundness,orientation`
    Legacy,
}

/// Plausible-size window. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeFilter {
    pub min_area: f64,
    pub max_area: f64,
}

impl SizeFilter {
    pub const fn new(min_area: f64, max_area: f64) -> Self {
        Self { min_area, max_area }
    }

    /// Drops `area < min_area` and `area > max_area`
    pub fn accepts(&self, area: f64) -> bool {
        !(area < self.min_area || area > self.max_area)
    }

    /// Window that lets every measurable region through
    pub const fn unbounded() -> Self {
        Self { min_area: 0.0, max_area: f64::INFINITY }
    }
}

impl Default for SizeFilter {
    fn default() -> Self {
        Self { min_area: 1e2, max_area: 1e5 }
    }
}

/// Complete descriptor pipeline configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptorConfig {
    pub strategy: DescriptorStrategy,
    pub binarization: Binarization,
    pub retrieval: RetrievalMode,
    pub approximation: ApproximationMode,
    pub size_filter: SizeFilter,
    pub angle_convention: AngleConvention,
    pub hu_moments: bool,
    pub sort_by_area: bool,
    pub csv_format: CsvFormat,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorConfig {
    /// Edge-based extraction, convex-hull regions, extended CSV
    pub fn new() -> Self {
        Self {
            strategy: DescriptorStrategy::ConvexHull,
            binarization: Binarization::default(),
            retrieval: RetrievalMode::External,
            approximation: ApproximationMode::Simple,
            size_filter: SizeFilter::default(),
            angle_convention: AngleConvention::Signed,
            hu_moments: true,
            sort_by_area: false,
            csv_format: CsvFormat::Extended,
            name: None,
            description: None,
        }
    }

    /// Otsu threshold over every border, four-column CSV
    pub fn legacy_preset() -> Self {
        Self {
            strategy: DescriptorStrategy::ConvexHull,
            binarization: Binarization::Otsu,
            retrieval: RetrievalMode::CComp,
            approximation: ApproximationMode::Simple,
            size_filter: SizeFilter::default(),
            angle_convention: AngleConvention::Signed,
            hu_moments: false,
            sort_by_area: false,
            csv_format: CsvFormat::Legacy,
            name: Some("Legacy".to_string()),
            description: Some("Otsu threshold, all borders, four-column CSV".to_string()),
        }
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "DescriptorConfig: strategy={:?}, binarization={:?}, retrieval={:?}, approximation={:?}, area=[{}, {}], angle={:?}, hu={}, sorted={}, csv={:?}",
            self.strategy,
            self.binarization,
            self.retrieval,
            self.approximation,
            self.size_filter.min_area,
            self.size_filter.max_area,
            self.angle_convention,
            self.hu_moments,
            self.sort_by_area,
            self.csv_format
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> DescriptorResult<()> {
        let SizeFilter { min_area, max_area } = self.size_filter;
        if min_area.is_nan() || max_area.is_nan() || min_area < 0.0 {
            return Err(DescriptorError::InvalidConfig(format!(
                "size filter bounds must be non-negative numbers, got [{}, {}]",
                min_area, max_area
            )));
        }
        if min_area > max_area {
            return Err(DescriptorError::InvalidConfig(format!(
                "size filter minimum {} exceeds maximum {}",
                min_area, max_area
            )));
        }
        if let Binarization::Edge { low, high } = self.binarization {
            if !(low >= 0.0 && low <= high) {
                return Err(DescriptorError::InvalidConfig(format!(
                    "edge thresholds must satisfy 0 <= low <= high, got low={} high={}",
                    low, high
                )));
            }
        }
        if self.csv_format == CsvFormat::Extended && !self.hu_moments {
            log::debug!("extended CSV without Hu moments leaves h0..h6 empty");
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
