use crate::error::{KeypointError, KeypointResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Detector, descriptor and matcher settings for the keypoint pipeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeypointConfig {
    /// FAST intensity threshold (1-127)
    pub threshold: u8,
    /// Orientation patch side at the base level, odd
    pub patch_size: usize,
    /// Upper bound on pyramid levels
    pub levels: usize,
    /// Downscale between consecutive levels
    pub scale_factor: f32,
    /// Minimum distance between keypoints kept on one level
    pub nms_distance: f32,
    /// Strongest keypoints kept per image
    pub max_keypoints: usize,
    /// Keep only mutual nearest neighbours when matching
    pub cross_check: bool,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for KeypointConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypointConfig {
    /// Create new configuration with default settings
    pub fn new() -> Self {
        Self {
            threshold: 20,
            patch_size: 31,
            levels: 8,
            scale_factor: 1.2,
            nms_distance: 3.0,
            max_keypoints: 500,
            cross_check: true,
            name: None,
            description: None,
        }
    }

    /// Lower threshold and a larger budget for low-contrast images
    pub fn dense_preset() -> Self {
        Self {
            threshold: 10,
            nms_distance: 2.0,
            max_keypoints: 2000,
            name: Some("Dense".to_string()),
            description: Some("Low threshold, many keypoints".to_string()),
            ..Self::new()
        }
    }

    /// Few strong corners on the finest levels only
    pub fn coarse_preset() -> Self {
        Self {
            threshold: 40,
            levels: 3,
            nms_distance: 6.0,
            max_keypoints: 150,
            name: Some("Coarse".to_string()),
            description: Some("High threshold, strong corners only".to_string()),
            ..Self::new()
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
            "KeypointConfig: threshold={}, patch={}, levels={}, scale={}, nms={}, max={}, cross_check={}",
            self.threshold,
            self.patch_size,
            self.levels,
            self.scale_factor,
            self.nms_distance,
            self.max_keypoints,
            self.cross_check
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> KeypointResult<()> {
        if self.threshold == 0 || self.threshold > 127 {
            return Err(KeypointError::InvalidThreshold(self.threshold));
        }
        if self.patch_size % 2 == 0 || self.patch_size < 7 {
            return Err(KeypointError::InvalidConfig(format!(
                "patch size must be odd and at least 7, got {}",
                self.patch_size
            )));
        }
        if self.levels == 0 {
            return Err(KeypointError::InvalidConfig("at least one pyramid level is required".to_string()));
        }
        if !(self.scale_factor > 1.0) {
            return Err(KeypointError::InvalidConfig(format!(
                "scale factor must be greater than 1, got {}",
                self.scale_factor
            )));
        }
        if !(self.nms_distance >= 0.0) {
            return Err(KeypointError::InvalidConfig(format!(
                "NMS distance must be non-negative, got {}",
                self.nms_distance
            )));
        }
        if self.max_keypoints == 0 {
            return Err(KeypointError::InvalidConfig("max keypoints must be positive".to_string()));
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
