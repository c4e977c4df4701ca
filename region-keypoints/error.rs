use std::path::PathBuf;

#[derive(Debug)]
pub enum KeypointError {
    /// Pairwise comparison needs exactly `expected` images
    ImageCount { expected: usize, actual: usize },
    InvalidInput { width: u32, height: u32 },
    InvalidThreshold(u8),
    InvalidConfig(String),
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
}

impl std::fmt::Display for KeypointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeypointError::ImageCount { expected, actual } => {
                write!(f, "Expected exactly {} images, got {}", expected, actual)
            }
            KeypointError::InvalidInput { width, height } => {
                write!(f, "Invalid input image: {}x{} (must be non-empty)", width, height)
            }
            KeypointError::InvalidThreshold(t) => {
                write!(f, "Invalid threshold: {} (must be 1-127)", t)
            }
            KeypointError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            KeypointError::Io { path, source } => {
                write!(f, "Cannot write {}: {}", path.display(), source)
            }
            KeypointError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for KeypointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeypointError::Io { source, .. } => Some(source),
            KeypointError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for KeypointError {
    fn from(err: csv::Error) -> Self {
        KeypointError::Csv(err)
    }
}

pub type KeypointResult<T> = Result<T, KeypointError>;
