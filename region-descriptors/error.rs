use std::path::PathBuf;

/// Why a region could not be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateKind {
    TooFewPoints(usize),
    ZeroArea,
    ZeroPerimeter,
}

impl std::fmt::Display for DegenerateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateKind::TooFewPoints(n) => write!(f, "{} points (need at least 3)", n),
            DegenerateKind::ZeroArea => write!(f, "zero enclosed area"),
            DegenerateKind::ZeroPerimeter => write!(f, "zero perimeter"),
        }
    }
}

#[derive(Debug)]
pub enum DescriptorError {
    /// Empty or zero-sized image handed to the extractor
    InvalidInput { width: u32, height: u32 },
    /// A single region cannot be measured; pipelines skip it
    DegenerateGeometry(DegenerateKind),
    InvalidConfig(String),
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
}

impl std::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorError::InvalidInput { width, height } => {
                write!(f, "Invalid input image: {}x{} (must be non-empty)", width, height)
            }
            DescriptorError::DegenerateGeometry(kind) => {
                write!(f, "Degenerate region: {}", kind)
            }
            DescriptorError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            DescriptorError::Io { path, source } => {
                write!(f, "Cannot write {}: {}", path.display(), source)
            }
            DescriptorError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for DescriptorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DescriptorError::Io { source, .. } => Some(source),
            DescriptorError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for DescriptorError {
    fn from(err: csv::Error) -> Self {
        DescriptorError::Csv(err)
    }
}

impl From<DegenerateKind> for DescriptorError {
    fn from(kind: DegenerateKind) -> Self {
        DescriptorError::DegenerateGeometry(kind)
    }
}

pub type DescriptorResult<T> = Result<T, DescriptorError>;
