use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    File { path: PathBuf, reason: String },
    Decode { name: String, reason: String },
    MissingNode(String),
    UnsupportedFormat(String),
}

impl LoadError {
    pub fn file(path: impl Into<PathBuf>, error: impl Display) -> Self {
        Self::File {
            path: path.into(),
            reason: error.to_string(),
        }
    }

    pub fn decode(name: impl Into<String>, error: impl Display) -> Self {
        Self::Decode {
            name: name.into(),
            reason: error.to_string(),
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::File { path, reason } => write!(f, "failed to read {}: {}", path.display(), reason),
            LoadError::Decode { name, reason } => write!(f, "failed to decode {name}: {reason}"),
            LoadError::MissingNode(name) => write!(f, "node {name} does not exist"),
            LoadError::UnsupportedFormat(format) => write!(f, "unsupported format {format}"),
        }
    }
}

impl std::error::Error for LoadError {}
