//! Error types shared by the controller backends and the persistence layer.

use std::path::PathBuf;

/// Errors raised by fallible I/O around the controller core.
///
/// The core operations themselves (dead zones, edge detection, rumble decay)
/// never fail; only backend initialisation and file access do.
#[derive(Debug, thiserror::Error)]
pub enum JoyError {
    #[error("Controller backend error: {0}")]
    Backend(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Force feedback error: {0}")]
    ForceFeedback(#[from] gilrs::ff::Error),
}

impl JoyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JoyError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        JoyError::Parse {
            path: path.into(),
            source,
        }
    }
}
