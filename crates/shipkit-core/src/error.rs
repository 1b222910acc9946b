//! Error type shared by every shipkit operation.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShipkitError {
    #[error("IO error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image error on {}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("no icon sizes configured")]
    NoIconSizes,
    #[error("invalid icon size {0}: must be between 1 and 256")]
    InvalidIconSize(u32),
    #[error("cannot parse {field} from {}", .path.display())]
    VersionNotFound { path: PathBuf, field: &'static str },
    #[error("invalid version {version:?}: {reason}")]
    InvalidVersion { version: String, reason: String },
    #[error("branding {key} contains a double quote: {value:?}")]
    InvalidBranding { key: &'static str, value: String },
    #[error("{count} target file(s) out of sync: {}", .files.join(", "))]
    OutOfSync { count: usize, files: Vec<String> },
}

pub type ShipkitResult<T> = Result<T, ShipkitError>;

impl ShipkitError {
    pub(crate) fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| ShipkitError::Io { path, source }
    }

    pub(crate) fn image(path: impl AsRef<Path>) -> impl FnOnce(image::ImageError) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| ShipkitError::Image { path, source }
    }
}
