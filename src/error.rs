//! Error types for heightmap generation and image I/O.

use std::path::PathBuf;

/// Errors produced by the pseudo-erosion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PseudoErosionError {
    /// Invalid generation parameters (bad size, zero feature size, ...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A file could not be read or written.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was readable but its contents are not a usable image.
    #[error("unsupported image '{}': {message}", .path.display())]
    Format { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, PseudoErosionError>;

impl PseudoErosionError {
    /// Map an `image` crate error onto the I/O vs. format split.
    pub fn from_image_error(path: impl Into<PathBuf>, err: image::ImageError) -> Self {
        let path = path.into();
        match err {
            image::ImageError::IoError(source) => Self::Io { path, source },
            other => Self::Format {
                path,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = PseudoErosionError::from_image_error("missing.png", image::ImageError::IoError(io));
        assert!(matches!(err, PseudoErosionError::Io { .. }));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_config_message() {
        let err = PseudoErosionError::Config("grid size must be positive".into());
        assert_eq!(err.to_string(), "invalid configuration: grid size must be positive");
    }
}
