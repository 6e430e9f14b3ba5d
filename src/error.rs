use std::path::{Path, PathBuf};

use spr::error::SprError;

#[derive(Debug, thiserror::Error)]
pub enum Gif2SprError {
    /// Bad option, origin string or enum name.
    #[error("{message}")]
    Configuration { message: String },
    #[error("{}: {source}", path.display())]
    SourceDecode {
        path: PathBuf,
        #[source]
        source: gif::DecodingError,
    },
    #[error("{}: {message}", path.display())]
    EmptySource { path: PathBuf, message: String },
    #[error("{}: {message}", path.display())]
    IOError {
        path: PathBuf,
        message: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Sprite {
        path: PathBuf,
        #[source]
        source: SprError,
    },
}

impl Gif2SprError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<Path>, message: &'static str, source: std::io::Error) -> Self {
        Self::IOError {
            path: path.as_ref().to_path_buf(),
            message,
            source,
        }
    }

    pub fn sprite(path: impl AsRef<Path>, source: SprError) -> Self {
        Self::Sprite {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
