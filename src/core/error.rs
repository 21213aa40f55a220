use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not an MP3 file: {}", .0.display())]
    InvalidFormat(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("ID3: {0}")]
    Id3(#[from] id3::Error),
}

pub type TagResult<T> = Result<T, TagError>;

impl TagError {
    /// Classifies an IO failure on `path`, keeping permission problems distinct.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => TagError::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => TagError::PermissionDenied(path.into()),
            _ => TagError::Io(err),
        }
    }
}
