use thiserror::Error;

/// Error type for storage backend operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested file does not exist (or is not a regular file)
    #[error("File not found")]
    NotFound,

    /// Any other filesystem failure, including an unreadable or missing root directory
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
