use vstore_files::FilesError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Files(#[from] FilesError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The failure classes callers translate into responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unsafe or malformed user id or category
    InvalidNamespace,
    /// Missing file, unusable file name, or rejected content
    InvalidUpload,
    /// Namespace directory or requested version absent
    NotFound,
    /// Filesystem failure or misconfiguration
    StorageIo,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidNamespace(_) => ErrorKind::InvalidNamespace,
            StoreError::InvalidConfig(_) => ErrorKind::StorageIo,
            StoreError::Files(e) => match e {
                FilesError::InvalidUpload(_) | FilesError::InvalidFileName(_) => {
                    ErrorKind::InvalidUpload
                }
                FilesError::InvalidPath(_) => ErrorKind::InvalidNamespace,
                FilesError::NotFound(_) => ErrorKind::NotFound,
                FilesError::InvalidRootDirectory(_) | FilesError::StorageIo(_) => {
                    ErrorKind::StorageIo
                }
            },
        }
    }
}
