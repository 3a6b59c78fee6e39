//! vstore artifact storage
//!
//! This crate owns the version-assignment and retrieval protocol for vstore.
//!
//! ## Storage model
//!
//! Every upload of a logical file becomes one immutable artifact whose version is encoded in its
//! file name. There is no index: the directory listing is the source of truth.
//!
//! ```text
//! <storage_root>/
//! └── <user_id>/
//!     └── <category>/
//!         ├── report_v1.pdf
//!         ├── report_v2.pdf
//!         └── notes_v1.txt
//! ```
//!
//! - Versions start at 1 and are assigned as `max(existing) + 1`
//! - Matching is exact on `<stem>_v<digits><extension>`, so `report` never claims `report2_v1`
//! - Artifacts are written to a hidden temporary file and renamed into place, so a reader never
//!   sees a partially written artifact under its final name
//! - Artifacts are linked into place with a call that fails if the name already exists, so a
//!   committed artifact is never replaced
//! - Commits for the same logical file are serialised through an in-process lock table and an
//!   exclusive `fs4` lock on a hidden `.lock-<stem><ext>` file, so separate processes sharing a
//!   storage root (server and CLI) never pick the same version; commits for different files run
//!   in parallel
//!
//! ## Example Usage
//!
//! ```no_run
//! use vstore_files::{StoreOptions, VersionStore};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = VersionStore::open(Path::new("uploads"), StoreOptions::default())?;
//! let directory = store.root().join("alice").join("invoices");
//!
//! let first = store.commit(&directory, "report.pdf", &b"%PDF-1.7"[..])?;
//! assert_eq!(first.version, 1);
//!
//! let latest = store.resolve_latest(&directory, "report", ".pdf")?;
//! assert_eq!(latest.file_name, "report_v1.pdf");
//! # Ok(())
//! # }
//! ```

mod constants;
mod lock;
mod naming;
mod store;

pub use constants::{LOCK_FILE_PREFIX, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX, VERSION_MARKER};
pub use naming::{is_lock_file_name, is_temp_file_name, LogicalName};
pub use store::{ArtifactDescriptor, StoreOptions, VersionStore};

/// Errors that can occur during artifact operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Storage root does not exist and cannot be created, or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// The upload itself is unusable (missing or unsafe original name, empty content when
    /// empty uploads are disabled)
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// A logical file name supplied for lookup cannot name an artifact
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// A directory outside the storage root was passed to the store
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Namespace directory or requested artifact does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Filesystem failure (permissions, disk full, rename failure)
    #[error("Storage I/O error: {0}")]
    StorageIo(#[from] std::io::Error),
}

pub type FilesResult<T> = std::result::Result<T, FilesError>;
