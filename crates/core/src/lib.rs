//! # vstore Core
//!
//! Core business logic for the vstore versioned file service:
//! - Runtime configuration resolved once at startup ([`CoreConfig`])
//! - Namespace resolution from `(user_id, category)` to a storage directory
//! - The [`StoreService`] facade over the version store in `vstore_files`
//!
//! **No API concerns**: HTTP servers, multipart parsing and response shapes belong in `api-rest`
//! and `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod namespace;
pub mod service;

pub use config::CoreConfig;
pub use constants::*;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use namespace::{resolve_directory, Namespace};
pub use service::StoreService;
pub use vstore_files::{ArtifactDescriptor, FilesError, LogicalName};
