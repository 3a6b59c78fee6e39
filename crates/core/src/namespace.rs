//! Namespace resolution.
//!
//! A namespace is the `(user_id, category)` pair that selects a storage subdirectory:
//! `<storage_root>/<user_id>/<category>/`. Resolution is pure path derivation; it never touches
//! the filesystem. Both segments are validated as [`PathSegment`]s so a resolved directory can
//! never escape the storage root.

use crate::constants::{DEFAULT_CATEGORY, DEFAULT_USER_ID};
use crate::{StoreError, StoreResult};
use std::path::{Path, PathBuf};
use vstore_types::PathSegment;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    user_id: PathSegment,
    category: PathSegment,
}

impl Namespace {
    /// Builds a namespace from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidNamespace` if either value is empty, has leading or trailing
    /// whitespace, contains a path separator, is `.`/`..` or hidden, or is too long.
    pub fn new(user_id: &str, category: &str) -> StoreResult<Self> {
        Ok(Self {
            user_id: segment("userId", user_id)?,
            category: segment("category", category)?,
        })
    }

    /// Like [`Namespace::new`], but absent or blank values fall back to
    /// [`DEFAULT_USER_ID`] and [`DEFAULT_CATEGORY`].
    pub fn with_defaults(user_id: Option<&str>, category: Option<&str>) -> StoreResult<Self> {
        let user_id = user_id
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_USER_ID);
        let category = category
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        Self::new(user_id, category)
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// `<storage_root>/<user_id>/<category>`
    pub fn directory(&self, storage_root: &Path) -> PathBuf {
        storage_root.join(&self.user_id).join(&self.category)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.category)
    }
}

/// Resolves `(user_id, category)` to its directory under `storage_root`, applying defaults.
pub fn resolve_directory(
    storage_root: &Path,
    user_id: Option<&str>,
    category: Option<&str>,
) -> StoreResult<PathBuf> {
    Namespace::with_defaults(user_id, category).map(|ns| ns.directory(storage_root))
}

fn segment(field: &str, value: &str) -> StoreResult<PathSegment> {
    PathSegment::new(value).map_err(|e| StoreError::InvalidNamespace(format!("{field}: {e}")))
}
