//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads process-wide environment variables, which keeps behaviour consistent across
//! worker threads and test harnesses. The `*_from_env_value` helpers take the raw variable value so
//! binaries decide where values come from and tests can exercise parsing without touching the
//! environment.

use crate::constants::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_STORAGE_ROOT};
use crate::{StoreError, StoreResult};
use std::path::{Path, PathBuf};
use vstore_files::StoreOptions;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage_root: PathBuf,
    allow_empty_uploads: bool,
    max_upload_bytes: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        storage_root: PathBuf,
        allow_empty_uploads: bool,
        max_upload_bytes: usize,
    ) -> StoreResult<Self> {
        if storage_root.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig(
                "storage root cannot be empty".into(),
            ));
        }
        if max_upload_bytes == 0 {
            return Err(StoreError::InvalidConfig(
                "max upload size must be greater than zero".into(),
            ));
        }

        Ok(Self {
            storage_root,
            allow_empty_uploads,
            max_upload_bytes,
        })
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn allow_empty_uploads(&self) -> bool {
        self.allow_empty_uploads
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            allow_empty_uploads: self.allow_empty_uploads,
        }
    }
}

/// Resolve the storage root. `None` or blank falls back to [`DEFAULT_STORAGE_ROOT`].
pub fn storage_root_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT))
}

/// Parse the empty-upload policy. `None` or blank means uploads may be empty.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
pub fn allow_empty_uploads_from_env_value(value: Option<String>) -> StoreResult<bool> {
    let Some(raw) = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
    else {
        return Ok(true);
    };

    match raw.as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(StoreError::InvalidConfig(format!(
            "'{other}' is not a valid boolean for the empty upload policy"
        ))),
    }
}

/// Parse the upload size cap in bytes. `None` or blank falls back to [`DEFAULT_MAX_UPLOAD_BYTES`].
pub fn max_upload_bytes_from_env_value(value: Option<String>) -> StoreResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<usize>().map_err(|e| {
                StoreError::InvalidConfig(format!("invalid max upload size '{v}': {e}"))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_root() {
        let result = CoreConfig::new(PathBuf::new(), true, 1024);
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_zero_limit() {
        let result = CoreConfig::new(PathBuf::from("uploads"), true, 0);
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_store_options_follow_config() {
        let cfg = CoreConfig::new(PathBuf::from("uploads"), false, 1024).unwrap();
        assert!(!cfg.store_options().allow_empty_uploads);
        assert_eq!(cfg.max_upload_bytes(), 1024);
        assert_eq!(cfg.storage_root(), Path::new("uploads"));
    }

    #[test]
    fn test_storage_root_defaults() {
        assert_eq!(
            storage_root_from_env_value(None),
            PathBuf::from(DEFAULT_STORAGE_ROOT)
        );
        assert_eq!(
            storage_root_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_STORAGE_ROOT)
        );
        assert_eq!(
            storage_root_from_env_value(Some(" /srv/files ".into())),
            PathBuf::from("/srv/files")
        );
    }

    #[test]
    fn test_allow_empty_uploads_parsing() {
        assert!(allow_empty_uploads_from_env_value(None).unwrap());
        assert!(allow_empty_uploads_from_env_value(Some("".into())).unwrap());
        assert!(allow_empty_uploads_from_env_value(Some("YES".into())).unwrap());
        assert!(!allow_empty_uploads_from_env_value(Some("0".into())).unwrap());
        assert!(!allow_empty_uploads_from_env_value(Some(" false ".into())).unwrap());
        assert!(allow_empty_uploads_from_env_value(Some("maybe".into())).is_err());
    }

    #[test]
    fn test_max_upload_bytes_parsing() {
        assert_eq!(
            max_upload_bytes_from_env_value(None).unwrap(),
            DEFAULT_MAX_UPLOAD_BYTES
        );
        assert_eq!(
            max_upload_bytes_from_env_value(Some("2048".into())).unwrap(),
            2048
        );
        assert!(max_upload_bytes_from_env_value(Some("-1".into())).is_err());
        assert!(max_upload_bytes_from_env_value(Some("lots".into())).is_err());
    }
}
