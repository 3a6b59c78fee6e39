//! Constants used throughout the vstore core crate.

/// Storage root used when no explicit directory is configured.
pub const DEFAULT_STORAGE_ROOT: &str = "uploads";

/// User namespace applied to uploads that do not name one.
pub const DEFAULT_USER_ID: &str = "defaultUser";

/// Category applied to uploads that do not name one.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Default cap on a single upload request body (64 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
