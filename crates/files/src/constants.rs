//! Naming constants for on-disk artifacts.

/// Separator between a stem and its version token: `<stem>_v<N><ext>`.
pub const VERSION_MARKER: &str = "_v";

/// Prefix of in-flight temporary files. Hidden, so it can never collide with a valid stem.
pub const TEMP_FILE_PREFIX: &str = ".upload-";

/// Suffix of in-flight temporary files.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Prefix of per-file commit lock files. Hidden, like temp files.
pub const LOCK_FILE_PREFIX: &str = ".lock-";

/// Number of leading content bytes kept for media type detection.
pub(crate) const SNIFF_LEN: usize = 8 * 1024;

/// Copy buffer size used when streaming content to disk.
pub(crate) const COPY_BUFFER_LEN: usize = 64 * 1024;
