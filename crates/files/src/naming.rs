//! Logical file names and the `<stem>_v<N><ext>` artifact naming scheme.

use crate::constants::{LOCK_FILE_PREFIX, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX, VERSION_MARKER};
use crate::{FilesError, FilesResult};
use vstore_types::{PathSegment, MAX_SEGMENT_BYTES};

/// Longest decimal rendering of a `u64` version token.
const MAX_TOKEN_DIGITS: usize = 20;

/// The versioning key of an upload: its stem plus its extension (with the leading dot).
///
/// `report.pdf` becomes stem `report`, extension `.pdf`; `archive.tar.gz` becomes stem
/// `archive.tar`, extension `.gz`; `Makefile` has an empty extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalName {
    stem: String,
    extension: String,
}

impl LogicalName {
    /// Splits a bare file name into stem and extension.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidFileName` if the name is empty, contains a path separator,
    /// is hidden (starts with `.`), or is too long to carry a version token.
    pub fn parse(file_name: &str) -> FilesResult<Self> {
        let segment = PathSegment::new(file_name)
            .map_err(|e| FilesError::InvalidFileName(e.to_string()))?;
        let name = segment.as_str();

        let (stem, extension) = match name.rfind('.') {
            Some(idx) if idx > 0 => name.split_at(idx),
            _ => (name, ""),
        };

        Self::from_parts(stem, extension)
    }

    /// Builds a logical name from an already split stem and extension.
    ///
    /// `extension` is either empty or a single dot followed by a dot-free suffix (`.pdf`). The
    /// stem is kept byte for byte, so `report ` (with its trailing space) and `report` are
    /// different logical files.
    pub fn from_parts(stem: &str, extension: &str) -> FilesResult<Self> {
        if stem.is_empty() {
            return Err(FilesError::InvalidFileName("file stem cannot be empty".into()));
        }

        if !extension.is_empty() {
            let valid = extension
                .strip_prefix('.')
                .is_some_and(|rest| !rest.contains(['.', '/', '\\', '\0']));
            if !valid {
                return Err(FilesError::InvalidFileName(format!(
                    "'{extension}' is not a valid extension"
                )));
            }
        }

        // The stem may end in whitespace when an extension follows; the whole name may not.
        PathSegment::new(format!("{stem}{extension}"))
            .map_err(|e| FilesError::InvalidFileName(e.to_string()))?;

        let longest = stem.len() + VERSION_MARKER.len() + MAX_TOKEN_DIGITS + extension.len();
        if longest > MAX_SEGMENT_BYTES {
            return Err(FilesError::InvalidFileName(format!(
                "'{stem}{extension}' is too long to version"
            )));
        }

        Ok(Self {
            stem: stem.to_owned(),
            extension: extension.to_owned(),
        })
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The on-disk name of version `version` of this file.
    pub fn artifact_name(&self, version: u64) -> String {
        format!("{}{}{}{}", self.stem, VERSION_MARKER, version, self.extension)
    }

    /// Returns the digit token if `entry` is exactly `<stem>_v<digits><extension>`.
    ///
    /// The token is returned unparsed so callers can tell `v2` and `v02` apart.
    pub fn match_token<'a>(&self, entry: &'a str) -> Option<&'a str> {
        let token = entry
            .strip_prefix(self.stem.as_str())?
            .strip_suffix(self.extension.as_str())?
            .strip_prefix(VERSION_MARKER)?;

        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            Some(token)
        } else {
            None
        }
    }
}

impl std::fmt::Display for LogicalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.stem, self.extension)
    }
}

/// Whether `name` is an in-flight temporary file written by a commit.
pub fn is_temp_file_name(name: &str) -> bool {
    name.starts_with(TEMP_FILE_PREFIX) && name.ends_with(TEMP_FILE_SUFFIX)
}

/// Whether `name` is a commit lock file.
pub fn is_lock_file_name(name: &str) -> bool {
    name.starts_with(LOCK_FILE_PREFIX)
}

/// Name of the lock file guarding commits of `name`: `.lock-<stem><ext>`.
pub(crate) fn lock_file_name(name: &LogicalName) -> String {
    format!("{LOCK_FILE_PREFIX}{name}")
}

/// Name of a fresh temporary file for one commit.
pub(crate) fn temp_file_name() -> String {
    format!(
        "{}{}{}",
        TEMP_FILE_PREFIX,
        uuid::Uuid::new_v4().simple(),
        TEMP_FILE_SUFFIX
    )
}
