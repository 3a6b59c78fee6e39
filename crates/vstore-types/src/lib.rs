//! Validated text types shared by the vstore crates.
//!
//! Anything that ends up as a component of an on-disk path goes through [`PathSegment`], so the
//! rules for "what may name a directory or file under the storage root" live in one place.

/// Maximum length of a single path segment in bytes (common filesystem limit).
pub const MAX_SEGMENT_BYTES: usize = 255;

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input starts or ends with whitespace
    #[error("'{0}' must not start or end with whitespace")]
    Padded(String),

    /// The input contained a path separator or NUL byte
    #[error("'{0}' must not contain path separators")]
    Separator(String),

    /// The input is a relative path component or a hidden name
    #[error("'{0}' is a reserved name")]
    Reserved(String),

    /// The input exceeds [`MAX_SEGMENT_BYTES`]
    #[error("segment is {0} bytes long (max {MAX_SEGMENT_BYTES})")]
    TooLong(usize),
}

/// A string type that guarantees non-empty content.
///
/// The input is kept exactly as given: whitespace-only input is rejected as empty, and surrounding
/// whitespace is rejected rather than trimmed, so two distinct inputs never collapse into one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or whitespace, and
    /// `Err(TextError::Padded)` if it has leading or trailing whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.len() != input.len() {
            return Err(TextError::Padded(input.to_owned()));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single, safe path component.
///
/// A `PathSegment` can be joined onto a directory without escaping it:
///
/// - non-empty, with no leading or trailing whitespace
/// - no `/`, `\` or NUL bytes
/// - not `.` or `..`, and not starting with `.` (hidden names are reserved for the store)
/// - at most [`MAX_SEGMENT_BYTES`] bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment(NonEmptyText);

impl PathSegment {
    /// Validates `input` as a single path component.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::new(input)?;
        let value = text.as_str();

        if value.contains(['/', '\\', '\0']) {
            return Err(TextError::Separator(value.to_owned()));
        }
        if value.starts_with('.') {
            return Err(TextError::Reserved(value.to_owned()));
        }
        if value.len() > MAX_SEGMENT_BYTES {
            return Err(TextError::TooLong(value.len()));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PathSegment {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<std::path::Path> for PathSegment {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(self.0.as_str())
    }
}
