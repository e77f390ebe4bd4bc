//! Validated page titles.

use std::fmt;

/// A validated page title.
///
/// Titles become file names directly under the wiki root, so anything that
/// could escape the root or break the file system is rejected:
/// - must not be empty, `.` or `..`
/// - must not contain `/`, `\` or NUL
/// - `<title>.wiki` must fit in a 255 byte file name
///
/// Spaces, dots and any other unicode are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageTitle(String);

impl PageTitle {
    /// suffix of every page file
    pub const SUFFIX: &'static str = ".wiki";

    const MAX_FILE_NAME: usize = 255;

    /// create a new PageTitle, validating the input
    pub fn new(title: impl Into<String>) -> Result<Self, InvalidTitleError> {
        let title = title.into();
        Self::validate(&title)?;
        Ok(Self(title))
    }

    fn validate(title: &str) -> Result<(), InvalidTitleError> {
        if title.is_empty() {
            return Err(InvalidTitleError::Empty);
        }

        if title == "." || title == ".." {
            return Err(InvalidTitleError::Reserved(title.to_string()));
        }

        for (i, c) in title.chars().enumerate() {
            if c == '/' || c == '\\' || c == '\0' {
                return Err(InvalidTitleError::InvalidCharacter { char: c, position: i });
            }
        }

        let len = title.len() + Self::SUFFIX.len();
        if len > Self::MAX_FILE_NAME {
            return Err(InvalidTitleError::TooLong(len));
        }

        Ok(())
    }

    /// recover a title from a page file name, `None` for anything else
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(Self::SUFFIX)?;
        Self::new(stem).ok()
    }

    /// the file name this page is stored under (`<title>.wiki`)
    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, Self::SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PageTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// error type for invalid page titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTitleError {
    Empty,
    TooLong(usize),
    InvalidCharacter { char: char, position: usize },
    Reserved(String),
}

impl fmt::Display for InvalidTitleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "title cannot be empty"),
            Self::TooLong(len) => write!(f, "file name too long: {} bytes", len),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character {:?} at position {}", char, position)
            }
            Self::Reserved(name) => write!(f, "'{}' is a reserved name", name),
        }
    }
}

impl std::error::Error for InvalidTitleError {}
