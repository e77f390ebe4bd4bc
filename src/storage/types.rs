//! core type-safe wrappers around git primitives for the storage layer.

use std::fmt;

use git2::Oid;

/// Identifier of one revision (a git commit).
///
/// The inner Oid is only accessible within the crate so callers can't mix a
/// revision up with a blob or tree id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevisionId(pub(crate) Oid);

impl RevisionId {
    pub(crate) fn new(oid: Oid) -> Self {
        Self(oid)
    }

    /// raw Oid (for internal use only)
    pub(crate) fn raw(&self) -> Oid {
        self.0
    }

    /// short form of the revision id
    pub fn short(&self) -> String {
        self.0.to_string()[..7].to_string()
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author identity recorded on every commit.
///
/// Both values are opaque; they are handed to git as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// true when either half of the identity is blank
    pub fn is_incomplete(&self) -> bool {
        self.name.trim().is_empty() || self.email.trim().is_empty()
    }

    /// convert to a git2::Signature stamped with the given unix time
    pub(crate) fn to_git2_signature(&self, seconds: i64) -> Result<git2::Signature<'static>, git2::Error> {
        git2::Signature::new(&self.name, &self.email, &git2::Time::new(seconds, 0))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
