//! Object path validation.
//!
//! Object paths follow the usual bus rules: they start with `/`, elements are
//! separated by single slashes, each element is made of `[A-Za-z0-9_]`, and
//! only the root path may end with a slash.

use std::fmt;

use crate::error::{BusError, Result};

/// A validated bus object path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Validate and wrap a path
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if Self::is_valid(&path) {
            Ok(Self(path))
        } else {
            Err(BusError::InvalidObjectPath(path))
        }
    }

    /// Wrap a compile-time constant known to be valid
    pub(crate) fn from_static(path: &'static str) -> Self {
        debug_assert!(Self::is_valid(path), "invalid static object path {path}");
        Self(path.to_string())
    }

    /// The root object path `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Check whether a string is a valid object path
    pub fn is_valid(path: &str) -> bool {
        if path == "/" {
            return true;
        }

        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };

        rest.split('/').all(|element| {
            !element.is_empty()
                && element
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        })
    }

    /// Borrow the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the path, returning the inner string
    pub fn into_string(self) -> String {
        self.0
    }

    /// Append a decimal serial to the last element
    ///
    /// `/org/example/client` with serial 7 gives `/org/example/client7`. Digits
    /// are valid element characters, so the result is always a valid path.
    pub fn with_serial(&self, serial: u64) -> ObjectPath {
        ObjectPath(format!("{}{}", self.0, serial))
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ObjectPath {
    type Error = BusError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = BusError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}
