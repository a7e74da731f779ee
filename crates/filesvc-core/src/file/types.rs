//! Core domain types for remote files.
//!
//! Pure data types with no I/O dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A downloadable remote object.
///
/// The job layer only needs the storage key (the cache/dedup key) and a name
/// for diagnostics. The key is opaque here: only the fetcher interprets it.
pub trait FileResource {
    /// Stable identifier, unique per distinct remote object.
    fn storage_key(&self) -> &str;

    /// Human-readable name used in logs.
    fn display_name(&self) -> &str;
}

/// Plain value implementation of [`FileResource`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteFile {
    key: String,
    name: String,
}

impl RemoteFile {
    /// Create a remote file with a distinct display name.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }

    /// Create a remote file whose display name is its key.
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
        }
    }
}

impl FileResource for RemoteFile {
    fn storage_key(&self) -> &str {
        &self.key
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl<T: FileResource + ?Sized> FileResource for &T {
    fn storage_key(&self) -> &str {
        (**self).storage_key()
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }
}

impl fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.key {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{} ({})", self.name, self.key)
        }
    }
}
