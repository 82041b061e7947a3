//! Slash-separated paths inside a snapshot.
//!
//! Leading, trailing and repeated slashes are ignored, so `"/a//b/"` and
//! `"a/b"` name the same file. The empty path (or `"/"`) is the root
//! directory.

use std::fmt;

use arbor_store::validate_entry_name;

use crate::error::{FsError, FsResult};

/// A normalised path: zero or more valid entry names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RepoPath {
    segments: Vec<String>,
}

impl RepoPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Normalise `raw`, rejecting `.`, `..` and NUL bytes.
    pub fn parse(raw: &str) -> FsResult<Self> {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                validate_entry_name(segment)
                    .map(|()| segment.to_string())
                    .map_err(|_| FsError::InvalidPath {
                        path: raw.to_string(),
                        reason: format!("segment {segment:?} is not a valid name"),
                    })
            })
            .collect::<FsResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The first `len` segments joined with `/`, used to name the deepest
    /// prefix that failed to resolve.
    pub fn prefix(&self, len: usize) -> String {
        self.segments[..len.min(self.segments.len())].join("/")
    }

    /// A new path with `name` appended.
    pub fn join(&self, name: &str) -> FsResult<Self> {
        let mut joined = self.clone();
        joined.segments.extend(Self::parse(name)?.segments);
        Ok(joined)
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        f.write_str(&self.segments.join("/"))
    }
}
