use arbor_types::Signature;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FsResult;

/// Authorship metadata attached to every write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitInfo {
    author_name: String,
    author_email: String,
    message: String,
    time: DateTime<FixedOffset>,
}

impl CommitInfo {
    pub fn new(
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        message: impl Into<String>,
        time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            author_name: author_name.into(),
            author_email: author_email.into(),
            message: message.into(),
            time,
        }
    }

    /// Commit info stamped with the current time in UTC.
    pub fn now(
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(author_name, author_email, message, Utc::now().fixed_offset())
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn time(&self) -> DateTime<FixedOffset> {
        self.time
    }

    /// The author signature recorded in the commit object.
    pub fn signature(&self) -> FsResult<Signature> {
        Ok(Signature::new(
            self.author_name.as_str(),
            self.author_email.as_str(),
            self.time,
        )?)
    }
}

/// One entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    name: String,
    is_dir: bool,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            is_dir,
        }
    }

    /// Base name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsError;

    fn have_fun() -> CommitInfo {
        let when = DateTime::parse_from_rfc3339("2014-10-17T13:37:00+00:00").unwrap();
        CommitInfo::new("Paul", "p@example.com", "Have fun.", when)
    }

    #[test]
    fn accessors() {
        let info = have_fun();
        assert_eq!(info.author_name(), "Paul");
        assert_eq!(info.author_email(), "p@example.com");
        assert_eq!(info.message(), "Have fun.");
        assert_eq!(info.time().to_rfc3339(), "2014-10-17T13:37:00+00:00");
    }

    #[test]
    fn signature_carries_name_email_and_time() {
        let sig = have_fun().signature().unwrap();
        assert_eq!(sig.to_string(), "Paul <p@example.com>");
        assert_eq!(sig.when, have_fun().time());
    }

    #[test]
    fn malformed_author_is_rejected() {
        let info = CommitInfo::now("Paul <evil>", "p@example.com", "x");
        assert!(matches!(info.signature(), Err(FsError::Author(_))));
    }

    #[test]
    fn file_info() {
        let dir = FileInfo::new("bar", true);
        assert_eq!(dir.name(), "bar");
        assert!(dir.is_dir());
        assert!(!FileInfo::new("foo.txt", false).is_dir());
    }
}
