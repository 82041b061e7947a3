use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Who made a commit, and when.
///
/// The timestamp keeps its original UTC offset so that a commit written in
/// one zone reads back with the same wall-clock time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    /// Create a signature, rejecting names and emails that would make the
    /// `Name <email>` form ambiguous.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        when: DateTime<FixedOffset>,
    ) -> Result<Self, TypeError> {
        let name = name.into();
        let email = email.into();
        check_field("name", &name)?;
        check_field("email", &email)?;
        Ok(Self { name, email, when })
    }

    /// Signature stamped with the current UTC time.
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Result<Self, TypeError> {
        Self::new(name, email, Utc::now().fixed_offset())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

fn check_field(field: &str, value: &str) -> Result<(), TypeError> {
    if value.contains(['<', '>', '\n', '\0']) {
        return Err(TypeError::InvalidSignature(format!(
            "{field} must not contain '<', '>', newline or NUL: {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn berlin() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn display_format() {
        let when = berlin().with_ymd_and_hms(2013, 3, 6, 14, 30, 0).unwrap();
        let sig = Signature::new("Rand Om Hacker", "random@hacker.com", when).unwrap();
        assert_eq!(sig.to_string(), "Rand Om Hacker <random@hacker.com>");
    }

    #[test]
    fn rejects_angle_brackets() {
        let err = Signature::now("Paul <x>", "p@example.com").unwrap_err();
        assert!(matches!(err, TypeError::InvalidSignature(_)));
        assert!(Signature::now("Paul", "p@example.com\n").is_err());
    }

    #[test]
    fn offset_survives_serde() {
        let when = berlin().with_ymd_and_hms(2014, 10, 17, 13, 37, 0).unwrap();
        let sig = Signature::new("Paul", "p@example.com", when).unwrap();
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back.when.offset().local_minus_utc(), 3600);
        assert_eq!(back, sig);
    }
}
