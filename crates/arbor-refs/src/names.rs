//! Branch and ref name rules, a subset of `git check-ref-format`.
//!
//! A branch name is one or more `/`-separated components. Components are
//! non-empty and never start with `.`. The whole name may not end with `.`
//! or `.lock`, and may not contain `..`, `@{`, whitespace, control
//! characters or any of `~ ^ : ? * [ \`.

use crate::error::{RefError, Result};
use crate::types::HEAD;

const SPECIAL: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidRefName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Check that `name` can be used as a branch (the part after `refs/heads/`).
///
/// ```
/// use arbor_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "branch name must not be empty"));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || SPECIAL.contains(c))
    {
        return Err(invalid(name, format!("contains forbidden character {ch:?}")));
    }
    if let Some(seq) = ["..", "@{"].into_iter().find(|seq| name.contains(seq)) {
        return Err(invalid(name, format!("must not contain {seq:?}")));
    }
    if name.ends_with(".lock") || name.ends_with('.') {
        return Err(invalid(name, "must not end with '.' or '.lock'"));
    }
    for component in name.split('/') {
        match component.chars().next() {
            None => return Err(invalid(name, "empty path component")),
            Some('.') => {
                return Err(invalid(
                    name,
                    format!("component {component:?} starts with '.'"),
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Validate a full ref name: `HEAD`, or `refs/` followed by a valid
/// branch-style path.
///
/// ```
/// use arbor_refs::names::validate_ref_name;
///
/// assert!(validate_ref_name("HEAD").is_ok());
/// assert!(validate_ref_name("refs/heads/main").is_ok());
/// assert!(validate_ref_name("heads/main").is_err());
/// assert!(validate_ref_name("refs/../HEAD").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name == HEAD {
        return Ok(());
    }
    let Some(rest) = name.strip_prefix("refs/") else {
        return Err(invalid(name, "must be HEAD or start with 'refs/'"));
    };
    validate_branch_name(rest).map_err(|e| match e {
        RefError::InvalidRefName { reason, .. } => invalid(name, reason),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_nested_branches() {
        for name in ["main", "release-1.2", "feature/auth", "user/alice/fix-123"] {
            assert!(validate_branch_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_malformed_branches() {
        let bad = [
            "",
            "a..b",
            "has space",
            "a~b",
            "a:b",
            "a[b",
            ".hidden",
            "trailing.",
            "/leading",
            "trailing/",
            "a//b",
            "main.lock",
            "ref@{0}",
            "feature/.hidden",
        ];
        for name in bad {
            assert!(
                matches!(validate_branch_name(name), Err(RefError::InvalidRefName { .. })),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn ref_names() {
        assert!(validate_ref_name("HEAD").is_ok());
        assert!(validate_ref_name("refs/heads/feature/auth").is_ok());
        assert!(validate_ref_name("refs/heads/main.lock").is_err());
        assert!(validate_ref_name("refs/").is_err());
        assert!(validate_ref_name("ORIG_HEAD").is_err());
    }

    #[test]
    fn ref_name_error_reports_full_name() {
        let err = validate_ref_name("refs/heads/a..b").unwrap_err();
        assert!(err.to_string().contains("refs/heads/a..b"), "{err}");
    }
}
