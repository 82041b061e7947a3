//! Core reference types.
//!
//! A ref either names an object directly or points at another ref by name.
//! `HEAD` is normally symbolic, naming the branch that new commits advance.

use std::fmt;

use arbor_types::ObjectId;

/// Name of the current-version reference.
pub const HEAD: &str = "HEAD";

/// Namespace prefix for branch refs.
pub const BRANCH_PREFIX: &str = "refs/heads/";

/// Deepest chain of symbolic refs that [`crate::RefStore::peel`] will follow.
pub const MAX_SYMREF_DEPTH: usize = 5;

/// The value stored under a ref name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ref {
    /// Points at a commit.
    Direct(ObjectId),
    /// Points at another ref by its full name (e.g. `refs/heads/main`).
    Symbolic(String),
}

impl Ref {
    /// Symbolic ref to the branch called `branch`.
    pub fn branch(branch: &str) -> Self {
        Self::Symbolic(branch_ref_name(branch))
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    pub fn target_id(&self) -> Option<ObjectId> {
        match self {
            Self::Direct(id) => Some(*id),
            Self::Symbolic(_) => None,
        }
    }

    /// Parse the one-line text form used by ref files.
    pub fn parse(text: &str) -> Option<Self> {
        let line = text.trim_end_matches(['\n', '\r']);
        if let Some(target) = line.strip_prefix("ref: ") {
            let target = target.trim();
            return (!target.is_empty()).then(|| Self::Symbolic(target.to_string()));
        }
        ObjectId::from_hex(line).ok().map(Self::Direct)
    }
}

/// One-line text form: a hex id, or `ref: <name>` for symbolic refs.
impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(id) => write!(f, "{id}"),
            Self::Symbolic(target) => write!(f, "ref: {target}"),
        }
    }
}

/// Full ref name of a branch.
pub fn branch_ref_name(branch: &str) -> String {
    format!("{BRANCH_PREFIX}{branch}")
}

/// A ref after following every symbolic link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peeled {
    /// Name of the last ref in the chain: the one a new commit should update.
    pub name: String,
    /// The commit it points at, or `None` if that ref does not exist yet.
    pub target: Option<ObjectId>,
}

impl Peeled {
    /// `true` if the chain ends at a ref that has never been written.
    pub fn is_unborn(&self) -> bool {
        self.target.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_parses_back() {
        let direct = Ref::Direct(ObjectId::from_bytes(b"c1"));
        assert_eq!(Ref::parse(&format!("{direct}\n")), Some(direct));

        let symbolic = Ref::branch("main");
        assert_eq!(symbolic.to_string(), "ref: refs/heads/main");
        assert_eq!(Ref::parse("ref: refs/heads/main\n"), Some(symbolic));
    }

    #[test]
    fn parse_rejects_junk() {
        assert_eq!(Ref::parse(""), None);
        assert_eq!(Ref::parse("ref: "), None);
        assert_eq!(Ref::parse("not-a-hash"), None);
    }

    #[test]
    fn target_id_only_for_direct() {
        assert!(Ref::branch("main").target_id().is_none());
        assert!(Ref::branch("main").is_symbolic());
        let id = ObjectId::from_bytes(b"x");
        assert_eq!(Ref::Direct(id).target_id(), Some(id));
    }
}
