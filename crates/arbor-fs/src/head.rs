//! Resolution of `HEAD` to the current snapshot.

use arbor_refs::{RefStore, HEAD};
use arbor_store::{Commit, ObjectStore, ObjectStoreExt, Tree};
use arbor_types::ObjectId;
use tracing::debug;

use crate::error::FsResult;

/// What `HEAD` currently points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadState {
    /// `HEAD` names a branch that has no commits yet.
    Unset { branch_ref: String },
    /// `HEAD` resolves to a commit.
    Commit {
        ref_name: String,
        commit_id: ObjectId,
        commit: Commit,
    },
}

impl HeadState {
    /// The ref that the next commit will advance.
    pub fn ref_name(&self) -> &str {
        match self {
            Self::Unset { branch_ref } => branch_ref,
            Self::Commit { ref_name, .. } => ref_name,
        }
    }

    pub fn commit_id(&self) -> Option<ObjectId> {
        match self {
            Self::Unset { .. } => None,
            Self::Commit { commit_id, .. } => Some(*commit_id),
        }
    }

    pub fn commit(&self) -> Option<&Commit> {
        match self {
            Self::Unset { .. } => None,
            Self::Commit { commit, .. } => Some(commit),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset { .. })
    }
}

/// Turns `HEAD` into a commit and its root tree.
pub struct HeadResolver<'a> {
    objects: &'a dyn ObjectStore,
    refs: &'a dyn RefStore,
}

impl<'a> HeadResolver<'a> {
    pub fn new(objects: &'a dyn ObjectStore, refs: &'a dyn RefStore) -> Self {
        Self { objects, refs }
    }

    /// Peel `HEAD` and load the commit it points at.
    ///
    /// A branch without commits is [`HeadState::Unset`]. A missing `HEAD` or a
    /// commit that cannot be loaded is an error.
    pub fn resolve(&self) -> FsResult<HeadState> {
        let peeled = self.refs.peel(HEAD)?;
        let Some(commit_id) = peeled.target else {
            debug!(branch = %peeled.name, "HEAD is unborn");
            return Ok(HeadState::Unset {
                branch_ref: peeled.name,
            });
        };

        let commit = self.objects.read_commit(&commit_id)?;
        debug!(branch = %peeled.name, commit = %commit_id.short_hex(), "HEAD resolved");
        Ok(HeadState::Commit {
            ref_name: peeled.name,
            commit_id,
            commit,
        })
    }

    /// The root tree of the current commit, or `None` before the first commit.
    pub fn head_tree(&self) -> FsResult<Option<(ObjectId, Tree)>> {
        match self.resolve()? {
            HeadState::Unset { .. } => Ok(None),
            HeadState::Commit { commit, .. } => {
                let tree = self.objects.read_tree(&commit.tree)?;
                Ok(Some((commit.tree, tree)))
            }
        }
    }
}
