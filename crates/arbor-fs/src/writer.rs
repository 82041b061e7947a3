//! The write path: blob, tree chain, commit, then the reference.
//!
//! A write moves through [`WriteStage`]s in order. Objects created before a
//! failure are content-addressed and simply left unreferenced; the branch ref
//! is only touched in the final step, by a compare-and-swap against the
//! commit the write started from.

use std::fmt;

use arbor_refs::{Ref, RefError, RefStore};
use arbor_store::{Commit, ObjectStore, ObjectStoreExt};
use arbor_types::{ObjectId, Signature};
use tracing::{debug, warn};

use crate::commit_info::CommitInfo;
use crate::error::{FsError, FsResult};
use crate::head::HeadResolver;
use crate::path::RepoPath;
use crate::updater::TreeUpdater;

/// Progress of a single write. `ReferenceAdvanced` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStage {
    Idle,
    BlobWritten,
    TreeRebuilt,
    CommitCreated,
    ReferenceAdvanced,
    Failed,
}

impl WriteStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ReferenceAdvanced | Self::Failed)
    }
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::BlobWritten => "blob_written",
            Self::TreeRebuilt => "tree_rebuilt",
            Self::CommitCreated => "commit_created",
            Self::ReferenceAdvanced => "reference_advanced",
            Self::Failed => "failed",
        })
    }
}

/// Ids produced by a successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOutcome {
    pub blob_id: ObjectId,
    /// New root tree.
    pub tree_id: ObjectId,
    pub commit_id: ObjectId,
    /// Commit that `HEAD` pointed at before the write.
    pub parent: Option<ObjectId>,
    /// Branch ref that was advanced.
    pub reference: String,
}

/// Turns one file write into one new commit on the current branch.
pub struct CommitWriter<'a> {
    objects: &'a dyn ObjectStore,
    refs: &'a dyn RefStore,
}

impl<'a> CommitWriter<'a> {
    pub fn new(objects: &'a dyn ObjectStore, refs: &'a dyn RefStore) -> Self {
        Self { objects, refs }
    }

    /// Store `content` at `path` in a new commit whose parent is the current
    /// `HEAD` commit, then advance the branch.
    ///
    /// Fails with [`FsError::ConcurrentUpdate`] if the branch moved while
    /// the write was in progress; the other writer's commit is kept.
    pub fn write_file(
        &self,
        path: &RepoPath,
        content: &[u8],
        info: &CommitInfo,
    ) -> FsResult<WriteOutcome> {
        if path.is_root() {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "cannot write a file at the root directory".into(),
            });
        }
        let author = info.signature()?;

        let mut stage = WriteStage::Idle;
        self.write_tracked(path, content, author, info.message(), &mut stage)
    }

    fn write_tracked(
        &self,
        path: &RepoPath,
        content: &[u8],
        author: Signature,
        message: &str,
        stage: &mut WriteStage,
    ) -> FsResult<WriteOutcome> {
        let result = self.run(path, content, author, message, stage);
        if let Err(e) = &result {
            warn!(%path, after = %stage, error = %e, "write aborted, reference untouched");
            advance(stage, WriteStage::Failed, path);
        }
        result
    }

    fn run(
        &self,
        path: &RepoPath,
        content: &[u8],
        author: Signature,
        message: &str,
        stage: &mut WriteStage,
    ) -> FsResult<WriteOutcome> {
        let blob_id = self.objects.write_blob(content)?;
        advance(stage, WriteStage::BlobWritten, path);

        let head = HeadResolver::new(self.objects, self.refs).resolve()?;
        let old_root = match head.commit() {
            Some(commit) => Some(self.objects.read_tree(&commit.tree)?),
            None => None,
        };
        let tree_id = TreeUpdater::new(self.objects).update(old_root.as_ref(), path, blob_id)?;
        advance(stage, WriteStage::TreeRebuilt, path);

        let parent = head.commit_id();
        let commit_id = self
            .objects
            .write_commit(&Commit::new(tree_id, parent, author, message))?;
        advance(stage, WriteStage::CommitCreated, path);

        let reference = head.ref_name().to_string();
        let expected = parent.map(Ref::Direct);
        match self
            .refs
            .compare_and_swap(&reference, expected.as_ref(), &Ref::Direct(commit_id))
        {
            Ok(()) => {}
            Err(RefError::Conflict { .. } | RefError::Locked { .. }) => {
                return Err(FsError::ConcurrentUpdate { reference });
            }
            Err(e) => return Err(e.into()),
        }
        advance(stage, WriteStage::ReferenceAdvanced, path);

        debug!(
            %path,
            %reference,
            commit = %commit_id.short_hex(),
            parent = ?parent.map(|p| p.short_hex()),
            "file committed"
        );
        Ok(WriteOutcome {
            blob_id,
            tree_id,
            commit_id,
            parent,
            reference,
        })
    }
}

fn advance(stage: &mut WriteStage, next: WriteStage, path: &RepoPath) {
    debug!(%path, from = %stage, to = %next, "write stage");
    *stage = next;
}
