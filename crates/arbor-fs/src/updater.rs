//! Copy-on-write path updates.
//!
//! Writing `a/b/c.txt` produces exactly three new trees (the new `a/b`, the
//! new `a` and the new root). Every other entry at each of those levels is
//! copied into the new tree by id, so unchanged subtrees are shared between
//! the old and new snapshot.

use arbor_store::{EntryKind, ObjectStore, ObjectStoreExt, Tree, TreeBuilder};
use arbor_types::ObjectId;
use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::path::RepoPath;

/// Builds a new root tree with one path pointing at a new blob.
pub struct TreeUpdater<'a> {
    objects: &'a dyn ObjectStore,
}

impl<'a> TreeUpdater<'a> {
    pub fn new(objects: &'a dyn ObjectStore) -> Self {
        Self { objects }
    }

    /// Return the id of a tree equal to `old_root` except that `path` names
    /// `blob_id`. Missing directories along the way are created.
    ///
    /// Fails with [`FsError::NameConflict`] if an intermediate segment is an
    /// existing file. A final segment that names a directory is replaced by
    /// the blob.
    pub fn update(
        &self,
        old_root: Option<&Tree>,
        path: &RepoPath,
        blob_id: ObjectId,
    ) -> FsResult<ObjectId> {
        if path.is_root() {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "cannot write a file at the root directory".into(),
            });
        }
        self.update_level(old_root, path, 0, blob_id)
    }

    fn update_level(
        &self,
        old: Option<&Tree>,
        path: &RepoPath,
        depth: usize,
        blob_id: ObjectId,
    ) -> FsResult<ObjectId> {
        let segments = path.segments();
        let head = segments[depth].as_str();
        let existing = old.and_then(|tree| tree.get(head));

        let mut builder = TreeBuilder::from_tree(old);
        if depth + 1 == segments.len() {
            builder.insert(head, blob_id, EntryKind::Blob)?;
        } else {
            let child = match existing {
                Some(entry) if entry.kind.is_tree() => {
                    Some(self.objects.read_tree(&entry.object_id)?)
                }
                Some(_) => {
                    return Err(FsError::NameConflict {
                        path: path.prefix(depth + 1),
                    })
                }
                None => None,
            };
            let child_id = self.update_level(child.as_ref(), path, depth + 1, blob_id)?;
            builder.insert(head, child_id, EntryKind::Tree)?;
        }

        let id = builder.finish(self.objects)?;
        debug!(dir = %path.prefix(depth), tree = %id.short_hex(), "directory rewritten");
        Ok(id)
    }
}
