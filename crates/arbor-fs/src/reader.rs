//! Path lookups inside a snapshot tree.

use arbor_store::{Blob, ObjectStore, ObjectStoreExt, Tree, TreeEntry};

use crate::commit_info::FileInfo;
use crate::error::{FsError, FsResult};
use crate::path::RepoPath;

/// Read-only walker over a root tree.
pub struct TreeReader<'a> {
    objects: &'a dyn ObjectStore,
}

impl<'a> TreeReader<'a> {
    pub fn new(objects: &'a dyn ObjectStore) -> Self {
        Self { objects }
    }

    /// Find the entry named by `path`.
    ///
    /// Every segment but the last must exist and be a directory. The error
    /// names the shortest prefix that failed to resolve.
    pub fn locate(&self, root: &Tree, path: &RepoPath) -> FsResult<TreeEntry> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "the root directory has no entry of its own".into(),
            });
        };

        let mut tree = root.clone();
        for (depth, segment) in parents.iter().enumerate() {
            let entry = tree
                .get(segment)
                .filter(|e| e.kind.is_tree())
                .ok_or_else(|| FsError::NotFound {
                    path: path.prefix(depth + 1),
                })?;
            let child = self.objects.read_tree(&entry.object_id)?;
            tree = child;
        }

        tree.get(last).cloned().ok_or_else(|| FsError::NotFound {
            path: path.to_string(),
        })
    }

    /// Load the directory at `path`; the root path yields `root` itself.
    pub fn subtree(&self, root: &Tree, path: &RepoPath) -> FsResult<Tree> {
        if path.is_root() {
            return Ok(root.clone());
        }
        let entry = self.locate(root, path)?;
        if !entry.kind.is_tree() {
            return Err(FsError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(self.objects.read_tree(&entry.object_id)?)
    }

    /// List the directory at `path` in name order.
    pub fn list(&self, root: &Tree, path: &RepoPath) -> FsResult<Vec<FileInfo>> {
        let tree = self.subtree(root, path)?;
        Ok(tree
            .entries()
            .iter()
            .map(|e| FileInfo::new(e.name.as_str(), e.kind.is_tree()))
            .collect())
    }

    /// Load the file at `path`. A directory is not a file.
    pub fn read_blob(&self, root: &Tree, path: &RepoPath) -> FsResult<Blob> {
        let entry = self.locate(root, path)?;
        if entry.kind.is_tree() {
            return Err(FsError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(self.objects.read_blob(&entry.object_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_store::InMemoryObjectStore;

    /// `foo.txt` and `bar/baz.txt`.
    fn seeded() -> (InMemoryObjectStore, Tree) {
        let objects = InMemoryObjectStore::new();
        let foo = objects.write_blob(b"Hello World\n").unwrap();
        let baz = objects.write_blob(b"This is Baz\n").unwrap();
        let bar = objects
            .write_tree(&Tree::new(vec![TreeEntry::blob("baz.txt", baz)]))
            .unwrap();
        let root = Tree::new(vec![
            TreeEntry::blob("foo.txt", foo),
            TreeEntry::tree("bar", bar),
        ]);
        (objects, root)
    }

    fn path(raw: &str) -> RepoPath {
        RepoPath::parse(raw).unwrap()
    }

    #[test]
    fn lists_root_and_subdirectory() {
        let (objects, root) = seeded();
        let reader = TreeReader::new(&objects);

        let listing = reader.list(&root, &RepoPath::root()).unwrap();
        assert_eq!(
            listing,
            [FileInfo::new("bar", true), FileInfo::new("foo.txt", false)]
        );
        assert_eq!(
            reader.list(&root, &path("bar")).unwrap(),
            [FileInfo::new("baz.txt", false)]
        );
    }

    #[test]
    fn reads_nested_file() {
        let (objects, root) = seeded();
        let reader = TreeReader::new(&objects);
        assert_eq!(reader.read_blob(&root, &path("bar/baz.txt")).unwrap().data, b"This is Baz\n");
    }

    #[test]
    fn missing_segment_names_the_prefix() {
        let (objects, root) = seeded();
        let reader = TreeReader::new(&objects);

        let err = reader.locate(&root, &path("nope/deeper/file")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { ref path } if path == "nope"), "{err}");

        let err = reader.locate(&root, &path("bar/boo.txt")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { ref path } if path == "bar/boo.txt"));
    }

    #[test]
    fn file_used_as_directory_is_not_found() {
        let (objects, root) = seeded();
        let reader = TreeReader::new(&objects);

        let err = reader.locate(&root, &path("foo.txt/inner")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { ref path } if path == "foo.txt"));
        assert!(matches!(
            reader.list(&root, &path("foo.txt")),
            Err(FsError::NotFound { .. })
        ));
        assert!(matches!(
            reader.read_blob(&root, &path("bar")),
            Err(FsError::NotFound { .. })
        ));
    }
}
