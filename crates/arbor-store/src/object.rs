use std::fmt;
use std::str::FromStr;

use arbor_types::{ObjectId, Signature};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw file content.
    Blob,
    /// One directory level: names mapped to blobs or subtrees.
    Tree,
    /// A snapshot record pointing at a root tree and at most one parent.
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(StoreError::Serialization(format!(
                "unknown object kind: {other:?}"
            ))),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. Backends never interpret `data`;
/// they only key it by [`StoredObject::compute_id`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    pub size: u64,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        ContentHasher::for_kind(self.kind).hash(&self.data)
    }

    fn expect_kind(&self, expected: ObjectKind) -> StoreResult<()> {
        if self.kind != expected {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {expected}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw file content. Carries no name or mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    pub fn from_stored_object(obj: StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self { data: obj.data })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// What a tree entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
}

impl EntryKind {
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    /// The object kind an entry of this kind refers to.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Blob => ObjectKind::Blob,
            Self::Tree => ObjectKind::Tree,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.object_kind().fmt(f)
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
    pub object_id: ObjectId,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind,
            object_id,
        }
    }

    pub fn blob(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self::new(name, EntryKind::Blob, object_id)
    }

    pub fn tree(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self::new(name, EntryKind::Tree, object_id)
    }
}

/// One directory level.
///
/// Entries are kept sorted by name and names are unique, so two trees with the
/// same entries serialize to the same bytes and share an id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from arbitrary entries. Later duplicates of a name win.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        let mut entries = entries;
        entries.reverse();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    pub fn from_stored_object(obj: StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        let tree: Tree = serde_json::from_slice(&obj.data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let sorted = tree
            .entries
            .windows(2)
            .all(|w| w[0].name < w[1].name);
        if !sorted {
            return Err(StoreError::CorruptObject {
                id: obj.compute_id(),
                reason: "tree entries are not strictly sorted".into(),
            });
        }
        Ok(tree)
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A snapshot record: root tree, at most one parent, author and message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub message: String,
}

impl Commit {
    pub fn new(
        tree: ObjectId,
        parent: Option<ObjectId>,
        author: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent,
            author,
            message: message.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    pub fn from_stored_object(obj: StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paul() -> Signature {
        let when = "2014-10-17T13:37:00+00:00".parse().unwrap();
        Signature::new("Paul", "p@example.com", when).unwrap()
    }

    #[test]
    fn blob_kind_mismatch() {
        let stored = StoredObject::new(ObjectKind::Tree, b"not a blob".to_vec());
        let err = Blob::from_stored_object(stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn tree_entries_sorted_and_unique() {
        let tree = Tree::new(vec![
            TreeEntry::blob("zebra.txt", ObjectId::from_bytes(b"z")),
            TreeEntry::blob("alpha.txt", ObjectId::from_bytes(b"a1")),
            TreeEntry::tree("middle", ObjectId::from_bytes(b"m")),
            TreeEntry::blob("alpha.txt", ObjectId::from_bytes(b"a2")),
        ]);
        let names: Vec<_> = tree.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha.txt", "middle", "zebra.txt"]);
        assert_eq!(
            tree.get("alpha.txt").unwrap().object_id,
            ObjectId::from_bytes(b"a2")
        );
    }

    #[test]
    fn equal_entries_give_equal_ids() {
        let a = Tree::new(vec![
            TreeEntry::blob("a", ObjectId::from_bytes(b"1")),
            TreeEntry::tree("b", ObjectId::from_bytes(b"2")),
        ]);
        let b = Tree::new(vec![
            TreeEntry::tree("b", ObjectId::from_bytes(b"2")),
            TreeEntry::blob("a", ObjectId::from_bytes(b"1")),
        ]);
        assert_eq!(
            a.to_stored_object().unwrap().compute_id(),
            b.to_stored_object().unwrap().compute_id()
        );
    }

    #[test]
    fn kind_is_part_of_tree_identity() {
        let id = ObjectId::from_bytes(b"x");
        let as_blob = Tree::new(vec![TreeEntry::blob("x", id)]);
        let as_tree = Tree::new(vec![TreeEntry::tree("x", id)]);
        assert_ne!(
            as_blob.to_stored_object().unwrap().compute_id(),
            as_tree.to_stored_object().unwrap().compute_id()
        );
    }

    #[test]
    fn unsorted_tree_payload_is_corrupt() {
        let payload = format!(
            r#"{{"entries":[{{"name":"b","kind":"blob","object_id":"{id}"}},{{"name":"a","kind":"blob","object_id":"{id}"}}]}}"#,
            id = ObjectId::from_bytes(b"x")
        );
        let stored = StoredObject::new(ObjectKind::Tree, payload.into_bytes());
        assert!(matches!(
            Tree::from_stored_object(stored),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn tree_get_missing() {
        let tree = Tree::new(vec![TreeEntry::blob("a.txt", ObjectId::null())]);
        assert!(tree.get("a.txt").is_some());
        assert!(tree.get("missing").is_none());
        assert!(Tree::empty().is_empty());
    }

    #[test]
    fn commit_identity_includes_parent() {
        let tree = ObjectId::from_bytes(b"root");
        let first = Commit::new(tree, None, paul(), "Have fun.");
        let second = Commit::new(tree, Some(ObjectId::from_bytes(b"p")), paul(), "Have fun.");
        assert!(first.is_root());
        assert_ne!(
            first.to_stored_object().unwrap().compute_id(),
            second.to_stored_object().unwrap().compute_id()
        );
        let decoded = Commit::from_stored_object(second.to_stored_object().unwrap()).unwrap();
        assert_eq!(decoded, second);
    }

    #[test]
    fn object_kind_parse() {
        for kind in [ObjectKind::Blob, ObjectKind::Tree, ObjectKind::Commit] {
            assert_eq!(kind.as_str().parse::<ObjectKind>().unwrap(), kind);
        }
        assert!("pack".parse::<ObjectKind>().is_err());
    }
}
