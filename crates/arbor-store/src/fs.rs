//! Loose-object store on the local filesystem.
//!
//! Each object lives in its own file under a two-character fan-out
//! directory:
//!
//! ```text
//! objects/
//!   3f/
//!     a9c4...   (62 hex chars)
//! ```
//!
//! On-disk format: a zstd frame wrapping
//!
//! ```text
//! [kind as ASCII] [space] [payload length as decimal ASCII] [NUL] [payload]
//! ```
//!
//! Files are written to a temporary name in the fan-out directory and renamed
//! into place, so a reader never observes a partially written object.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arbor_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Default zstd level for loose objects.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Filesystem-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    compression_level: i32,
    fsync: bool,
}

impl FsObjectStore {
    /// Open (or create) an object directory at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            fsync: true,
        })
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Whether each object file is fsynced before it is renamed into place.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.fan_out();
        self.root.join(dir).join(file)
    }

    fn encode(&self, object: &StoredObject) -> StoreResult<Vec<u8>> {
        let mut raw = Vec::with_capacity(object.data.len() + 16);
        write!(raw, "{} {}\0", object.kind, object.data.len())?;
        raw.extend_from_slice(&object.data);
        Ok(zstd::encode_all(raw.as_slice(), self.compression_level)?)
    }

    fn decode(id: &ObjectId, compressed: &[u8]) -> StoreResult<StoredObject> {
        let raw = zstd::decode_all(compressed).map_err(|e| StoreError::CorruptObject {
            id: *id,
            reason: format!("decompression failed: {e}"),
        })?;
        let corrupt = |reason: &str| StoreError::CorruptObject {
            id: *id,
            reason: reason.to_string(),
        };

        let nul = raw
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| corrupt("missing header terminator"))?;
        let header =
            std::str::from_utf8(&raw[..nul]).map_err(|_| corrupt("header is not UTF-8"))?;
        let (kind, len) = header
            .split_once(' ')
            .ok_or_else(|| corrupt("malformed header"))?;
        let kind: ObjectKind = kind.parse()?;
        let len: usize = len.parse().map_err(|_| corrupt("malformed length"))?;

        let data = raw[nul + 1..].to_vec();
        if data.len() != len {
            return Err(corrupt("payload length does not match header"));
        }

        let object = StoredObject::new(kind, data);
        if !ContentHasher::for_kind(kind).verify(&object.data, id) {
            return Err(StoreError::HashMismatch {
                id: *id,
                computed: object.compute_id(),
            });
        }
        Ok(object)
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let compressed = match fs::read(self.object_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Self::decode(id, &compressed).map(Some)
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }

        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }
        let dir = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.encode(object)?)?;
        if self.fsync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "object written");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Tree, TreeEntry};
    use crate::traits::ObjectStoreExt;

    fn temp_store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::open(dir.path().join("objects"))
            .unwrap()
            .with_fsync(false);
        (dir, store)
    }

    #[test]
    fn blob_survives_reopen() {
        let (dir, store) = temp_store();
        let id = store.write_blob(b"Hello World\n").unwrap();
        drop(store);

        let reopened = FsObjectStore::open(dir.path().join("objects")).unwrap();
        assert_eq!(reopened.read_blob(&id).unwrap().data, b"Hello World\n");
    }

    #[test]
    fn objects_use_fan_out_layout() {
        let (_dir, store) = temp_store();
        let id = store.write_blob(b"fan out").unwrap();
        let (prefix, rest) = id.fan_out();
        assert!(store.root().join(prefix).join(rest).is_file());
        assert!(store.exists(&id).unwrap());
    }

    #[test]
    fn missing_object_reads_as_none() {
        let (_dir, store) = temp_store();
        assert!(store.read(&ObjectId::from_bytes(b"nope")).unwrap().is_none());
    }

    #[test]
    fn rewrite_is_a_no_op() {
        let (_dir, store) = temp_store();
        let tree = Tree::new(vec![TreeEntry::blob("a", ObjectId::from_bytes(b"a"))]);
        let id1 = store.write_tree(&tree).unwrap();
        let id2 = store.write_tree(&tree).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.read_tree(&id1).unwrap(), tree);
    }

    #[test]
    fn empty_blob_roundtrips() {
        let (_dir, store) = temp_store();
        let id = store.write_blob(b"").unwrap();
        assert!(store.read_blob(&id).unwrap().data.is_empty());
    }

    #[test]
    fn tampered_file_is_detected() {
        let (_dir, store) = temp_store();
        let id = store.write_blob(b"original").unwrap();
        let (prefix, rest) = id.fan_out();
        let path = store.root().join(prefix).join(rest);

        let forged = StoredObject::new(ObjectKind::Blob, b"tampered".to_vec());
        fs::write(&path, store.encode(&forged).unwrap()).unwrap();

        assert!(matches!(
            store.read(&id),
            Err(StoreError::HashMismatch { .. })
        ));
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let (_dir, store) = temp_store();
        let id = store.write_blob(b"soon garbage").unwrap();
        let (prefix, rest) = id.fan_out();
        fs::write(store.root().join(prefix).join(rest), b"not zstd").unwrap();

        assert!(matches!(
            store.read(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }
}
