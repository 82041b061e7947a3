//! Object store that keeps everything in a `HashMap`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use arbor_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Volatile [`ObjectStore`] for tests and embedding.
///
/// Objects are cloned in and out; nothing survives the process.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

type Objects = HashMap<ObjectId, StoredObject>;

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn shared(&self) -> StoreResult<RwLockReadGuard<'_, Objects>> {
        self.objects.read().map_err(|_| StoreError::Poisoned)
    }

    fn exclusive(&self) -> StoreResult<RwLockWriteGuard<'_, Objects>> {
        self.objects.write().map_err(|_| StoreError::Poisoned)
    }

    /// Number of distinct objects held. A poisoned store reports zero.
    pub fn len(&self) -> usize {
        self.shared().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of payload sizes, in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.shared()
            .map(|m| m.values().map(|o| o.size).sum())
            .unwrap_or_default()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        Ok(self.shared()?.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        self.exclusive()?
            .entry(id)
            .or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.shared()?.contains_key(id))
    }
}

impl fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects", &self.len())
            .field("bytes", &self.total_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectKind, Tree, TreeEntry};
    use crate::traits::ObjectStoreExt;

    #[test]
    fn tree_comes_back_equal() {
        let store = InMemoryObjectStore::new();
        let tree = Tree::new(vec![
            TreeEntry::blob("foo.txt", ObjectId::from_bytes(b"foo")),
            TreeEntry::tree("bar", ObjectId::from_bytes(b"bar")),
        ]);
        let id = store.write_tree(&tree).unwrap();

        assert_eq!(store.read(&id).unwrap().map(|o| o.kind), Some(ObjectKind::Tree));
        assert_eq!(store.read_tree(&id).unwrap(), tree);
    }

    #[test]
    fn duplicate_content_is_stored_once() {
        let store = InMemoryObjectStore::new();
        let a = store.write_blob(b"Hello World\n").unwrap();
        let b = store.write_blob(b"Hello World\n").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 12);
    }

    #[test]
    fn missing_objects() {
        let store = InMemoryObjectStore::new();
        let id = ObjectId::from_bytes(b"missing");
        assert!(store.read(&id).unwrap().is_none());
        assert!(!store.exists(&id).unwrap());
        assert!(matches!(store.read_blob(&id), Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[test]
    fn typed_read_checks_kind() {
        let store = InMemoryObjectStore::new();
        let id = store.write_blob(b"plain bytes").unwrap();
        assert!(matches!(
            store.read_commit(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn same_bytes_under_different_kinds_are_distinct() {
        let store = InMemoryObjectStore::new();
        let blob = store
            .write(&StoredObject::new(ObjectKind::Blob, b"{}".to_vec()))
            .unwrap();
        let tree = store
            .write(&StoredObject::new(ObjectKind::Tree, b"{}".to_vec()))
            .unwrap();
        assert_ne!(blob, tree);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn shared_between_threads() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.write_blob(&[i; 16]).unwrap())
            })
            .collect();
        for h in handles {
            let id = h.join().expect("thread should not panic");
            assert!(store.exists(&id).unwrap());
        }
        assert_eq!(store.len(), 4);
        assert!(format!("{store:?}").contains("objects: 4"));
    }
}
