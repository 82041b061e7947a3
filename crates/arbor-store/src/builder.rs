//! Copy-on-write construction of tree objects.
//!
//! A [`TreeBuilder`] starts from an existing tree (or nothing), takes a
//! handful of inserts, and writes one new tree. Entries that were not touched
//! keep their object ids verbatim; nothing below them is re-read or re-hashed.

use std::collections::BTreeMap;

use arbor_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{EntryKind, Tree, TreeEntry};
use crate::traits::ObjectStore;

/// Mutable staging area for one directory level.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    entries: BTreeMap<String, TreeEntry>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder with every entry of `tree`; `None` starts empty.
    pub fn from_tree(tree: Option<&Tree>) -> Self {
        let entries = tree
            .map(|t| {
                t.entries()
                    .iter()
                    .map(|e| (e.name.clone(), e.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    /// Insert or replace the entry called `name`.
    pub fn insert(
        &mut self,
        name: &str,
        object_id: ObjectId,
        kind: EntryKind,
    ) -> StoreResult<&mut Self> {
        validate_entry_name(name)?;
        self.entries
            .insert(name.to_string(), TreeEntry::new(name, kind, object_id));
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the staged entries into a [`Tree`] without writing it.
    pub fn build(&self) -> Tree {
        Tree::new(self.entries.values().cloned().collect())
    }

    /// Write the staged tree to `store` and return its id.
    pub fn finish(&self, store: &dyn ObjectStore) -> StoreResult<ObjectId> {
        let tree = self.build();
        let id = store.write(&tree.to_stored_object()?)?;
        debug!(tree = %id.short_hex(), entries = tree.len(), "tree written");
        Ok(id)
    }
}

/// Check that `name` can be stored as a single tree entry.
pub fn validate_entry_name(name: &str) -> StoreResult<()> {
    let reason = if name.is_empty() {
        "entry name must not be empty"
    } else if name == "." || name == ".." {
        "entry name must not be '.' or '..'"
    } else if name.contains('/') {
        "entry name must not contain '/'"
    } else if name.contains('\0') {
        "entry name must not contain NUL"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidEntryName {
        name: name.to_string(),
        reason: reason.into(),
    })
}
