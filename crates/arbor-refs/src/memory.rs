//! In-memory reference store for tests and ephemeral use.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::{describe, RefStore};
use crate::types::Ref;

/// A `HashMap`-backed [`RefStore`]. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<HashMap<String, Ref>>,
}

impl InMemoryRefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refs currently stored, `HEAD` included.
    pub fn len(&self) -> usize {
        self.refs.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<Ref>> {
        let refs = self.refs.read().map_err(|_| RefError::Poisoned)?;
        Ok(refs.get(name).cloned())
    }

    fn write_ref(&self, name: &str, value: &Ref) -> Result<()> {
        validate_ref_name(name)?;
        let mut refs = self.refs.write().map_err(|_| RefError::Poisoned)?;
        refs.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn compare_and_swap(&self, name: &str, expected: Option<&Ref>, new: &Ref) -> Result<()> {
        validate_ref_name(name)?;
        let mut refs = self.refs.write().map_err(|_| RefError::Poisoned)?;

        let current = refs.get(name);
        if current != expected {
            return Err(RefError::Conflict {
                name: name.to_string(),
                expected: describe(expected),
                actual: describe(current),
            });
        }

        debug!(reference = name, from = %describe(expected), to = %new, "ref updated");
        refs.insert(name.to_string(), new.clone());
        Ok(())
    }
}
