//! The [`RefStore`] trait defining the reference storage interface.
//!
//! Backends only store and swap values by name. Following symbolic refs is
//! provided on top of that by [`RefStore::peel`].

use arbor_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::types::{Peeled, Ref, MAX_SYMREF_DEPTH};

/// Storage backend for named references.
///
/// Ref names are full names: `HEAD` or `refs/...`. Implementations must be
/// thread-safe and make [`RefStore::compare_and_swap`] atomic with respect to
/// every other write to the same name.
pub trait RefStore: Send + Sync {
    /// Read a ref by its full name.
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<Ref>>;

    /// Create or overwrite a ref unconditionally.
    fn write_ref(&self, name: &str, value: &Ref) -> Result<()>;

    /// Replace the value of `name` with `new` only if it currently equals
    /// `expected` (`None` meaning "does not exist yet").
    ///
    /// Fails with [`RefError::Conflict`] when the current value differs.
    fn compare_and_swap(&self, name: &str, expected: Option<&Ref>, new: &Ref) -> Result<()>;

    /// Follow symbolic refs starting at `name` until a direct ref or a
    /// missing target is reached.
    ///
    /// The starting ref itself must exist. A symbolic ref whose target does
    /// not exist yet peels to an unborn [`Peeled`] naming that target.
    fn peel(&self, name: &str) -> Result<Peeled> {
        let mut current = name.to_string();
        let mut value = self.read_ref(&current)?.ok_or_else(|| RefError::NotFound {
            name: current.clone(),
        })?;

        for _ in 0..=MAX_SYMREF_DEPTH {
            match value {
                Ref::Direct(id) => {
                    return Ok(Peeled {
                        name: current,
                        target: Some(id),
                    })
                }
                Ref::Symbolic(target) => {
                    debug!(from = %current, to = %target, "following symbolic ref");
                    current = target;
                    match self.read_ref(&current)? {
                        Some(next) => value = next,
                        None => {
                            return Ok(Peeled {
                                name: current,
                                target: None,
                            })
                        }
                    }
                }
            }
        }

        Err(RefError::SymrefLoop {
            name: name.to_string(),
        })
    }

    /// The commit `name` ultimately points at, or `None` if it is unborn.
    fn resolve(&self, name: &str) -> Result<Option<ObjectId>> {
        Ok(self.peel(name)?.target)
    }
}

/// Render an optional ref value for conflict messages.
pub(crate) fn describe(value: Option<&Ref>) -> String {
    value.map_or_else(|| "<none>".to_string(), Ref::to_string)
}
