//! Named references for Arbor.
//!
//! References are the only mutable state in a repository. `HEAD` is normally
//! a symbolic ref naming the current branch (`refs/heads/main`), and the
//! branch ref holds the id of the newest commit. Updating a branch is a
//! compare-and-swap, so two writers racing from the same parent cannot both
//! win.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`Ref`], [`Peeled`] and well-known names
//! - [`traits`] -- The [`RefStore`] trait and symbolic-ref peeling
//! - [`names`] -- Ref and branch name validation
//! - [`memory`] -- [`InMemoryRefStore`] for tests
//! - [`fs`] -- [`FsRefStore`], one lock-protected text file per ref

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use fs::FsRefStore;
pub use memory::InMemoryRefStore;
pub use names::{validate_branch_name, validate_ref_name};
pub use traits::RefStore;
pub use types::{branch_ref_name, Peeled, Ref, BRANCH_PREFIX, HEAD, MAX_SYMREF_DEPTH};
