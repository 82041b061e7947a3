//! Content-addressed object storage for Arbor.
//!
//! A hash-keyed object store analogous to git's `.git/objects/` directory.
//! Blobs, trees and commits are immutable objects identified by their
//! domain-separated BLAKE3 hash.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw file content
//! - [`Tree`] -- one directory level mapping names to blobs or subtrees
//! - [`Commit`] -- root tree, optional parent, author and message
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- zstd-compressed loose objects on disk
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Write-then-link: every object is durable before anything references it.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod builder;
pub mod error;
pub mod fs;
pub mod hasher;
pub mod memory;
pub mod object;
pub mod traits;

pub use builder::{validate_entry_name, TreeBuilder};
pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use hasher::ContentHasher;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryKind, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::{ObjectStore, ObjectStoreExt};
