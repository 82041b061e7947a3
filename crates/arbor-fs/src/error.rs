use std::path::PathBuf;

use arbor_refs::RefError;
use arbor_store::StoreError;
use arbor_types::TypeError;
use thiserror::Error;

/// Errors returned by [`crate::FileStore`] and its components.
#[derive(Debug, Error)]
pub enum FsError {
    /// A path segment does not exist, or a directory was expected and a file
    /// was found (or the other way round, for reads).
    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    /// A write needed a directory where a file lives.
    #[error("name conflict at {path}: a file is in the way of a directory")]
    NameConflict { path: String },

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Another writer advanced the reference after this write read it.
    #[error("{reference} was advanced by another writer; retry the write")]
    ConcurrentUpdate { reference: String },

    #[error("not an arbor repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("invalid author: {0}")]
    Author(#[from] TypeError),

    #[error("object store error: {0}")]
    Store(#[from] StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] RefError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FsResult<T> = Result<T, FsError>;
