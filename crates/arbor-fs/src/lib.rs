//! A versioned, hierarchical file store.
//!
//! Callers see ordinary paths: list a directory, read a file, write a file.
//! Underneath, every write produces a new immutable snapshot built from
//! content-addressed blobs and trees, records it in a commit whose parent is
//! the previous snapshot, and only then advances the current branch.
//!
//! ```
//! use arbor_fs::{CommitInfo, FileStore};
//!
//! let store = FileStore::in_memory()?;
//! let info = CommitInfo::now("Paul", "p@example.com", "Add greeting");
//! store.write_file("docs/hello.txt", &b"Hello World\n"[..], &info)?;
//!
//! assert_eq!(store.read_file("docs/hello.txt")?, "Hello World\n");
//! assert_eq!(store.read_directory("docs")?[0].name(), "hello.txt");
//! # Ok::<(), arbor_fs::FsError>(())
//! ```
//!
//! # Components
//!
//! - [`HeadResolver`] -- `HEAD` to commit and root tree
//! - [`TreeReader`] -- path lookups inside one snapshot
//! - [`TreeUpdater`] -- copy-on-write rewrite of the root-to-file chain
//! - [`CommitWriter`] -- blob, trees, commit, then the branch ref
//! - [`FileStore`] -- the path-based facade tying them together

pub mod commit_info;
pub mod config;
pub mod error;
pub mod file_store;
pub mod head;
pub mod path;
pub mod reader;
pub mod updater;
pub mod writer;

pub use commit_info::{CommitInfo, FileInfo};
pub use config::{FileStoreConfig, CONFIG_FILE_NAME};
pub use error::{FsError, FsResult};
pub use file_store::{CommitSummary, FileStore, OBJECTS_DIR};
pub use head::{HeadResolver, HeadState};
pub use path::RepoPath;
pub use reader::TreeReader;
pub use updater::TreeUpdater;
pub use writer::{CommitWriter, WriteOutcome, WriteStage};

pub use arbor_types::ObjectId;
