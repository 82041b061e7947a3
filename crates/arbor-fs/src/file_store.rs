//! The path-based facade over objects and refs.

use std::fmt;
use std::fs;
use std::io::Read;
use std::sync::Arc;

use arbor_refs::{FsRefStore, InMemoryRefStore, Ref, RefStore, BRANCH_PREFIX, HEAD};
use arbor_store::{Commit, FsObjectStore, InMemoryObjectStore, ObjectStore, ObjectStoreExt, Tree};
use arbor_types::{ObjectId, Signature};
use bytes::{Buf, Bytes};
use tracing::{debug, info};

use crate::commit_info::{CommitInfo, FileInfo};
use crate::config::FileStoreConfig;
use crate::error::{FsError, FsResult};
use crate::head::HeadResolver;
use crate::path::RepoPath;
use crate::reader::TreeReader;
use crate::writer::{CommitWriter, WriteOutcome};

/// Directory under the repository root holding loose objects.
pub const OBJECTS_DIR: &str = "objects";

/// One commit as shown by [`FileStore::history`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: ObjectId,
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub message: String,
}

impl CommitSummary {
    fn new(id: ObjectId, commit: Commit) -> Self {
        Self {
            id,
            tree: commit.tree,
            parent: commit.parent,
            author: commit.author,
            message: commit.message,
        }
    }
}

/// A versioned file tree.
///
/// Reads always see the snapshot `HEAD` points at when the call starts.
/// Every write commits exactly one file and advances `HEAD`'s branch.
pub struct FileStore {
    objects: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefStore>,
    config: FileStoreConfig,
}

impl FileStore {
    /// A throwaway store that lives only in memory.
    pub fn in_memory() -> FsResult<Self> {
        Self::with_stores(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryRefStore::new()),
            FileStoreConfig::default(),
        )
    }

    /// Wrap existing stores. `HEAD` is pointed at the configured branch if it
    /// does not exist yet.
    pub fn with_stores(
        objects: Arc<dyn ObjectStore>,
        refs: Arc<dyn RefStore>,
        config: FileStoreConfig,
    ) -> FsResult<Self> {
        config.validate()?;
        if refs.read_ref(HEAD)?.is_none() {
            refs.write_ref(HEAD, &Ref::branch(&config.branch))?;
        }
        Ok(Self {
            objects,
            refs,
            config,
        })
    }

    /// Create the on-disk layout at `config.root`, or open it if it already
    /// exists.
    pub fn init(config: FileStoreConfig) -> FsResult<Self> {
        config.validate()?;
        fs::create_dir_all(config.root.join("refs").join("heads"))?;
        let (objects, refs) = Self::disk_stores(&config)?;

        if refs.read_ref(HEAD)?.is_none() {
            refs.write_ref(HEAD, &Ref::branch(&config.branch))?;
            info!(root = %config.root.display(), branch = %config.branch, "initialised repository");
        }
        Ok(Self {
            objects: Arc::new(objects),
            refs: Arc::new(refs),
            config,
        })
    }

    /// Open an existing repository at `config.root`.
    pub fn open(config: FileStoreConfig) -> FsResult<Self> {
        config.validate()?;
        let root = &config.root;
        if !root.join(HEAD).is_file() || !root.join(OBJECTS_DIR).is_dir() {
            return Err(FsError::NotARepository(root.clone()));
        }
        let (objects, refs) = Self::disk_stores(&config)?;
        debug!(root = %root.display(), "opened repository");
        Ok(Self {
            objects: Arc::new(objects),
            refs: Arc::new(refs),
            config,
        })
    }

    fn disk_stores(config: &FileStoreConfig) -> FsResult<(FsObjectStore, FsRefStore)> {
        let objects = FsObjectStore::open(config.root.join(OBJECTS_DIR))?
            .with_compression_level(config.compression_level)
            .with_fsync(config.fsync);
        let refs = FsRefStore::open(&config.root)?.with_fsync(config.fsync);
        Ok((objects, refs))
    }

    pub fn config(&self) -> &FileStoreConfig {
        &self.config
    }

    fn resolver(&self) -> HeadResolver<'_> {
        HeadResolver::new(self.objects.as_ref(), self.refs.as_ref())
    }

    fn reader(&self) -> TreeReader<'_> {
        TreeReader::new(self.objects.as_ref())
    }

    /// Root tree of the current snapshot. Before the first commit nothing
    /// exists, so any lookup of `path` is `NotFound`.
    fn current_root(&self, path: &RepoPath) -> FsResult<(ObjectId, Tree)> {
        self.resolver()
            .head_tree()?
            .ok_or_else(|| FsError::NotFound {
                path: path.to_string(),
            })
    }

    /// List a directory. The root of a repository without commits is empty.
    pub fn read_directory(&self, path: &str) -> FsResult<Vec<FileInfo>> {
        let path = RepoPath::parse(path)?;
        match self.resolver().head_tree()? {
            Some((_, root)) => self.reader().list(&root, &path),
            None if path.is_root() => Ok(Vec::new()),
            None => Err(FsError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    /// Full contents of the file at `path`.
    pub fn read_file(&self, path: &str) -> FsResult<Bytes> {
        let path = RepoPath::parse(path)?;
        let (_, root) = self.current_root(&path)?;
        let blob = self.reader().read_blob(&root, &path)?;
        Ok(Bytes::from(blob.data))
    }

    /// The file at `path` as a byte stream.
    pub fn open_file(&self, path: &str) -> FsResult<impl Read> {
        Ok(self.read_file(path)?.reader())
    }

    /// Hex object id of the file or directory at `path`.
    ///
    /// Equal content gives an equal checksum, and the checksum changes
    /// whenever anything below `path` changes. The root path gives the id of
    /// the root tree.
    pub fn checksum(&self, path: &str) -> FsResult<String> {
        let path = RepoPath::parse(path)?;
        let (root_id, root) = self.current_root(&path)?;
        if path.is_root() {
            return Ok(root_id.to_hex());
        }
        Ok(self.reader().locate(&root, &path)?.object_id.to_hex())
    }

    /// Store everything read from `content` at `path` as a new commit.
    pub fn write_file(
        &self,
        path: &str,
        mut content: impl Read,
        info: &CommitInfo,
    ) -> FsResult<WriteOutcome> {
        let path = RepoPath::parse(path)?;
        let mut data = Vec::new();
        content.read_to_end(&mut data)?;
        self.writer().write_file(&path, &data, info)
    }

    /// Make `path` exist as a directory by committing an empty placeholder
    /// file inside it.
    pub fn create_directory(&self, path: &str, info: &CommitInfo) -> FsResult<WriteOutcome> {
        let dir = RepoPath::parse(path)?;
        if dir.is_root() {
            return Err(FsError::InvalidPath {
                path: dir.to_string(),
                reason: "the root directory always exists".into(),
            });
        }
        let keep = dir.join(&self.config.keep_file_name)?;
        self.writer().write_file(&keep, &[], info)
    }

    fn writer(&self) -> CommitWriter<'_> {
        CommitWriter::new(self.objects.as_ref(), self.refs.as_ref())
    }

    /// Branch that `HEAD` names, which may differ from `config().branch` on
    /// a repository created with another branch.
    pub fn current_branch(&self) -> FsResult<String> {
        let state = self.resolver().resolve()?;
        let name = state.ref_name();
        Ok(name.strip_prefix(BRANCH_PREFIX).unwrap_or(name).to_string())
    }

    /// The commit `HEAD` points at, if any.
    pub fn head_commit(&self) -> FsResult<Option<(ObjectId, Commit)>> {
        let state = self.resolver().resolve()?;
        Ok(match (state.commit_id(), state.commit()) {
            (Some(id), Some(commit)) => Some((id, commit.clone())),
            _ => None,
        })
    }

    /// Up to `limit` commits, newest first, following parent links from
    /// `HEAD`.
    pub fn history(&self, limit: usize) -> FsResult<Vec<CommitSummary>> {
        let mut summaries = Vec::new();
        let mut next = self.refs.resolve(HEAD)?;
        while let Some(id) = next {
            if summaries.len() == limit {
                break;
            }
            let commit = self.objects.read_commit(&id)?;
            next = commit.parent;
            summaries.push(CommitSummary::new(id, commit));
        }
        Ok(summaries)
    }
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
