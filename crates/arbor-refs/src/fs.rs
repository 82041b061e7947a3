//! Reference store backed by one small text file per ref.
//!
//! ```text
//! <root>/
//!   HEAD                 ref: refs/heads/main
//!   refs/heads/main      3fa9c4...
//! ```
//!
//! Every update takes a `<name>.lock` file created exclusively, writes the
//! new value into it and renames it over the ref. A writer that finds the
//! lock already present fails with [`RefError::Locked`] instead of waiting.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::{describe, RefStore};
use crate::types::Ref;

/// Filesystem-backed [`RefStore`].
#[derive(Debug, Clone)]
pub struct FsRefStore {
    root: PathBuf,
    fsync: bool,
}

impl FsRefStore {
    /// Open (or create) a ref directory at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root, fsync: true })
    }

    /// Whether lock files are fsynced before being renamed over the ref.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `name`. Names are validated first, so the path never
    /// leaves `root`.
    fn ref_path(&self, name: &str) -> Result<PathBuf> {
        validate_ref_name(name)?;
        Ok(name
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part)))
    }

    fn lock(&self, name: &str) -> Result<RefLock> {
        RefLock::acquire(name, self.ref_path(name)?)
    }
}

impl RefStore for FsRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<Ref>> {
        let text = match fs::read_to_string(self.ref_path(name)?) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ref::parse(&text).map(Some).ok_or_else(|| RefError::Corrupt {
            name: name.to_string(),
            reason: format!("unrecognised contents {:?}", text.trim_end()),
        })
    }

    fn write_ref(&self, name: &str, value: &Ref) -> Result<()> {
        self.lock(name)?.commit(value, self.fsync)
    }

    fn compare_and_swap(&self, name: &str, expected: Option<&Ref>, new: &Ref) -> Result<()> {
        let lock = self.lock(name)?;

        let current = self.read_ref(name)?;
        if current.as_ref() != expected {
            return Err(RefError::Conflict {
                name: name.to_string(),
                expected: describe(expected),
                actual: describe(current.as_ref()),
            });
        }

        lock.commit(new, self.fsync)?;
        debug!(reference = name, from = %describe(expected), to = %new, "ref updated");
        Ok(())
    }
}

/// An exclusively created `<ref>.lock` file.
///
/// Dropping the guard without committing removes the lock file.
struct RefLock {
    name: String,
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl RefLock {
    fn acquire(name: &str, target: PathBuf) -> Result<Self> {
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut lock_path = target.clone().into_os_string();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(RefError::Locked {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            name: name.to_string(),
            target,
            lock_path,
            file: Some(file),
            committed: false,
        })
    }

    fn commit(mut self, value: &Ref, fsync: bool) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            writeln!(file, "{value}")?;
            if fsync {
                file.sync_all()?;
            }
        }
        fs::rename(&self.lock_path, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for RefLock {
    fn drop(&mut self) {
        self.file.take();
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.lock_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(reference = %self.name, error = %e, "failed to remove ref lock");
            }
        }
    }
}
