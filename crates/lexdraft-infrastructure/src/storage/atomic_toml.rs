//! Crash-safe TOML files.
//!
//! Writes go to a sibling `.<name>.tmp` file that is fsynced and renamed over
//! the target, so readers see either the old or the new content. Read-modify-
//! write cycles hold an exclusive `fs2` lock on `<name>.lock`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as IoWrite};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use lexdraft_core::LexdraftError;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtomicTomlError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Lock error on {path}: {message}")]
    Lock { path: PathBuf, message: String },
}

impl AtomicTomlError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the file exists but could not be parsed.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<AtomicTomlError> for LexdraftError {
    fn from(err: AtomicTomlError) -> Self {
        match err {
            AtomicTomlError::Parse { .. } | AtomicTomlError::Serialize(_) => {
                LexdraftError::Serialization {
                    format: "TOML".to_string(),
                    message: err.to_string(),
                }
            }
            AtomicTomlError::Io { .. } | AtomicTomlError::Lock { .. } => {
                LexdraftError::io(err.to_string())
            }
        }
    }
}

/// Handle to one TOML file holding a `T`.
#[derive(Debug)]
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for AtomicTomlFile<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> AtomicTomlFile<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Reads and parses the file.
    ///
    /// A missing or blank file is `Ok(None)`; a file that does not parse is
    /// [`AtomicTomlError::Parse`].
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AtomicTomlError::io(&self.path, err)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| AtomicTomlError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the file content with `data`.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        let text = toml::to_string_pretty(data)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AtomicTomlError::io(parent, e))?;
        }

        let tmp_path = self.temp_path();
        let write = || -> io::Result<()> {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(text.as_bytes())?;
            tmp.sync_all()?;
            drop(tmp);
            fs::rename(&tmp_path, &self.path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            AtomicTomlError::io(&self.path, e)
        })
    }

    /// Loads the current value (or `default`), lets `f` modify it and writes
    /// it back, all under the file lock.
    pub fn update<F>(&self, default: T, f: F) -> Result<T, AtomicTomlError>
    where
        F: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;
        let mut data = self.load()?.unwrap_or(default);
        f(&mut data);
        self.save(&data)?;
        Ok(data)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data.toml".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

/// Exclusive lock held for the guard's lifetime.
struct FileLock {
    _file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| AtomicTomlError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| AtomicTomlError::io(&lock_path, e))?;

        use fs2::FileExt;
        file.lock_exclusive().map_err(|e| AtomicTomlError::Lock {
            path: lock_path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            _file: file,
            lock_path,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Released with the handle; the lock file itself is best effort.
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        label: String,
        count: u32,
    }

    fn counter(count: u32) -> Counter {
        Counter {
            label: "drafts".to_string(),
            count,
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(dir.path().join("nested/counter.toml"));

        file.save(&counter(3)).unwrap();

        assert_eq!(file.load().unwrap(), Some(counter(3)));
        assert!(!dir.path().join("nested/.counter.toml.tmp").exists());
    }

    #[test]
    fn test_missing_and_blank_files_are_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counter.toml");
        let file = AtomicTomlFile::<Counter>::new(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_garbage_is_reported_as_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counter.toml");
        fs::write(&path, "count = [unterminated").unwrap();

        let err = AtomicTomlFile::<Counter>::new(path).load().unwrap_err();
        assert!(err.is_corrupt());
        assert!(LexdraftError::from(err).is_serialization());
    }

    #[test]
    fn test_update_starts_from_default_and_accumulates() {
        let dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(dir.path().join("counter.toml"));

        file.update(counter(0), |c| c.count += 10).unwrap();
        let after = file.update(counter(0), |c| c.count += 5).unwrap();

        assert_eq!(after.count, 15);
        assert_eq!(file.load().unwrap().unwrap().count, 15);
        assert!(!dir.path().join("counter.lock").exists());
    }
}
