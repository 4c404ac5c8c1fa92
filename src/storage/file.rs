//! File-backed storage.
//!
//! The entity is kept as the whole content of a regular file. Every
//! open/close cycle holds an `flock`-style advisory lock (via `fs2`), and every
//! write replaces the file content entirely: seek to start, truncate, write.
//! That sequence is only safe under the exclusive lock, which is why
//! [`FileStorage::set_object`] always runs inside a writer cycle.
//!
//! Placing the file on a RAM-backed filesystem (e.g. `/dev/shm`) makes it
//! behave much like a real shared-memory segment.

use super::{Access, Storage};
use crate::entity::Entity;
use crate::error::{Result, SharedError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Default size of the blocks the file is read in.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

#[derive(Debug)]
struct OpenFile {
    file: File,
    access: Access,
}

/// Storage keeping the entity in a single lockable file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    chunk_size: usize,
    handle: Option<OpenFile>,
}

impl FileStorage {
    /// Create a storage for `path`. Nothing is opened or created yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            handle: None,
        }
    }

    /// Read the file in blocks of `chunk_size` bytes (minimum 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The mode the file is currently locked in, if any.
    pub fn access(&self) -> Option<Access> {
        self.handle.as_ref().map(|open| open.access)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Open an existing file for a reader.
    ///
    /// Read-write is preferred so every handle looks the same; a file that is
    /// readable but not writable is still served read-only.
    fn open_for_read(&self) -> Result<File> {
        let read_write = OpenOptions::new().read(true).write(true).open(&self.path);
        let result = match read_write {
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                OpenOptions::new().read(true).open(&self.path)
            }
            other => other,
        };

        result.map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => SharedError::FileNotReadable(self.path.clone()),
            _ => SharedError::OpenFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            },
        })
    }

    /// Open (and create if needed) the file for a writer.
    fn open_for_write(&self) -> Result<File> {
        let existed = self.path.exists();
        let dir = self.parent_dir();
        if !existed && !dir.is_dir() {
            return Err(SharedError::DirectoryNotWritable(dir));
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied if existed => {
                    SharedError::FileNotWritable(self.path.clone())
                }
                ErrorKind::PermissionDenied => SharedError::DirectoryNotWritable(dir),
                _ => SharedError::OpenFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                },
            })
    }

    /// Take the advisory lock matching `access` and keep the handle.
    ///
    /// On failure the handle is dropped, so nothing stays locked.
    fn acquire(&mut self, file: File, access: Access) -> Result<()> {
        let locked = match access {
            Access::Read => FileExt::lock_shared(&file),
            Access::Write => FileExt::lock_exclusive(&file),
        };
        locked.map_err(|e| SharedError::LockFailed {
            path: self.path.clone(),
            reason: format!("{} lock refused: {}", access.as_str(), e),
        })?;

        log::debug!("locked '{}' for {}", self.path.display(), access.as_str());
        self.handle = Some(OpenFile { file, access });
        Ok(())
    }

    /// Read the locked file from its start to the true end of stream.
    fn read_all(&mut self) -> Result<Vec<u8>> {
        let Some(open) = self.handle.as_mut() else {
            return Ok(Vec::new());
        };

        let io_error = |e: std::io::Error| SharedError::WriteFailed {
            path: self.path.clone(),
            reason: format!("read failed: {}", e),
        };

        open.file.seek(SeekFrom::Start(0)).map_err(io_error)?;

        let mut contents = Vec::new();
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            match open.file.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => contents.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_error(e)),
            }
        }
        Ok(contents)
    }

    /// Truncate the locked file and write `bytes` as its whole content.
    fn replace_all(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(open) = self.handle.as_mut() else {
            return Err(SharedError::WriteFailed {
                path: self.path.clone(),
                reason: "file is not open for writing".to_string(),
            });
        };

        let io_error = |stage: &str, e: std::io::Error| SharedError::WriteFailed {
            path: self.path.clone(),
            reason: format!("{} failed: {}", stage, e),
        };

        open.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| io_error("seek", e))?;
        open.file.set_len(0).map_err(|e| io_error("truncate", e))?;
        open.file
            .write_all(bytes)
            .map_err(|e| io_error("write", e))?;
        open.file.sync_data().map_err(|e| io_error("sync", e))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn open_reader(&mut self) -> Result<()> {
        match self.access() {
            Some(Access::Read) => return Ok(()),
            Some(Access::Write) => self.close(),
            None => {}
        }

        if !self.path.exists() {
            log::debug!("'{}' does not exist, reading as empty", self.path.display());
            return Ok(());
        }

        let file = self.open_for_read()?;
        self.acquire(file, Access::Read)
    }

    fn open_writer(&mut self) -> Result<()> {
        match self.access() {
            Some(Access::Write) => return Ok(()),
            Some(Access::Read) => self.close(),
            None => {}
        }

        let file = self.open_for_write()?;
        self.acquire(file, Access::Write)
    }

    /// Opens a temporary reader when nothing is open.
    fn get_object(&mut self) -> Result<Entity> {
        let opened_here = self.handle.is_none();
        if opened_here {
            self.open_reader()?;
        }

        let contents = self.read_all();

        if opened_here {
            self.close();
        }
        Ok(Entity::from_bytes(&contents?))
    }

    /// Opens a temporary writer unless a writer is already open. An open
    /// reader is released first and not restored.
    fn set_object(&mut self, entity: &Entity) -> Result<()> {
        let bytes = entity.to_bytes().map_err(|e| SharedError::WriteFailed {
            path: self.path.clone(),
            reason: format!("failed to serialize shared state: {}", e),
        })?;

        let opened_here = self.access() != Some(Access::Write);
        if opened_here {
            self.open_writer()?;
        }

        let written = self.replace_all(&bytes);

        if opened_here {
            self.close();
        }
        written
    }

    fn close(&mut self) {
        if let Some(open) = self.handle.take() {
            if let Err(e) = FileExt::unlock(&open.file) {
                log::warn!("failed to unlock '{}': {}", self.path.display(), e);
            }
            log::debug!("released '{}'", self.path.display());
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        self.close();
    }
}
