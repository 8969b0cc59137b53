//! Storage abstraction for named byte streams.
//!
//! [`ImageIo`](crate::ImageIo) acquires every stream through a [`Storage`],
//! so the same open/save code runs against the filesystem, memory, or a
//! test double that injects failures.
//!
//! Readers are released when dropped. Writers must be released with
//! [`StorageWriter::close`], which reports failures the drop path would
//! swallow.
//!
//! # Example
//!
//! ```rust
//! use imago_io::storage::{MemoryStorage, Storage};
//! use std::io::{Read, Write};
//! use std::path::Path;
//!
//! let storage = MemoryStorage::new();
//! let mut w = storage.create(Path::new("a.bin")).unwrap();
//! w.write_all(b"abc").unwrap();
//! w.close().unwrap();
//!
//! let mut buf = Vec::new();
//! storage.open(Path::new("a.bin")).unwrap().read_to_end(&mut buf).unwrap();
//! assert_eq!(buf, b"abc");
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Writable stream with an explicit, fallible release.
pub trait StorageWriter: Write {
    /// Flushes and releases the stream.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Source of named readable and writable streams.
pub trait Storage {
    /// Creates (or truncates) the stream called `name`.
    fn create(&self, name: &Path) -> io::Result<Box<dyn StorageWriter>>;

    /// Opens the stream called `name` for reading.
    fn open(&self, name: &Path) -> io::Result<Box<dyn Read>>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn create(&self, name: &Path) -> io::Result<Box<dyn StorageWriter>> {
        (**self).create(name)
    }

    fn open(&self, name: &Path) -> io::Result<Box<dyn Read>> {
        (**self).open(name)
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn create(&self, name: &Path) -> io::Result<Box<dyn StorageWriter>> {
        (**self).create(name)
    }

    fn open(&self, name: &Path) -> io::Result<Box<dyn Read>> {
        (**self).open(name)
    }
}

/// The local filesystem, with buffered streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl Storage for FileStorage {
    fn create(&self, name: &Path) -> io::Result<Box<dyn StorageWriter>> {
        let file = File::create(name)?;
        Ok(Box::new(FileWriter(BufWriter::new(file))))
    }

    fn open(&self, name: &Path) -> io::Result<Box<dyn Read>> {
        let file = File::open(name)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

struct FileWriter(BufWriter<File>);

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl StorageWriter for FileWriter {
    fn close(self: Box<Self>) -> io::Result<()> {
        let file = self.0.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

type Blobs = Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>;

/// In-memory storage keyed by path.
///
/// Clones share the same blobs. A written blob becomes visible when its
/// writer is closed; a writer dropped without closing leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Blobs,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` under `name`, replacing any previous blob.
    pub fn insert(&self, name: impl Into<PathBuf>, data: Vec<u8>) {
        self.lock().insert(name.into(), data);
    }

    /// Returns a copy of the blob stored under `name`.
    pub fn get(&self, name: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().get(name.as_ref()).cloned()
    }

    /// Returns `true` if a blob is stored under `name`.
    pub fn contains(&self, name: impl AsRef<Path>) -> bool {
        self.lock().contains_key(name.as_ref())
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        // a panicking writer cannot leave a half-inserted blob behind
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn create(&self, name: &Path) -> io::Result<Box<dyn StorageWriter>> {
        Ok(Box::new(MemoryWriter {
            name: name.to_path_buf(),
            buf: Vec::new(),
            blobs: Arc::clone(&self.blobs),
        }))
    }

    fn open(&self, name: &Path) -> io::Result<Box<dyn Read>> {
        match self.get(name) {
            Some(data) => Ok(Box::new(Cursor::new(data))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: not found in memory storage", name.display()),
            )),
        }
    }
}

struct MemoryWriter {
    name: PathBuf,
    buf: Vec<u8>,
    blobs: Blobs,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StorageWriter for MemoryWriter {
    fn close(self: Box<Self>) -> io::Result<()> {
        let MemoryWriter { name, buf, blobs } = *self;
        blobs.lock().unwrap_or_else(PoisonError::into_inner).insert(name, buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(storage: &dyn Storage, name: &str) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        storage.open(Path::new(name))?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    #[test]
    fn test_memory_commit_on_close() {
        let storage = MemoryStorage::new();
        let mut w = storage.create(Path::new("x.png")).unwrap();
        w.write_all(b"hello").unwrap();
        assert!(!storage.contains("x.png"));
        w.close().unwrap();
        assert_eq!(storage.get("x.png").as_deref(), Some(&b"hello"[..]));
        assert_eq!(read_all(&storage, "x.png").unwrap(), b"hello");
    }

    #[test]
    fn test_memory_drop_without_close() {
        let storage = MemoryStorage::new();
        {
            let mut w = storage.create(Path::new("x.png")).unwrap();
            w.write_all(b"lost").unwrap();
        }
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_missing() {
        let storage = MemoryStorage::new();
        let err = read_all(&storage, "nope.png").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_memory_clones_share() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.insert("k", vec![1, 2, 3]);
        assert_eq!(b.len(), 1);
        assert_eq!(read_all(&b, "k").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let storage = FileStorage;
        let mut w = storage.create(&path).unwrap();
        w.write_all(&[9; 10_000]).unwrap();
        w.close().unwrap();
        assert_eq!(read_all(&storage, path.to_str().unwrap()).unwrap(), vec![9; 10_000]);
    }

    #[test]
    fn test_file_storage_open_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileStorage.open(&dir.path().join("missing.png")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
