//! Narrow file access used by template and component loading

use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// Open-by-name access to raw bytes.
///
/// Components and the builder never touch the filesystem directly; they go
/// through this interface so tests can substitute in-memory files.
pub trait FileSource: fmt::Debug {
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// [`FileSource`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFiles;

impl FileSource for OsFiles {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(name)
    }
}

/// In-memory [`FileSource`] for tests and embedded assets.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.files.insert(name.to_string(), data);
    }

    pub fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }
}

impl FileSource for MemoryFiles {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no file named {name}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_files_round_trip() {
        let files = MemoryFiles::new().with_file("a.txt", b"hello".to_vec());
        assert_eq!(files.read("a.txt").expect("Should read"), b"hello");
        assert!(files.read("missing.txt").is_err());
    }
}
