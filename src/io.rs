//! Disk I/O for the vault's backing file.

use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Disk-backed vault storage.
///
/// Holds the backing file open for the whole session; the session has
/// exclusive use of it, so there is no locking here.
pub struct VaultFile {
    file: File,
    path: PathBuf,
}

impl VaultFile {
    /// Open the backing file, creating it empty when it does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        Ok(VaultFile {
            file,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Current file length in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Read exactly `length` bytes starting at `offset`
    pub fn read_at(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; length as usize];
        self.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read the last `length` bytes of the file
    pub fn read_tail(&mut self, length: u64) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::End(-(length as i64)))?;
        let mut buffer = vec![0u8; length as usize];
        self.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Write `data` starting at `offset`, extending the file if needed
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        Ok(())
    }

    /// Append `data` at the end of the file
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(data)?;
        Ok(())
    }

    /// Truncate the file to `len` bytes
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        Ok(())
    }

    /// Sync all writes to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the handle and remove the backing file
    pub fn delete(self) -> Result<()> {
        let VaultFile { file, path } = self;
        drop(file); // Windows cannot remove an open file
        std::fs::remove_file(path)?;
        Ok(())
    }
}
