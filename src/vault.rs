//! Vault session: the stateful façade over footer, table, allocator and
//! blob codec.
//!
//! A session owns its backing file exclusively from `open` to `close`. At
//! open the trailing table and footer are decoded into memory and the file
//! is truncated to its pure data region; at close the table and footer are
//! re-serialized and appended. There is no write-ahead log: a crash between
//! data writes and `close` leaves a footerless file that cannot be reopened.
//! That state is unrecoverable by design and is reported as a format error,
//! never silently repaired.
//!
//! `close` must be called on every exit path. Dropping a session without
//! closing it only logs a warning; nothing is persisted.

use crate::allocator::FreeSpace;
use crate::blob;
use crate::error::{Result, VaultError};
use crate::extent::Extent;
use crate::footer::{Footer, FOOTER_LEN};
use crate::io::VaultFile;
use crate::table::{self, PointerTable, FREE_LIST};
use std::fs;
use std::io;
use std::path::Path;

/// An open vault session.
///
/// Created with [`Vault::open`], finished with [`Vault::close`]. All
/// operations are synchronous, blocking, in-process calls; the session
/// performs no internal locking because concurrent access to the backing
/// file is not supported.
pub struct Vault {
    file: VaultFile,
    /// File name of the backing file, used for the self-capture check
    name: String,
    table: PointerTable,
    space: FreeSpace,
    guard: CloseGuard,
}

/// Warns when a session is dropped without an explicit `close`
struct CloseGuard {
    armed: bool,
    name: String,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(
                vault = %self.name,
                "vault session dropped without close(); pointer table was not persisted"
            );
        }
    }
}

impl Vault {
    /// Open a vault session at `path`.
    ///
    /// When the path does not exist, a fresh vault starts with an empty
    /// pointer table and an empty data region. When it does, the footer is
    /// decoded from the last 28 bytes (failing on bad magic), the pointer
    /// table is decoded from its recorded offset, and the backing file is
    /// truncated to the pure data region for the session's lifetime.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                VaultError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "vault path has no file name",
                ))
            })?;

        let existing = path.is_file();
        let mut file = VaultFile::open(path)?;

        if !existing {
            tracing::debug!(vault = %name, "starting a fresh vault");
            let guard = CloseGuard { armed: true, name: name.clone() };
            return Ok(Vault {
                file,
                name,
                table: PointerTable::new(),
                space: FreeSpace::empty(),
                guard,
            });
        }

        let file_len = file.len()?;
        if file_len < FOOTER_LEN as u64 {
            return Err(VaultError::CorruptFooter(format!(
                "file is only {} bytes, too short to hold a footer",
                file_len
            )));
        }

        let footer = Footer::from_bytes(&file.read_tail(FOOTER_LEN as u64)?)?;
        if footer.table_offset > file_len {
            return Err(VaultError::CorruptFooter(format!(
                "table offset {} exceeds file length {}",
                footer.table_offset, file_len
            )));
        }

        let table_start = file_len - footer.table_offset;
        let (table, free) = table::decode(&file.read_at(table_start, footer.table_length)?)?;

        // The session works against the bare data region; table and footer
        // are reconstructed in memory and re-appended at close
        file.truncate(table_start)?;

        tracing::debug!(
            vault = %name,
            entries = table.len(),
            data_length = footer.data_length,
            "opened existing vault"
        );

        let guard = CloseGuard { armed: true, name: name.clone() };
        Ok(Vault {
            file,
            name,
            table,
            space: FreeSpace::new(free, footer.data_length),
            guard,
        })
    }

    /// Capture a file into the vault.
    ///
    /// The source's bytes are compressed, written into free space (growing
    /// the data region only for the shortfall) and recorded under the
    /// source's file name.
    ///
    /// **`capture` moves, it does not copy**: the source file is deleted
    /// once its bytes are inside the vault. An I/O failure after allocation
    /// leaves the source in place, but the half-written vault state is not
    /// rolled back.
    ///
    /// Fails with [`VaultError::SelfCapture`] when the source is the vault's
    /// own backing file, [`VaultError::ReservedName`] for the free-list
    /// sentinel and [`VaultError::DuplicateEntry`] when the name is already
    /// present. All three rejections leave every piece of state untouched.
    pub fn capture<P: AsRef<Path>>(&mut self, source: P) -> Result<()> {
        let source = source.as_ref();
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                VaultError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "source path has no file name",
                ))
            })?;

        if name == self.name {
            return Err(VaultError::SelfCapture);
        }
        if name == FREE_LIST {
            return Err(VaultError::ReservedName(name));
        }
        if self.table.contains(&name) {
            return Err(VaultError::DuplicateEntry(name));
        }

        let payload = fs::read(source)?;
        let compressed = blob::compress(&payload)?;

        let extents = self.space.allocate(compressed.len() as u64);
        let mut cursor = 0usize;
        for extent in &extents {
            let end = cursor + extent.length as usize;
            self.file.write_at(extent.offset, &compressed[cursor..end])?;
            cursor = end;
        }
        self.table.insert_extents(&name, extents);

        // Move semantics: the source lives on only inside the vault
        fs::remove_file(source)?;

        tracing::debug!(
            vault = %self.name,
            entry = %name,
            raw = payload.len(),
            compressed = compressed.len(),
            "captured file"
        );
        Ok(())
    }

    /// Release an entry to `dest_dir/name`, freeing its extents.
    ///
    /// Returns `Ok(false)` when no such entry exists; that is a normal
    /// outcome, not an error. Asking for the free-list sentinel fails with
    /// [`VaultError::ReservedName`].
    pub fn release<P: AsRef<Path>>(&mut self, name: &str, dest_dir: P) -> Result<bool> {
        if name == FREE_LIST {
            return Err(VaultError::ReservedName(name.to_owned()));
        }

        let extents: Vec<Extent> = match self.table.get(name) {
            Some(extents) => extents.to_vec(),
            None => return Ok(false),
        };

        let total: u64 = extents.iter().map(|e| e.length).sum();
        let mut compressed = Vec::with_capacity(total as usize);
        for extent in &extents {
            compressed.extend_from_slice(&self.file.read_at(extent.offset, extent.length)?);
        }

        let payload = blob::decompress(&compressed)?;
        fs::write(dest_dir.as_ref().join(name), payload)?;

        if let Some(freed) = self.table.remove(name) {
            self.space.reclaim(freed);
        }

        tracing::debug!(vault = %self.name, entry = %name, "released file");
        Ok(true)
    }

    /// Whether an entry with this name is present
    pub fn file_exists(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    /// Extents of an entry, in concatenation order
    pub fn extents_of(&self, name: &str) -> Option<&[Extent]> {
        self.table.get(name)
    }

    /// Compressed size of an entry, or `None` when absent
    pub fn get_size_of(&self, name: &str) -> Option<u64> {
        self.table.size_of(name)
    }

    /// Every entry with its total compressed size, in table order
    pub fn list_entries(&self) -> Vec<(String, u64)> {
        self.table
            .iter()
            .map(|(name, extents)| {
                (name.to_owned(), extents.iter().map(|e| e.length).sum())
            })
            .collect()
    }

    /// High-water mark of the data region. Never decreases, even when
    /// entries are released.
    pub fn data_length(&self) -> u64 {
        self.space.data_length()
    }

    /// Free-list extents in allocation order
    pub fn free_extents(&self) -> &[Extent] {
        self.space.slots()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// File name of the backing file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the session.
    ///
    /// An all-empty vault is not persisted: when no entries remain, the
    /// backing file is deleted. Otherwise the pointer table and a recomputed
    /// footer are appended after the data region and synced.
    pub fn close(self) -> Result<()> {
        let Vault {
            mut file,
            name,
            table,
            space,
            mut guard,
        } = self;
        guard.armed = false;

        if table.is_empty() {
            tracing::debug!(vault = %name, "closing empty vault, removing backing file");
            return file.delete();
        }

        let encoded = table::encode(&table, space.slots())?;
        let footer = Footer::for_table(encoded.len() as u64, space.data_length());
        file.append(&encoded)?;
        file.append(&footer.to_bytes())?;
        file.sync()?;

        tracing::debug!(
            vault = %name,
            entries = table.len(),
            data_length = space.data_length(),
            "closed vault"
        );
        Ok(())
    }
}
