//! Vault Container Format
//!
//! A single-file "vault" packs multiple named, compressed byte blobs into one
//! file. A persisted pointer table tracks where each blob's bytes live, and a
//! free-space allocator reuses the holes left by removed entries.
//!
//! ## Features
//!
//! - **Self-describing layout**: a fixed 28-byte trailing footer locates the
//!   pointer table, so a vault reopens from nothing but its own bytes
//! - **Extent bookkeeping**: each entry is an ordered list of
//!   `(offset, length)` extents; large entries split across freed holes
//! - **First-fit reuse**: freed space is consumed in free-list order before
//!   the data region grows
//! - **zlib compression** of every entry payload
//!
//! ## On-disk layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Vault File                     │
//! ├─────────────────────────────────────────────┤
//! │ Data region (data_length bytes)             │
//! │  - compressed entry bytes, extent-addressed │
//! ├─────────────────────────────────────────────┤
//! │ Pointer table (table_length bytes)          │
//! │  - name → extents, plus "?empty" free list  │
//! ├─────────────────────────────────────────────┤
//! │ Footer (28 bytes)                           │
//! │  - magic "VULT"                             │
//! │  - u64 table_offset (from end-of-file)      │
//! │  - u64 table_length                         │
//! │  - u64 data_length                          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian and unsigned. The table and footer exist on
//! disk only between sessions: an open session truncates the file to the
//! data region and appends them again at close.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vault_rs::Vault;
//!
//! # fn main() -> vault_rs::Result<()> {
//! let mut vault = Vault::open("v.vault")?;
//! vault.capture("a.txt")?; // moves a.txt into the vault
//! for (name, compressed_size) in vault.list_entries() {
//!     println!("{name}: {compressed_size} bytes");
//! }
//! vault.release("a.txt", "/tmp")?; // extracts to /tmp/a.txt
//! vault.close()?; // mandatory: persists table + footer
//! # Ok(())
//! # }
//! ```
//!
//! ## Caveats
//!
//! - **Capture moves, it does not copy.** The source file is deleted once
//!   its bytes are inside the vault.
//! - **`close` is mandatory.** There is no write-ahead log; a session that
//!   never closes leaves a footerless file that cannot be reopened.
//! - Single writer only: one session owns the backing file exclusively.
//! - Adjacent freed extents are never coalesced and the data region never
//!   shrinks.

pub mod allocator;
pub mod blob;
pub mod error;
pub mod extent;
pub mod footer;
pub mod io;
pub mod table;
pub mod vault;

pub use allocator::FreeSpace;
pub use error::{Result, VaultError};
pub use extent::Extent;
pub use footer::{Footer, FOOTER_LEN, MAGIC};
pub use table::{PointerTable, FREE_LIST};
pub use vault::Vault;

/// Vault format version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
