use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Invalid magic bytes: file is not a vault")]
    InvalidMagic,

    #[error("Corrupt footer: {0}")]
    CorruptFooter(String),

    #[error("Corrupt pointer table: {0}")]
    CorruptTable(String),

    #[error("An entry named \"{0}\" already exists in the vault")]
    DuplicateEntry(String),

    #[error("A vault cannot capture its own backing file")]
    SelfCapture,

    #[error("\"{0}\" is reserved for the free list")]
    ReservedName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt compressed payload: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
