use std::io;
use thiserror::Error;

/// Result type for assetfs operations
pub type Result<T> = std::result::Result<T, AssetFsError>;

/// Unified error type for all assetfs operations
#[derive(Debug, Error)]
pub enum AssetFsError {
    // Registry errors
    #[error("No archive data registered")]
    NoDataRegistered,

    // Archive errors
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Corrupt archive entry {path:?}: {reason}")]
    CorruptEntry { path: String, reason: String },

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error("CRC mismatch: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    // File system errors
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("End of file")]
    EndOfFile,

    #[error("Skip directory")]
    SkipDir,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // Builder errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AssetFsError {
    /// Wrap an error raised while decoding a single entry
    pub(crate) fn corrupt_entry(path: &str, reason: impl ToString) -> Self {
        AssetFsError::CorruptEntry {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetFsError::NotFound(_))
    }

    pub fn is_end_of_file(&self) -> bool {
        matches!(self, AssetFsError::EndOfFile)
    }
}

impl From<toml::de::Error> for AssetFsError {
    fn from(err: toml::de::Error) -> Self {
        AssetFsError::Config(err.to_string())
    }
}

impl From<walkdir::Error> for AssetFsError {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(io_err) => AssetFsError::Io(io_err),
            None => AssetFsError::Io(io::Error::new(
                io::ErrorKind::Other,
                "filesystem loop while walking source directory",
            )),
        }
    }
}

impl From<AssetFsError> for io::Error {
    fn from(err: AssetFsError) -> io::Error {
        match err {
            AssetFsError::Io(inner) => inner,
            AssetFsError::NotFound(_) => io::Error::new(io::ErrorKind::NotFound, err.to_string()),
            AssetFsError::EndOfFile => {
                io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string())
            }
            AssetFsError::CorruptArchive(_)
            | AssetFsError::CorruptEntry { .. }
            | AssetFsError::CrcMismatch { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err.to_string())
            }
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
