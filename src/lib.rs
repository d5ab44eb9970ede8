//! assetfs: embed a directory tree in a binary and serve it read-only
//!
//! A build step packs a directory into a ZIP archive and emits it as Rust
//! source. At start-up the program registers that blob once; afterwards any
//! number of [`AssetFs`] instances can be built from it and shared across
//! threads. The file system supports:
//! - Open by `/`-rooted path, with directories synthesized from file paths
//! - Independent read/seek cursors per handle
//! - Paginated directory listings
//! - Pre-order tree walking and subtree scoping
//!
//! # Example
//!
//! ```no_run
//! use assetfs::{AssetFs, FileSystem};
//! use std::io::Read;
//!
//! # let archive: &'static [u8] = &[];
//! assetfs::register(archive);
//!
//! let fs = AssetFs::new()?;
//! let mut file = fs.open("/index.html")?;
//! let mut html = String::new();
//! file.read_to_string(&mut html)?;
//! # Ok::<(), assetfs::AssetFsError>(())
//! ```

// Core modules
pub mod archive;
pub mod builder;
pub mod codegen;
pub mod config;
pub mod error;
pub mod path;

mod chdir;
mod fs;
mod registry;
mod walk;

// Re-export commonly used types
pub use archive::{
    ArchiveReader, ArchiveWriter, CompressionMethod, EntryInfo, FileOptions, DIRECTORY_MODE,
    MAX_PATH_LENGTH,
};
pub use builder::build_archive;
pub use chdir::{chdir, ScopedFs};
pub use config::BuildOptions;
pub use error::{AssetFsError, Result};
pub use fs::{AssetFile, AssetFs, File, FileInfo, FileSystem};
pub use registry::{register, registered};
pub use walk::{read_file, walk};
