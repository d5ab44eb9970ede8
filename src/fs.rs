//! In-memory, archive-backed read-only file system.
//!
//! [`AssetFs`] decodes a ZIP blob once, indexes every entry under a rooted
//! logical path (`/sub_dir/index.html`) and synthesizes the directories the
//! flat entry list only implies. The index is immutable after construction
//! and shared behind an `Arc`, so any number of threads may open and read
//! concurrently; each [`AssetFile`] owns its own cursor.

use crate::archive::{unix_to_system_time, ArchiveReader, DIRECTORY_MODE, S_IFDIR, S_IFMT};
use crate::error::{AssetFsError, Result};
use crate::path;
use crate::registry;
use crate::ScopedFs;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A hierarchical read-only file system
pub trait FileSystem: Send + Sync {
    /// Open the file or directory at a `/`-rooted path
    fn open(&self, name: &str) -> Result<Box<dyn File>>;

    /// Lets [`chdir`](crate::chdir) compose prefixes instead of stacking
    /// wrappers. Only [`ScopedFs`] overrides this.
    fn as_scoped(&self) -> Option<&ScopedFs> {
        None
    }
}

/// An open file or directory
pub trait File: Read + Seek + Send {
    /// Metadata of the opened node
    fn stat(&self) -> Result<FileInfo>;

    /// List directory children.
    ///
    /// `count <= 0` returns every child not yet returned, never an error.
    /// `count > 0` returns up to `count` children and fails with
    /// [`AssetFsError::EndOfFile`] once none remain. Regular files return an
    /// empty list.
    fn read_dir(&mut self, count: isize) -> Result<Vec<FileInfo>>;

    /// Release the handle. Always succeeds and may be called repeatedly.
    fn close(&mut self) -> Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn open(&self, name: &str) -> Result<Box<dyn File>> {
        (**self).open(name)
    }

    fn as_scoped(&self) -> Option<&ScopedFs> {
        (**self).as_scoped()
    }
}

/// Metadata returned by [`File::stat`] and [`File::read_dir`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    name: String,
    size: u64,
    mode: u32,
    modified: SystemTime,
    is_dir: bool,
}

impl FileInfo {
    fn file(key: &str, size: u64, mode: u32, modified: SystemTime) -> Self {
        Self {
            name: path::base_name(key).to_string(),
            size,
            mode,
            modified,
            is_dir: false,
        }
    }

    fn directory(key: &str, mode: u32, modified: SystemTime) -> Self {
        Self {
            name: path::base_name(key).to_string(),
            size: 0,
            mode,
            modified,
            is_dir: true,
        }
    }

    /// Base name of the path; `/` for the root
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uncompressed size in bytes; zero for directories
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Unix mode including the file type bits
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Permission bits only
    pub fn permissions(&self) -> u32 {
        self.mode & 0o777
    }

    /// Modification time; the unix epoch for synthesized directories
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// An indexed node: file bytes or a directory
#[derive(Debug, Clone)]
enum Node {
    File { info: FileInfo, data: Arc<[u8]> },
    Dir { info: FileInfo },
}

impl Node {
    fn info(&self) -> &FileInfo {
        match self {
            Node::File { info, .. } | Node::Dir { info } => info,
        }
    }

    fn synthesized_dir(key: &str) -> Self {
        Node::Dir {
            info: FileInfo::directory(key, DIRECTORY_MODE, UNIX_EPOCH),
        }
    }
}

type Index = HashMap<String, Node>;

/// Read-only file system over a decoded archive.
///
/// Cloning is cheap and clones share the same index.
#[derive(Clone)]
pub struct AssetFs {
    index: Arc<Index>,
}

impl AssetFs {
    /// Build from the blob registered with [`register`](crate::register)
    pub fn new() -> Result<Self> {
        let data = registry::registered().ok_or(AssetFsError::NoDataRegistered)?;
        Self::from_bytes(&data)
    }

    /// Build directly from archive bytes, bypassing the registry
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let reader = ArchiveReader::new(data)?;

        let mut index = Index::with_capacity(reader.entry_count() + 1);
        for entry in reader.entries() {
            let key = path::from_entry_name(&entry.path);
            let modified = unix_to_system_time(entry.modified_time);

            if entry.is_dir() {
                let mode = match entry.mode & S_IFMT {
                    S_IFDIR => entry.mode,
                    _ => DIRECTORY_MODE,
                };
                let info = FileInfo::directory(&key, mode, modified);
                index.insert(key, Node::Dir { info });
                continue;
            }

            if key == "/" {
                return Err(AssetFsError::corrupt_entry(&entry.path, "empty entry name"));
            }

            let data = reader.read_entry(entry)?;
            let info = FileInfo::file(&key, data.len() as u64, entry.mode, modified);
            tracing::trace!(path = %key, size = data.len(), "indexed file");
            index.insert(
                key,
                Node::File {
                    info,
                    data: data.into(),
                },
            );
        }

        let explicit = index.len();
        let synthesized = synthesize_directories(&mut index);
        tracing::debug!(entries = explicit, synthesized, "asset file system built");

        Ok(Self {
            index: Arc::new(index),
        })
    }

    /// Number of indexed paths, directories included
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false: the root directory is always indexed
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether a path is indexed
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&path::collapse_slashes(name))
    }

    /// Every indexed path, in no particular order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Open a path, returning the concrete handle type.
    ///
    /// `name` must already be `/`-rooted; doubled separators are collapsed.
    pub fn open_file(&self, name: &str) -> Result<AssetFile> {
        let key = path::collapse_slashes(name);
        let node = self
            .index
            .get(&key)
            .ok_or_else(|| AssetFsError::NotFound(name.to_string()))?;

        let state = match node {
            Node::File { data, .. } => State::Regular(Cursor::new(Arc::clone(data))),
            Node::Dir { .. } => State::Directory {
                path: key.clone(),
                index: Arc::clone(&self.index),
                listing: None,
                position: 0,
            },
        };

        Ok(AssetFile {
            info: node.info().clone(),
            state,
        })
    }
}

impl FileSystem for AssetFs {
    fn open(&self, name: &str) -> Result<Box<dyn File>> {
        Ok(Box::new(self.open_file(name)?))
    }
}

impl fmt::Debug for AssetFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetFs")
            .field("paths", &self.index.len())
            .finish()
    }
}

/// Insert a directory node for every missing ancestor of every indexed
/// path, the root included. Returns how many were added.
fn synthesize_directories(index: &mut Index) -> usize {
    let mut added = 0;
    if !index.contains_key("/") {
        index.insert("/".to_string(), Node::synthesized_dir("/"));
        added += 1;
    }

    let keys: Vec<String> = index.keys().cloned().collect();
    for key in keys {
        let mut current = key.as_str();
        while let Some(parent) = path::parent(current) {
            // Present ancestors are either explicit keys, visited on their
            // own, or were synthesized together with all of theirs.
            if index.contains_key(parent) {
                break;
            }
            index.insert(parent.to_string(), Node::synthesized_dir(parent));
            added += 1;
            current = parent;
        }
    }
    added
}

enum State {
    Regular(Cursor<Arc<[u8]>>),
    Directory {
        path: String,
        index: Arc<Index>,
        /// Children snapshot taken on the first listing call, name-sorted
        listing: Option<Vec<FileInfo>>,
        position: usize,
    },
}

/// Handle returned by [`AssetFs::open_file`].
///
/// Regular files read from a private cursor over bytes shared with the file
/// system; directories page through their direct children.
pub struct AssetFile {
    info: FileInfo,
    state: State,
}

impl AssetFile {
    pub fn is_dir(&self) -> bool {
        self.info.is_dir
    }

    /// The whole content of a regular file, regardless of the cursor
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.state {
            State::Regular(cursor) => Some(cursor.get_ref()),
            State::Directory { .. } => None,
        }
    }
}

impl File for AssetFile {
    fn stat(&self) -> Result<FileInfo> {
        Ok(self.info.clone())
    }

    fn read_dir(&mut self, count: isize) -> Result<Vec<FileInfo>> {
        let State::Directory {
            path: dir_path,
            index,
            listing,
            position,
        } = &mut self.state
        else {
            return Ok(Vec::new());
        };

        let listing = listing.get_or_insert_with(|| {
            let mut children: Vec<FileInfo> = index
                .iter()
                .filter(|(key, _)| path::is_direct_child(dir_path, key))
                .map(|(_, node)| node.info().clone())
                .collect();
            children.sort_by(|a, b| a.name.cmp(&b.name));
            children
        });

        let remaining = &listing[*position..];
        if count <= 0 {
            *position = listing.len();
            return Ok(remaining.to_vec());
        }
        if remaining.is_empty() {
            return Err(AssetFsError::EndOfFile);
        }

        let take = remaining.len().min(count as usize);
        let page = remaining[..take].to_vec();
        *position += take;
        Ok(page)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Read for AssetFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.state {
            State::Regular(cursor) => cursor.read(buf),
            State::Directory { .. } => Err(AssetFsError::EndOfFile.into()),
        }
    }
}

impl Seek for AssetFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.state {
            State::Regular(cursor) => cursor.seek(pos),
            State::Directory { position, .. } => {
                // Rewinding restarts the listing; nothing else is meaningful
                if pos == SeekFrom::Start(0) {
                    *position = 0;
                }
                Ok(0)
            }
        }
    }
}

impl fmt::Debug for AssetFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetFile")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
