//! Pack a directory tree into a ZIP archive.
//!
//! One entry per regular file, named by its forward-slash path relative to
//! the source directory. Directories get no records; [`AssetFs`] rebuilds
//! them from the file paths.
//!
//! [`AssetFs`]: crate::AssetFs

use crate::archive::{system_time_to_unix, ArchiveWriter, CompressionMethod, FileOptions};
use crate::config::BuildOptions;
use crate::error::{AssetFsError, Result};
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

/// Build an archive from every file under `src`.
///
/// Entries are added in file-name order, so with
/// [`BuildOptions::fixed_mtime`] set the output is byte-identical across
/// runs.
pub fn build_archive<P: AsRef<Path>>(src: P, options: &BuildOptions) -> Result<Vec<u8>> {
    let src = src.as_ref();
    options.validate()?;

    if !std::fs::metadata(src)?.is_dir() {
        return Err(AssetFsError::InvalidPath(format!(
            "source is not a directory: {}",
            src.display()
        )));
    }

    let compression = if options.compress {
        CompressionMethod::Deflate
    } else {
        CompressionMethod::Stored
    };

    let mut writer = ArchiveWriter::new(Vec::new());
    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(options.skip_hidden && entry.depth() > 0 && is_hidden(entry)));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        // Follow symlinks to files; links to directories are skipped
        let metadata = std::fs::metadata(entry.path())?;
        if !metadata.is_file() {
            tracing::debug!(path = %entry.path().display(), "skipping non-regular file");
            continue;
        }

        let relative = relative_name(src, entry.path())?;
        if !options.includes(&relative) {
            tracing::trace!(path = %relative, "excluded by extension filter");
            continue;
        }

        let data = std::fs::read(entry.path())?;
        let modified = match options.fixed_mtime {
            Some(secs) => secs,
            None => system_time_to_unix(metadata.modified()?),
        };

        writer.add_file(
            &relative,
            &data,
            FileOptions::default()
                .compression(compression)
                .mode(file_mode(&metadata))
                .modified(modified),
        )?;
    }

    tracing::debug!(files = writer.entry_count(), src = %src.display(), "directory archived");
    writer.finish()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// `src`-relative path with forward slashes
fn relative_name(src: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(src).map_err(|_| {
        AssetFsError::InvalidPath(format!("{} is outside {}", path.display(), src.display()))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                AssetFsError::InvalidPath(format!("non UTF-8 file name: {}", path.display()))
            })?),
            _ => {
                return Err(AssetFsError::InvalidPath(format!(
                    "unexpected path component in {}",
                    path.display()
                )))
            }
        }
    }
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use crate::archive::S_IFMT;
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & (S_IFMT | 0o7777)
}

#[cfg(not(unix))]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use crate::archive::S_IFREG;
    if metadata.permissions().readonly() {
        S_IFREG | 0o444
    } else {
        S_IFREG | 0o644
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveReader, S_IFMT, S_IFREG};
    use std::fs;

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("general-file"), b"keep").unwrap();
        fs::write(dir.path().join(".hidden"), b"skip").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("config"), b"skip").unwrap();

        let data = build_archive(dir.path(), &BuildOptions::default()).unwrap();
        let reader = ArchiveReader::new(&data).unwrap();
        let names: Vec<&str> = reader.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["general-file"]);
    }

    #[test]
    fn test_hidden_entries_kept_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), b"x").unwrap();

        let options = BuildOptions {
            skip_hidden: false,
            ..BuildOptions::default()
        };
        let data = build_archive(dir.path(), &options).unwrap();
        assert!(ArchiveReader::new(&data).unwrap().contains(".env"));
    }

    #[test]
    fn test_nested_paths_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("css/vendor")).unwrap();
        fs::write(dir.path().join("index.html"), b"<html>").unwrap();
        fs::write(dir.path().join("css/vendor/reset.css"), b"*{}").unwrap();
        fs::write(dir.path().join("notes.txt"), b"todo").unwrap();

        let options = BuildOptions {
            include: vec!["html".into(), "*.css".into()],
            ..BuildOptions::default()
        };
        let data = build_archive(dir.path(), &options).unwrap();
        let reader = ArchiveReader::new(&data).unwrap();
        let names: Vec<&str> = reader.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["css/vendor/reset.css", "index.html"]);
    }

    #[test]
    fn test_fixed_mtime_and_stored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.txt"), "repeat ".repeat(1000)).unwrap();

        let options = BuildOptions {
            compress: false,
            fixed_mtime: Some(946_684_800),
            ..BuildOptions::default()
        };
        let data = build_archive(dir.path(), &options).unwrap();
        let reader = ArchiveReader::new(&data).unwrap();
        let entry = reader.get_entry("big.txt").unwrap();
        assert_eq!(entry.compression().unwrap(), CompressionMethod::Stored);
        assert_eq!(entry.modified_time, 946_684_800);
        assert_eq!(entry.mode & S_IFMT, S_IFREG);
    }

    #[test]
    fn test_source_must_be_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            build_archive(file.path(), &BuildOptions::default()),
            Err(AssetFsError::InvalidPath(_))
        ));
        assert!(matches!(
            build_archive("/definitely/not/here", &BuildOptions::default()),
            Err(AssetFsError::Io(_))
        ));
    }
}
