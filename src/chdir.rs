//! Present a subtree of a file system as its root.

use crate::error::{AssetFsError, Result};
use crate::fs::{File, FileSystem};
use crate::path;
use std::fmt;
use std::sync::Arc;

/// File system rebasing every open under a fixed directory prefix
#[derive(Clone)]
pub struct ScopedFs {
    prefix: String,
    system: Arc<dyn FileSystem>,
}

impl ScopedFs {
    /// The cleaned, `/`-rooted prefix inside the underlying file system
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Scope further into `dir`, relative to this scope
    pub fn chdir(&self, dir: &str) -> Result<ScopedFs> {
        if !is_existing_dir(self, dir) {
            return Err(AssetFsError::NotFound(dir.to_string()));
        }
        Ok(ScopedFs {
            prefix: path::join(&self.prefix, &path::clean(dir)),
            system: Arc::clone(&self.system),
        })
    }
}

impl FileSystem for ScopedFs {
    fn open(&self, name: &str) -> Result<Box<dyn File>> {
        let name = path::clean(name);
        self.system.open(&path::join(&self.prefix, &name))
    }

    fn as_scoped(&self) -> Option<&ScopedFs> {
        Some(self)
    }
}

impl fmt::Debug for ScopedFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedFs")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Scope `system` to the directory `dir`.
///
/// Fails with [`AssetFsError::NotFound`] when `dir` is missing or not a
/// directory. Scoping an already scoped file system composes the prefixes,
/// so chained calls never stack wrappers.
pub fn chdir(system: Arc<dyn FileSystem>, dir: &str) -> Result<ScopedFs> {
    if let Some(scoped) = system.as_scoped() {
        return scoped.chdir(dir);
    }

    if !is_existing_dir(system.as_ref(), dir) {
        return Err(AssetFsError::NotFound(dir.to_string()));
    }
    Ok(ScopedFs {
        prefix: path::clean(dir),
        system,
    })
}

fn is_existing_dir(system: &dyn FileSystem, dir: &str) -> bool {
    let Ok(mut file) = system.open(&path::clean(dir)) else {
        return false;
    };
    let is_dir = file.stat().map(|info| info.is_dir()).unwrap_or(false);
    let _ = file.close();
    is_dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveWriter, FileOptions};
    use crate::AssetFs;
    use std::io::Read;

    fn nested() -> Arc<dyn FileSystem> {
        let mut writer = ArchiveWriter::new(Vec::new());
        for (name, data) in [
            ("index.html", "root"),
            ("public/index.html", "public"),
            ("public/css/site.css", "body{}"),
        ] {
            writer
                .add_file(name, data.as_bytes(), FileOptions::default().modified(0))
                .unwrap();
        }
        Arc::new(AssetFs::from_bytes(&writer.finish().unwrap()).unwrap())
    }

    fn read(system: &dyn FileSystem, name: &str) -> String {
        let mut out = String::new();
        system.open(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_chdir_rebases_open() {
        let scoped = chdir(nested(), "/public").unwrap();
        assert_eq!(scoped.prefix(), "/public");
        assert_eq!(read(&scoped, "/index.html"), "public");
        assert_eq!(read(&scoped, "index.html"), "public");
        assert_eq!(read(&scoped, "/css/site.css"), "body{}");
    }

    #[test]
    fn test_chdir_cannot_escape_prefix() {
        let scoped = chdir(nested(), "/public").unwrap();
        // ".." is resolved before joining, so the root file stays hidden
        assert_eq!(read(&scoped, "/../index.html"), "public");
    }

    #[test]
    fn test_chdir_missing_or_file() {
        assert!(matches!(
            chdir(nested(), "/nope"),
            Err(AssetFsError::NotFound(_))
        ));
        assert!(matches!(
            chdir(nested(), "/index.html"),
            Err(AssetFsError::NotFound(_))
        ));
    }

    #[test]
    fn test_chained_chdir_collapses() {
        let first: Arc<dyn FileSystem> = Arc::new(chdir(nested(), "/public").unwrap());
        let second = chdir(first, "css").unwrap();
        assert_eq!(second.prefix(), "/public/css");
        assert_eq!(read(&second, "/site.css"), "body{}");

        // The composed scope wraps the original file system directly
        assert!(second.system.as_scoped().is_none());
    }
}
