//! Generic traversal over any [`FileSystem`].

use crate::error::{AssetFsError, Result};
use crate::fs::{FileInfo, FileSystem};
use crate::path;
use std::io::Read;

/// Walk the tree rooted at `root` in pre-order, calling `visit` for every
/// file and directory, `root` included.
///
/// Each path is opened, stat'ed and, for directories, fully listed before
/// `visit` sees it. Any error from those steps is handed to `visit` first
/// (with the metadata when it was obtained); returning `Ok(())` moves on
/// without descending.
///
/// Returning [`AssetFsError::SkipDir`] from a directory skips its contents;
/// from a file it is ignored. Any other error stops the walk and is
/// returned.
pub fn walk<F>(system: &dyn FileSystem, root: &str, mut visit: F) -> Result<()>
where
    F: FnMut(&str, Option<&FileInfo>, Option<AssetFsError>) -> Result<()>,
{
    match walk_path(system, root, &mut visit) {
        Err(AssetFsError::SkipDir) => Ok(()),
        other => other,
    }
}

fn walk_path<F>(system: &dyn FileSystem, name: &str, visit: &mut F) -> Result<()>
where
    F: FnMut(&str, Option<&FileInfo>, Option<AssetFsError>) -> Result<()>,
{
    let mut file = match system.open(name) {
        Ok(file) => file,
        Err(err) => return visit(name, None, Some(err)),
    };
    let info = match file.stat() {
        Ok(info) => info,
        Err(err) => {
            let _ = file.close();
            return visit(name, None, Some(err));
        }
    };

    let listing = if info.is_dir() {
        file.read_dir(-1)
    } else {
        Ok(Vec::new())
    };
    file.close()?;

    let children = match listing {
        Ok(children) => children,
        Err(err) => return visit(name, Some(&info), Some(err)),
    };

    visit(name, Some(&info), None)?;

    for child in children {
        let child_path = path::join(name, child.name());
        let result = if child.is_dir() {
            walk_path(system, &child_path, visit)
        } else {
            visit(&child_path, Some(&child), None)
        };
        match result {
            Ok(()) | Err(AssetFsError::SkipDir) => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Read the whole content of `name`
pub fn read_file(system: &dyn FileSystem, name: &str) -> Result<Vec<u8>> {
    let mut file = system.open(name)?;
    let mut data = Vec::new();
    let result = file.read_to_end(&mut data);
    file.close()?;
    result?;
    Ok(data)
}
