//! Archives written by other ZIP tools
//!
//! `fixtures/infozip.zip` comes from `zip -r` (Info-ZIP 3.0) over a small
//! site: explicit `dir/` records, Unix modes, and local extra fields longer
//! than their central directory copies. `fixtures/streamed.zip` was written
//! by Python's `zipfile` to an unseekable stream, so every entry has a data
//! descriptor and zero sizes in its local header. `fixtures/legacy_names.zip`
//! has names in code page 437 without the UTF-8 flag.

use assetfs::{chdir, read_file, walk, AssetFs, File, FileSystem};
use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

const INFOZIP: &[u8] = include_bytes!("fixtures/infozip.zip");
const STREAMED: &[u8] = include_bytes!("fixtures/streamed.zip");
const LEGACY_NAMES: &[u8] = include_bytes!("fixtures/legacy_names.zip");

/// `touch -d @1600000000` on every fixture file before zipping
const INFOZIP_MTIME: u64 = 1_600_000_000;
/// DOS time 2020-01-02 03:04:06, read as UTC
const STREAMED_MTIME: u64 = 1_577_934_246;

fn names(fs: &AssetFs, dir: &str) -> Vec<String> {
    let mut handle = fs.open(dir).unwrap();
    handle
        .read_dir(-1)
        .unwrap()
        .iter()
        .map(|info| info.name().to_string())
        .collect()
}

#[test]
fn test_infozip_contents() {
    let fs = AssetFs::from_bytes(INFOZIP).unwrap();

    assert_eq!(read_file(&fs, "/index.html").unwrap(), b"<html>root</html>\n");
    assert_eq!(
        read_file(&fs, "/css/site.css").unwrap(),
        b"body { color: red; }\n"
    );
    assert_eq!(
        read_file(&fs, "/img/icons/dot.txt").unwrap(),
        "dot ".repeat(200).as_bytes()
    );
}

#[test]
fn test_infozip_metadata() {
    let fs = AssetFs::from_bytes(INFOZIP).unwrap();
    let mtime = UNIX_EPOCH + Duration::from_secs(INFOZIP_MTIME);

    let css = fs.open("/css/site.css").unwrap().stat().unwrap();
    assert_eq!(css.size(), 21);
    assert_eq!(css.permissions(), 0o640);
    assert_eq!(css.modified(), mtime);

    // Explicit directory records keep their own mode and time
    let icons = fs.open("/img/icons").unwrap().stat().unwrap();
    assert!(icons.is_dir());
    assert_eq!(icons.name(), "icons");
    assert_eq!(icons.permissions(), 0o755);
    assert_eq!(icons.modified(), mtime);

    // No record for the root, so it is synthesized
    let root = fs.open("/").unwrap().stat().unwrap();
    assert!(root.is_dir());
    assert_eq!(root.modified(), UNIX_EPOCH);
}

#[test]
fn test_infozip_listing_and_walk() {
    let fs = AssetFs::from_bytes(INFOZIP).unwrap();

    assert_eq!(names(&fs, "/"), vec!["css", "empty", "img", "index.html"]);
    assert_eq!(names(&fs, "/img"), vec!["icons"]);
    assert!(names(&fs, "/empty").is_empty());

    let mut visited = Vec::new();
    walk(&fs, "/", |path, info, err| {
        assert!(err.is_none());
        assert!(info.is_some());
        visited.push(path.to_string());
        Ok(())
    })
    .unwrap();
    assert_eq!(
        visited,
        vec![
            "/",
            "/css",
            "/css/site.css",
            "/empty",
            "/img",
            "/img/icons",
            "/img/icons/dot.txt",
            "/index.html",
        ]
    );
}

#[test]
fn test_infozip_chdir() {
    let fs: Arc<dyn FileSystem> = Arc::new(AssetFs::from_bytes(INFOZIP).unwrap());
    let img = chdir(fs, "/img").unwrap();

    let mut file = img.open("/icons/dot.txt").unwrap();
    file.seek(SeekFrom::Start(796)).unwrap();
    let mut tail = String::new();
    file.read_to_string(&mut tail).unwrap();
    assert_eq!(tail, "dot ");
}

#[test]
fn test_streamed_data_descriptors() {
    let fs = AssetFs::from_bytes(STREAMED).unwrap();

    assert_eq!(
        read_file(&fs, "/readme.txt").unwrap(),
        b"streamed without sizes\n"
    );
    assert_eq!(
        read_file(&fs, "/data/log.txt").unwrap(),
        "line\n".repeat(300).as_bytes()
    );
    assert_eq!(read_file(&fs, "/data/deep/note.md").unwrap(), b"# note\n");

    let log = fs.open("/data/log.txt").unwrap().stat().unwrap();
    assert_eq!(log.size(), 1500);
    assert_eq!(log.permissions(), 0o644);
    assert_eq!(
        log.modified(),
        UNIX_EPOCH + Duration::from_secs(STREAMED_MTIME)
    );

    assert_eq!(names(&fs, "/"), vec!["data", "readme.txt"]);
    assert_eq!(names(&fs, "/data"), vec!["deep", "log.txt"]);
    assert!(fs.open("/data/deep").unwrap().stat().unwrap().is_dir());
}

#[test]
fn test_legacy_name_encoding() {
    let fs = AssetFs::from_bytes(LEGACY_NAMES).unwrap();

    assert_eq!(read_file(&fs, "/café/menö.txt").unwrap(), b"menu");
    assert_eq!(read_file(&fs, "/résumé.txt").unwrap(), b"cv");
    // Flagged UTF-8 names are left alone
    assert_eq!(read_file(&fs, "/naïve.txt").unwrap(), b"utf8");

    assert_eq!(names(&fs, "/"), vec!["café", "naïve.txt", "résumé.txt"]);
}
