//! Command-line tests for the `assetfs` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper: Source directory with a small site
fn source_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), b"<html>\"quoted\"\n</html>").unwrap();
    fs::create_dir(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css").join("site.css"), b"body{}").unwrap();
    dir
}

fn assetfs(src: &Path, dest: &Path) -> Command {
    let mut cmd = Command::cargo_bin("assetfs").unwrap();
    cmd.arg("--src").arg(src).arg("--dest").arg(dest);
    cmd
}

#[test]
fn test_generates_module() {
    let src = source_dir();
    let dest = tempfile::tempdir().unwrap();

    assetfs(src.path(), dest.path()).assert().success();

    let generated = fs::read_to_string(dest.path().join("assets.rs")).unwrap();
    assert!(generated.starts_with("// Code generated by assetfs. DO NOT EDIT."));
    assert!(generated.contains("pub static DATA: &[u8] = b\"PK\\x03\\x04"));
    assert!(generated.contains("::assetfs::register(DATA);"));
}

#[test]
fn test_custom_module_name() {
    let src = source_dir();
    let dest = tempfile::tempdir().unwrap();

    assetfs(src.path(), dest.path())
        .args(["-m", "web_assets"])
        .assert()
        .success();
    assert!(dest.path().join("web_assets.rs").exists());

    assetfs(src.path(), dest.path())
        .args(["-m", "not-valid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid module name"));
}

#[test]
fn test_refuses_overwrite_without_force() {
    let src = source_dir();
    let dest = tempfile::tempdir().unwrap();

    assetfs(src.path(), dest.path()).assert().success();
    assetfs(src.path(), dest.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assetfs(src.path(), dest.path())
        .arg("-f")
        .assert()
        .success();
}

#[test]
fn test_no_mtime_is_reproducible() {
    let src = source_dir();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    assetfs(src.path(), first.path())
        .arg("--no-mtime")
        .assert()
        .success();

    let touched = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
    fs::File::options()
        .write(true)
        .open(src.path().join("index.html"))
        .unwrap()
        .set_modified(touched)
        .unwrap();

    assetfs(src.path(), second.path())
        .arg("--no-mtime")
        .assert()
        .success();

    assert_eq!(
        fs::read(first.path().join("assets.rs")).unwrap(),
        fs::read(second.path().join("assets.rs")).unwrap()
    );
}

#[test]
fn test_include_filter_and_stored() {
    let src = source_dir();
    let dest = tempfile::tempdir().unwrap();

    assetfs(src.path(), dest.path())
        .args(["--include", "html", "-Z"])
        .assert()
        .success();

    let generated = fs::read_to_string(dest.path().join("assets.rs")).unwrap();
    // Stored entries keep their bytes readable in the escaped literal
    assert!(generated.contains("<html>\\\"quoted\\\"\\n</html>"));
    assert!(!generated.contains("site.css"));
}

#[test]
fn test_missing_source_fails() {
    let dest = tempfile::tempdir().unwrap();

    assetfs(&dest.path().join("nope"), dest.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to archive"));
}

#[test]
fn test_config_file() {
    let src = source_dir();
    let dest = tempfile::tempdir().unwrap();
    let config = dest.path().join("assetfs.toml");

    fs::write(&config, "compress = false\ninclude = [\"css\"]\n").unwrap();
    assetfs(src.path(), dest.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    let generated = fs::read_to_string(dest.path().join("assets.rs")).unwrap();
    assert!(generated.contains("css/site.css"));
    assert!(!generated.contains("index.html"));

    fs::write(&config, "compression = false\n").unwrap();
    assetfs(src.path(), dest.path())
        .arg("-f")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
