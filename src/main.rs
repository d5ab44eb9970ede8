//! assetfs - embed a directory tree as generated Rust source

use anyhow::{bail, Context, Result};
use assetfs::{build_archive, codegen, BuildOptions};
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut options = match &cli.config {
        Some(path) => BuildOptions::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BuildOptions::default(),
    };
    if !cli.include.is_empty() {
        options.include = cli.include.clone();
    }
    if cli.no_mtime {
        options.fixed_mtime = Some(0);
    }
    if cli.no_compress {
        options.compress = false;
    }

    if !is_identifier(&cli.module) {
        bail!("invalid module name: {:?}", cli.module);
    }

    let data = build_archive(&cli.src, &options)
        .with_context(|| format!("failed to archive {}", cli.src.display()))?;

    fs::create_dir_all(&cli.dest)
        .with_context(|| format!("failed to create {}", cli.dest.display()))?;
    let target = cli.dest.join(format!("{}.rs", cli.module));
    if target.exists() && !cli.force {
        bail!(
            "{} already exists; pass --force to overwrite",
            target.display()
        );
    }

    // Write next to the target and rename so readers never see a partial file
    let mut temp = tempfile::NamedTempFile::new_in(&cli.dest)
        .with_context(|| format!("failed to create temp file in {}", cli.dest.display()))?;
    codegen::write_source(temp.as_file_mut(), &data)?;
    temp.persist(&target)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to write {}", target.display()))?;

    tracing::info!(
        archive_bytes = data.len(),
        output = %target.display(),
        "generated asset module"
    );
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
