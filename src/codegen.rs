//! Rust source generation for embedding an archive in a binary.
//!
//! The generated module exposes the archive as a byte-string static and a
//! `register()` function handing it to [`crate::register`].

use crate::error::Result;
use std::io::{BufWriter, Write};

const HEADER: &str = "// Code generated by assetfs. DO NOT EDIT.\n";

/// Write a complete Rust module embedding `data`
pub fn write_source<W: Write>(writer: W, data: &[u8]) -> Result<()> {
    let mut out = BufWriter::new(writer);

    out.write_all(HEADER.as_bytes())?;
    writeln!(out)?;
    writeln!(out, "/// ZIP archive with the embedded assets")?;
    write!(out, "pub static DATA: &[u8] = b\"")?;
    write_escaped(&mut out, data)?;
    writeln!(out, "\";")?;
    writeln!(out)?;
    writeln!(
        out,
        "/// Register the embedded assets; call once at start-up, before `assetfs::AssetFs::new`"
    )?;
    writeln!(out, "pub fn register() {{")?;
    writeln!(out, "    ::assetfs::register(DATA);")?;
    writeln!(out, "}}")?;

    out.flush()?;
    tracing::debug!(bytes = data.len(), "source emitted");
    Ok(())
}

/// Escape `data` as the body of a Rust byte-string literal.
///
/// Printable ASCII is written as-is except `"` and `\`; newlines become
/// `\n` and every other byte becomes `\xNN`.
pub fn write_escaped<W: Write>(out: &mut W, data: &[u8]) -> std::io::Result<()> {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    for &byte in data {
        match byte {
            b'\n' => out.write_all(b"\\n")?,
            b'\\' => out.write_all(b"\\\\")?,
            b'"' => out.write_all(b"\\\"")?,
            0x20..=0x7e => out.write_all(&[byte])?,
            _ => out.write_all(&[
                b'\\',
                b'x',
                HEX[(byte >> 4) as usize],
                HEX[(byte & 0x0f) as usize],
            ])?,
        }
    }
    Ok(())
}
