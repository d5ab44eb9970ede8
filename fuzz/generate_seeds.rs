//! Generate seed corpus for fuzzing

use assetfs::{ArchiveWriter, CompressionMethod, FileOptions};
use std::fs;

fn seed<F>(dir: &str, name: &str, build: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut ArchiveWriter<Vec<u8>>) -> assetfs::Result<()>,
{
    let mut writer = ArchiveWriter::new(Vec::new());
    build(&mut writer)?;
    let path = format!("{}/{}.zip", dir, name);
    fs::write(&path, writer.finish()?)?;
    println!("Generated: {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_archive_parse";
    fs::create_dir_all(corpus_dir)?;

    let fixed = FileOptions::default().modified(0);

    seed(corpus_dir, "seed_empty", |_| Ok(()))?;
    seed(corpus_dir, "seed_single_small", |w| {
        w.add_file("test.txt", b"Hello, World!", fixed.clone())
    })?;
    seed(corpus_dir, "seed_nested", |w| {
        w.add_file("a", b"a", fixed.clone())?;
        w.add_file("aa/bb/c", b"c", fixed.clone())?;
        w.add_directory("empty/", Some(0))
    })?;
    seed(corpus_dir, "seed_large_deflate", |w| {
        let data = b"This is test data for compression. ".repeat(1000);
        w.add_file("large.txt", &data, fixed.clone())
    })?;
    seed(corpus_dir, "seed_zstd", |w| {
        let data = b"zstd payload ".repeat(200);
        let options = fixed.clone().compression(CompressionMethod::Zstd);
        w.add_file("zstd.txt", &data, options)
    })?;
    seed(corpus_dir, "seed_binary_stored", |w| {
        let data: Vec<u8> = (0..=255).collect();
        let options = fixed.clone().compression(CompressionMethod::Stored);
        w.add_file("binary.bin", &data, options)
    })?;
    seed(corpus_dir, "seed_zero_length", |w| {
        w.add_file("empty.txt", b"", fixed.clone())
    })?;

    println!("\nGenerated 7 seed files in {}", corpus_dir);
    Ok(())
}
