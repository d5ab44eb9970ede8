use crate::archive::end_record::EndRecord;
use crate::archive::format::{
    system_time_to_unix, CompressionMethod, EntryInfo, DEFAULT_FILE_MODE, DIRECTORY_MODE,
    FLAG_UTF8, S_IFMT, S_IFREG, VERSION_MADE_BY,
};
use crate::archive::local_entry::LocalEntryHeader;
use crate::error::{AssetFsError, Result};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::Write;
use std::time::SystemTime;

/// Deflate level used for archive entries
const DEFLATE_LEVEL: u32 = 6;

/// Zstd level used for archive entries
const ZSTD_LEVEL: i32 = 6;

/// Normalize path to forward slashes (cross-platform compatibility)
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Per-entry options for [`ArchiveWriter::add_file`]
#[derive(Debug, Clone)]
pub struct FileOptions {
    compression: CompressionMethod,
    mode: u32,
    modified: Option<i64>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflate,
            mode: DEFAULT_FILE_MODE,
            modified: None,
        }
    }
}

impl FileOptions {
    /// Preferred compression; falls back to stored when it does not help
    pub fn compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Unix permission bits (file type bits are filled in)
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Modification time in unix seconds. Defaults to the current time.
    pub fn modified(mut self, secs: i64) -> Self {
        self.modified = Some(secs);
        self
    }
}

/// Streaming ZIP writer.
///
/// Entries are written as they are added; the central directory and end
/// record are appended by [`finish`](Self::finish). Output is a pure
/// function of the inputs once every entry carries an explicit mtime.
pub struct ArchiveWriter<W: Write> {
    writer: W,
    entries: Vec<EntryInfo>,
    current_offset: u64,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries: Vec::new(),
            current_offset: 0,
        }
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Add a regular file
    pub fn add_file(&mut self, path: &str, data: &[u8], options: FileOptions) -> Result<()> {
        let path = Self::entry_name(path)?;
        if path.ends_with('/') {
            return Err(AssetFsError::InvalidPath(format!(
                "file name must not end with '/': {}",
                path
            )));
        }

        let (payload, method) = Self::compress_data(data, options.compression)?;
        let mode = match options.mode & S_IFMT {
            0 => S_IFREG | options.mode,
            _ => options.mode,
        };

        self.write_entry(
            path,
            &payload,
            method,
            crc32fast::hash(data),
            data.len() as u64,
            mode,
            options.modified,
        )
    }

    /// Add an explicit directory record ("name/")
    pub fn add_directory(&mut self, path: &str, modified: Option<i64>) -> Result<()> {
        let mut path = Self::entry_name(path)?;
        if !path.ends_with('/') {
            path.push('/');
        }
        self.write_entry(path, &[], CompressionMethod::Stored, 0, 0, DIRECTORY_MODE, modified)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_entry(
        &mut self,
        path: String,
        payload: &[u8],
        method: CompressionMethod,
        crc32: u32,
        uncompressed_size: u64,
        mode: u32,
        modified: Option<i64>,
    ) -> Result<()> {
        let modified_time = modified.unwrap_or_else(|| system_time_to_unix(SystemTime::now()));
        let flags = if path.is_ascii() { 0 } else { FLAG_UTF8 };

        if self.entries.len() >= u16::MAX as usize - 1 {
            return Err(AssetFsError::CorruptArchive(
                "too many entries for a non-zip64 archive".to_string(),
            ));
        }

        let entry_start_offset = self.current_offset;
        let local_header = LocalEntryHeader::new(
            flags,
            method.as_u16(),
            crc32,
            payload.len() as u64,
            uncompressed_size,
            modified_time,
            path.clone(),
        );

        let header_bytes_written = local_header.write_to(&mut self.writer)?;
        self.current_offset += header_bytes_written as u64;

        self.writer.write_all(payload)?;
        self.current_offset += payload.len() as u64;

        self.entries.push(EntryInfo {
            path,
            version_made_by: VERSION_MADE_BY,
            flags,
            method: method.as_u16(),
            crc32,
            compressed_size: payload.len() as u64,
            uncompressed_size,
            modified_time,
            mode,
            local_header_offset: entry_start_offset,
        });

        Ok(())
    }

    /// Write the central directory and end record, returning the sink
    pub fn finish(mut self) -> Result<W> {
        let cd_offset = self.current_offset;

        let mut cd_size = 0u64;
        for entry in &self.entries {
            cd_size += entry.write_to(&mut self.writer)? as u64;
        }

        let end_record = EndRecord::new(self.entries.len() as u16, cd_size, cd_offset);
        end_record.write_to(&mut self.writer)?;
        self.writer.flush()?;

        tracing::debug!(
            entries = self.entries.len(),
            bytes = cd_offset + cd_size,
            "archive finished"
        );
        Ok(self.writer)
    }

    /// Validate and normalize an entry name
    fn entry_name(path: &str) -> Result<String> {
        let normalized = normalize_path(path);
        let trimmed = normalized.trim_start_matches('/');

        if trimmed.is_empty() {
            return Err(AssetFsError::InvalidPath(format!("empty entry name: {:?}", path)));
        }
        if trimmed.split('/').any(|c| c == "..") {
            return Err(AssetFsError::InvalidPath(format!(
                "entry name escapes the archive root: {}",
                path
            )));
        }
        // A trailing '/' marks a directory; any other empty part is a "//"
        if trimmed
            .trim_end_matches('/')
            .split('/')
            .any(|c| c.is_empty() || c == ".")
        {
            return Err(AssetFsError::InvalidPath(format!(
                "entry name has empty or '.' components: {}",
                path
            )));
        }
        if trimmed.contains('\0') {
            return Err(AssetFsError::InvalidPath(format!(
                "entry name contains NUL: {:?}",
                path
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Compress data with fallback to stored if not beneficial
    fn compress_data(
        data: &[u8],
        compression: CompressionMethod,
    ) -> Result<(Vec<u8>, CompressionMethod)> {
        let compressed = match compression {
            CompressionMethod::Stored => return Ok((data.to_vec(), CompressionMethod::Stored)),
            CompressionMethod::Deflate => Self::compress_deflate(data)?,
            CompressionMethod::Zstd => Self::compress_zstd(data)?,
        };

        if compressed.len() < data.len() {
            Ok((compressed, compression))
        } else {
            Ok((data.to_vec(), CompressionMethod::Stored))
        }
    }

    fn compress_deflate(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(DEFLATE_LEVEL));
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn compress_zstd(data: &[u8]) -> Result<Vec<u8>> {
        zstd::encode_all(data, ZSTD_LEVEL).map_err(|e| {
            AssetFsError::Io(std::io::Error::new(
                e.kind(),
                format!("zstd compression failed: {}", e),
            ))
        })
    }
}
