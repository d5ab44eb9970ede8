use crate::archive::end_record::EndRecord;
use crate::archive::format::{CompressionMethod, EntryInfo};
use crate::archive::local_entry::LocalEntryHeader;
use crate::error::{AssetFsError, Result};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};

/// Normalize path to forward slashes (cross-platform compatibility)
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Reader over an archive held entirely in memory, with O(1) lookup
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    end_record: EndRecord,
    entries: Vec<EntryInfo>,
    index: HashMap<String, usize>,
}

impl<'a> ArchiveReader<'a> {
    /// Parse the end record and central directory of `data`.
    ///
    /// Entry payloads are not touched until [`read_entry`](Self::read_entry).
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let (end_offset, end_record) = EndRecord::locate(data)?;
        end_record.validate_bounds(end_offset)?;

        let start = end_record.central_directory_offset as usize;
        let end = start + end_record.central_directory_size as usize;
        let mut cursor = Cursor::new(&data[start..end]);

        let count = end_record.entry_count as usize;
        let mut entries = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);

        for _ in 0..count {
            let entry = EntryInfo::read_from(&mut cursor).map_err(truncated_directory)?;
            // Duplicate names: the later record wins
            index.insert(entry.path.clone(), entries.len());
            entries.push(entry);
        }

        Ok(Self {
            data,
            end_record,
            entries,
            index,
        })
    }

    /// Get the end of central directory record
    pub fn end_record(&self) -> &EndRecord {
        &self.end_record
    }

    /// Get number of entries in archive
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// All central directory entries in archive order
    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    /// Check if an entry exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(&normalize_path(path))
    }

    /// Get entry information without reading data
    pub fn get_entry(&self, path: &str) -> Option<&EntryInfo> {
        self.index
            .get(&normalize_path(path))
            .map(|&i| &self.entries[i])
    }

    /// Read and decompress a file by archive path
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .get_entry(path)
            .ok_or_else(|| AssetFsError::NotFound(path.to_string()))?;
        self.read_entry(entry)
    }

    /// Read and decompress one entry, verifying its size and CRC.
    ///
    /// Every failure is reported as [`AssetFsError::CorruptEntry`] naming
    /// the entry.
    pub fn read_entry(&self, entry: &EntryInfo) -> Result<Vec<u8>> {
        let raw = self
            .raw_payload(entry)
            .map_err(|e| AssetFsError::corrupt_entry(&entry.path, e))?;

        let method = entry
            .compression()
            .map_err(|e| AssetFsError::corrupt_entry(&entry.path, e))?;

        let data = match method {
            CompressionMethod::Stored => raw.to_vec(),
            CompressionMethod::Deflate => {
                let decoder = flate2::read::DeflateDecoder::new(raw);
                Self::read_bounded(decoder, entry)?
            }
            CompressionMethod::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(raw).map_err(|e| {
                    AssetFsError::corrupt_entry(&entry.path, format!("zstd: {}", e))
                })?;
                Self::read_bounded(decoder, entry)?
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(AssetFsError::corrupt_entry(
                &entry.path,
                format!(
                    "size mismatch: expected {} bytes, got {}",
                    entry.uncompressed_size,
                    data.len()
                ),
            ));
        }

        let computed_crc = crc32fast::hash(&data);
        if computed_crc != entry.crc32 {
            return Err(AssetFsError::corrupt_entry(
                &entry.path,
                AssetFsError::CrcMismatch {
                    expected: entry.crc32,
                    actual: computed_crc,
                },
            ));
        }

        Ok(data)
    }

    /// Locate the stored payload of an entry via its local header
    fn raw_payload(&self, entry: &EntryInfo) -> Result<&'a [u8]> {
        let header_start = entry.local_header_offset as usize;
        let tail = self.data.get(header_start..).ok_or_else(|| {
            AssetFsError::CorruptArchive(format!(
                "local header offset {} outside archive",
                header_start
            ))
        })?;
        let local = LocalEntryHeader::read_from(tail)?;

        let start = header_start + local.header_size();
        let end = start
            .checked_add(entry.compressed_size as usize)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                AssetFsError::CorruptArchive(format!(
                    "payload of {} bytes at {} runs past end of archive",
                    entry.compressed_size, start
                ))
            })?;

        Ok(&self.data[start..end])
    }

    /// Decompress at most one byte more than the recorded size, so a
    /// lying header cannot balloon memory.
    fn read_bounded<R: Read>(decoder: R, entry: &EntryInfo) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        decoder
            .take(entry.uncompressed_size + 1)
            .read_to_end(&mut data)
            .map_err(|e| AssetFsError::corrupt_entry(&entry.path, e))?;
        Ok(data)
    }
}

fn truncated_directory(err: AssetFsError) -> AssetFsError {
    match err {
        AssetFsError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            AssetFsError::CorruptArchive("central directory truncated".to_string())
        }
        AssetFsError::Io(e) => AssetFsError::CorruptArchive(e.to_string()),
        other => other,
    }
}
