use crate::archive::format::{read_u16, read_u32, to_u32};
use crate::error::{AssetFsError, Result};
use std::io::{Read, Write};

/// End of central directory signature "PK\x05\x06"
pub const END_RECORD_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// Fixed part of the end record in bytes
pub const END_RECORD_SIZE: usize = 22;

/// Largest archive comment the 16-bit length field allows
const MAX_COMMENT_SIZE: usize = u16::MAX as usize;

/// End of Central Directory Record
///
/// Located at the end of the archive, optionally followed by a comment.
/// Readers find it by scanning backwards from the end, then use it to
/// locate the central directory without touching any entry payload.
///
/// Structure (22 bytes + comment):
/// - Signature: "PK\x05\x06" (4 bytes)
/// - Disk numbers: 2 x uint16
/// - Entry count on this disk, total entry count: 2 x uint16
/// - Central Directory Size: uint32
/// - Central Directory Offset: uint32
/// - Comment Length: uint16
#[derive(Debug, Clone)]
pub struct EndRecord {
    pub entry_count: u16,
    pub central_directory_size: u64,
    pub central_directory_offset: u64,
    pub comment: Vec<u8>,
}

impl EndRecord {
    pub fn new(entry_count: u16, central_directory_size: u64, central_directory_offset: u64) -> Self {
        Self {
            entry_count,
            central_directory_size,
            central_directory_offset,
            comment: Vec::new(),
        }
    }

    /// Write end record to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        if self.comment.len() > MAX_COMMENT_SIZE {
            return Err(AssetFsError::CorruptArchive(format!(
                "archive comment too long: {} bytes",
                self.comment.len()
            )));
        }

        writer.write_all(&END_RECORD_SIGNATURE)?;
        // Single-disk archive
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&self.entry_count.to_le_bytes())?;
        writer.write_all(&self.entry_count.to_le_bytes())?;
        writer.write_all(
            &to_u32(self.central_directory_size, "central directory size")?.to_le_bytes(),
        )?;
        writer.write_all(
            &to_u32(self.central_directory_offset, "central directory offset")?.to_le_bytes(),
        )?;
        writer.write_all(&(self.comment.len() as u16).to_le_bytes())?;
        writer.write_all(&self.comment)?;

        Ok(END_RECORD_SIZE + self.comment.len())
    }

    /// Read end record from a reader positioned at its signature
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig != END_RECORD_SIGNATURE {
            return Err(AssetFsError::CorruptArchive(
                "invalid end record signature".to_string(),
            ));
        }

        let disk = read_u16(&mut reader)?;
        let cd_disk = read_u16(&mut reader)?;
        let disk_entries = read_u16(&mut reader)?;
        let entry_count = read_u16(&mut reader)?;
        let central_directory_size = read_u32(&mut reader)?;
        let central_directory_offset = read_u32(&mut reader)?;
        let comment_len = read_u16(&mut reader)?;

        if disk != 0 || cd_disk != 0 || disk_entries != entry_count {
            return Err(AssetFsError::CorruptArchive(
                "multi-disk archives are not supported".to_string(),
            ));
        }
        if entry_count == u16::MAX
            || central_directory_size == u32::MAX
            || central_directory_offset == u32::MAX
        {
            return Err(AssetFsError::CorruptArchive(
                "zip64 archives are not supported".to_string(),
            ));
        }

        let mut comment = vec![0u8; comment_len as usize];
        reader.read_exact(&mut comment)?;

        Ok(Self {
            entry_count,
            central_directory_size: central_directory_size as u64,
            central_directory_offset: central_directory_offset as u64,
            comment,
        })
    }

    /// Scan backwards from the end of `data` for the end record.
    ///
    /// Returns the record and its offset. The last candidate whose comment
    /// length reaches exactly to the end of the data wins.
    pub fn locate(data: &[u8]) -> Result<(usize, Self)> {
        if data.len() < END_RECORD_SIZE {
            return Err(AssetFsError::CorruptArchive(format!(
                "archive too small: {} bytes",
                data.len()
            )));
        }

        let last = data.len() - END_RECORD_SIZE;
        let first = last.saturating_sub(MAX_COMMENT_SIZE);
        for offset in (first..=last).rev() {
            if data[offset..offset + 4] != END_RECORD_SIGNATURE {
                continue;
            }
            let comment_len =
                u16::from_le_bytes([data[offset + 20], data[offset + 21]]) as usize;
            if offset + END_RECORD_SIZE + comment_len != data.len() {
                continue;
            }
            let record = Self::read_from(&data[offset..])?;
            return Ok((offset, record));
        }

        Err(AssetFsError::CorruptArchive(
            "end of central directory record not found".to_string(),
        ))
    }

    /// Validate that the central directory lies inside the archive, before
    /// the end record.
    pub fn validate_bounds(&self, end_record_offset: usize) -> Result<()> {
        let cd_end = self
            .central_directory_offset
            .checked_add(self.central_directory_size)
            .ok_or_else(|| {
                AssetFsError::CorruptArchive("central directory bounds overflow".to_string())
            })?;

        if cd_end > end_record_offset as u64 {
            return Err(AssetFsError::CorruptArchive(format!(
                "central directory [{}, {}) overlaps end record at {}",
                self.central_directory_offset, cd_end, end_record_offset
            )));
        }
        Ok(())
    }
}
