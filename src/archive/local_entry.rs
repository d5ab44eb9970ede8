use crate::archive::format::{
    check_path_length, dos_to_unix, extended_timestamp_field, parse_extended_timestamp, read_u16,
    read_u32, to_u32, unix_to_dos, VERSION_NEEDED,
};
use crate::error::{AssetFsError, Result};
use std::io::{Read, Write};

/// Local file header signature "PK\x03\x04"
pub const LOCAL_ENTRY_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Fixed part of a local file header in bytes
pub const LOCAL_ENTRY_SIZE: usize = 30;

/// Local File Header
///
/// Precedes each entry's payload. The central directory is authoritative
/// for sizes and metadata; readers only need the name and extra lengths
/// from here to find where the payload starts.
///
/// Structure (30 bytes + variable):
/// - Signature: "PK\x03\x04" (4 bytes)
/// - Version needed: uint16
/// - Flags: uint16
/// - Compression Method: uint16
/// - DOS time, DOS date: uint16 each
/// - CRC32: uint32
/// - Compressed Size: uint32
/// - Uncompressed Size: uint32
/// - Name Length: uint16
/// - Extra Length: uint16
/// - Name, Extra: variable
#[derive(Debug, Clone)]
pub struct LocalEntryHeader {
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub modified_time: i64,
    pub path: String,
    name_len: u16,
    extra_len: u16,
}

impl LocalEntryHeader {
    pub fn new(
        flags: u16,
        method: u16,
        crc32: u32,
        compressed_size: u64,
        uncompressed_size: u64,
        modified_time: i64,
        path: String,
    ) -> Self {
        let name_len = path.len().min(u16::MAX as usize) as u16;
        let extra_len = extended_timestamp_field(modified_time).len() as u16;
        Self {
            flags,
            method,
            crc32,
            compressed_size,
            uncompressed_size,
            modified_time,
            path,
            name_len,
            extra_len,
        }
    }

    /// Write local entry header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let path_bytes = self.path.as_bytes();
        check_path_length(path_bytes)?;

        let (dos_time, dos_date) = unix_to_dos(self.modified_time);
        let extra = extended_timestamp_field(self.modified_time);

        writer.write_all(&LOCAL_ENTRY_SIGNATURE)?;
        writer.write_all(&VERSION_NEEDED.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        writer.write_all(&self.method.to_le_bytes())?;
        writer.write_all(&dos_time.to_le_bytes())?;
        writer.write_all(&dos_date.to_le_bytes())?;
        writer.write_all(&self.crc32.to_le_bytes())?;
        writer.write_all(&to_u32(self.compressed_size, "compressed size")?.to_le_bytes())?;
        writer.write_all(&to_u32(self.uncompressed_size, "uncompressed size")?.to_le_bytes())?;
        writer.write_all(&(path_bytes.len() as u16).to_le_bytes())?;
        writer.write_all(&(extra.len() as u16).to_le_bytes())?;
        writer.write_all(path_bytes)?;
        writer.write_all(&extra)?;

        Ok(LOCAL_ENTRY_SIZE + path_bytes.len() + extra.len())
    }

    /// Read local entry header from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig != LOCAL_ENTRY_SIGNATURE {
            return Err(AssetFsError::CorruptArchive(
                "invalid local entry signature".to_string(),
            ));
        }

        let _version_needed = read_u16(&mut reader)?;
        let flags = read_u16(&mut reader)?;
        let method = read_u16(&mut reader)?;
        let dos_time = read_u16(&mut reader)?;
        let dos_date = read_u16(&mut reader)?;
        let crc32 = read_u32(&mut reader)?;
        let compressed_size = read_u32(&mut reader)?;
        let uncompressed_size = read_u32(&mut reader)?;
        let name_len = read_u16(&mut reader)?;
        let extra_len = read_u16(&mut reader)?;

        let mut path_buf = vec![0u8; name_len as usize];
        reader.read_exact(&mut path_buf)?;
        let path = String::from_utf8_lossy(&path_buf).into_owned();

        let mut extra = vec![0u8; extra_len as usize];
        reader.read_exact(&mut extra)?;

        let modified_time = parse_extended_timestamp(&extra)
            .unwrap_or_else(|| dos_to_unix(dos_time, dos_date));

        Ok(Self {
            flags,
            method,
            crc32,
            compressed_size: compressed_size as u64,
            uncompressed_size: uncompressed_size as u64,
            modified_time,
            path,
            name_len,
            extra_len,
        })
    }

    /// Calculate the total size of this header as stored
    pub fn header_size(&self) -> usize {
        LOCAL_ENTRY_SIZE + self.name_len as usize + self.extra_len as usize
    }
}
