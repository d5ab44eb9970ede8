use crate::error::{AssetFsError, Result};
use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use std::io::{Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Central directory file header signature "PK\x01\x02"
pub const CENTRAL_DIRECTORY_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];

/// Fixed part of a central directory header in bytes
pub const CD_ENTRY_SIZE: usize = 46;

/// Version needed to extract: 2.0 (deflate, directories)
pub const VERSION_NEEDED: u16 = 20;

/// Version made by: host 3 (Unix), ZIP 2.0. The Unix host tells readers
/// that the upper half of the external attributes holds a mode.
pub const VERSION_MADE_BY: u16 = (3 << 8) | 20;

/// General purpose flag: file name is UTF-8
pub const FLAG_UTF8: u16 = 1 << 11;

/// Header id of the extended timestamp extra field ("UT")
pub const EXTENDED_TIMESTAMP_ID: u16 = 0x5455;

/// Names longer than this cannot be stored in a 16-bit length field
pub const MAX_PATH_LENGTH: usize = u16::MAX as usize;

/// Unix file type bits
pub const S_IFMT: u32 = 0o170000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFREG: u32 = 0o100000;

/// Mode of a regular file with no recorded permissions
pub const DEFAULT_FILE_MODE: u32 = S_IFREG | 0o644;

/// Mode of every synthesized directory: directory, rwxr-xr-x
pub const DIRECTORY_MODE: u32 = S_IFDIR | 0o755;

const HOST_UNIX: u16 = 3;
const MSDOS_DIRECTORY: u32 = 0x10;
const MSDOS_READONLY: u32 = 0x01;

/// Compression methods supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CompressionMethod {
    Stored = 0,
    Deflate = 8,
    Zstd = 93,
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::Stored),
            8 => Ok(Self::Deflate),
            93 => Ok(Self::Zstd),
            _ => Err(AssetFsError::UnsupportedCompression(value)),
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Central Directory entry metadata
///
/// Sizes and offsets are widened to `u64` in memory even though the
/// container stores them in 32 bits.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub path: String,
    pub version_made_by: u16,
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Seconds since the unix epoch
    pub modified_time: i64,
    /// Unix mode including the file type bits
    pub mode: u32,
    pub local_header_offset: u64,
}

impl EntryInfo {
    /// Whether the record names a directory ("dir/") rather than a file
    pub fn is_dir(&self) -> bool {
        self.path.ends_with('/')
    }

    /// Resolve the stored method number
    pub fn compression(&self) -> Result<CompressionMethod> {
        CompressionMethod::from_u16(self.method)
    }

    /// Write entry to central directory
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let path_bytes = self.path.as_bytes();
        check_path_length(path_bytes)?;

        let (dos_time, dos_date) = unix_to_dos(self.modified_time);
        let extra = extended_timestamp_field(self.modified_time);
        let mut external_attributes = self.mode << 16;
        if self.mode & S_IFMT == S_IFDIR {
            external_attributes |= MSDOS_DIRECTORY;
        }

        writer.write_all(&CENTRAL_DIRECTORY_SIGNATURE)?;
        writer.write_all(&self.version_made_by.to_le_bytes())?;
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
        // Comment length, disk number start, internal attributes
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&external_attributes.to_le_bytes())?;
        writer.write_all(&to_u32(self.local_header_offset, "local header offset")?.to_le_bytes())?;
        writer.write_all(path_bytes)?;
        writer.write_all(&extra)?;

        Ok(CD_ENTRY_SIZE + path_bytes.len() + extra.len())
    }

    /// Read entry from central directory
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut sig = [0u8; 4];
        reader.read_exact(&mut sig)?;
        if sig != CENTRAL_DIRECTORY_SIGNATURE {
            return Err(AssetFsError::CorruptArchive(
                "invalid central directory entry signature".to_string(),
            ));
        }

        let version_made_by = read_u16(&mut reader)?;
        let _version_needed = read_u16(&mut reader)?;
        let flags = read_u16(&mut reader)?;
        let method = read_u16(&mut reader)?;
        let dos_time = read_u16(&mut reader)?;
        let dos_date = read_u16(&mut reader)?;
        let crc32 = read_u32(&mut reader)?;
        let compressed_size = read_u32(&mut reader)?;
        let uncompressed_size = read_u32(&mut reader)?;
        let path_len = read_u16(&mut reader)?;
        let extra_len = read_u16(&mut reader)?;
        let comment_len = read_u16(&mut reader)?;
        let _disk_start = read_u16(&mut reader)?;
        let _internal_attributes = read_u16(&mut reader)?;
        let external_attributes = read_u32(&mut reader)?;
        let local_header_offset = read_u32(&mut reader)?;

        if compressed_size == u32::MAX
            || uncompressed_size == u32::MAX
            || local_header_offset == u32::MAX
        {
            return Err(AssetFsError::CorruptArchive(
                "zip64 entries are not supported".to_string(),
            ));
        }

        let mut path_buf = vec![0u8; path_len as usize];
        reader.read_exact(&mut path_buf)?;
        let path = decode_name(path_buf, flags)?;

        let mut extra = vec![0u8; extra_len as usize];
        reader.read_exact(&mut extra)?;

        let mut comment = vec![0u8; comment_len as usize];
        reader.read_exact(&mut comment)?;

        let modified_time = parse_extended_timestamp(&extra)
            .unwrap_or_else(|| dos_to_unix(dos_time, dos_date));
        let mode = decode_mode(version_made_by, external_attributes, path.ends_with('/'));

        Ok(Self {
            path,
            version_made_by,
            flags,
            method,
            crc32,
            compressed_size: compressed_size as u64,
            uncompressed_size: uncompressed_size as u64,
            modified_time,
            mode,
            local_header_offset: local_header_offset as u64,
        })
    }
}

/// Recover a unix mode from the external attributes field
fn decode_mode(version_made_by: u16, external_attributes: u32, named_dir: bool) -> u32 {
    if version_made_by >> 8 == HOST_UNIX {
        let mode = external_attributes >> 16;
        if mode != 0 {
            if mode & S_IFMT == 0 {
                let kind = if named_dir { S_IFDIR } else { S_IFREG };
                return kind | mode;
            }
            return mode;
        }
    }

    if named_dir || external_attributes & MSDOS_DIRECTORY != 0 {
        S_IFDIR | 0o777
    } else if external_attributes & MSDOS_READONLY != 0 {
        S_IFREG | 0o444
    } else {
        S_IFREG | 0o666
    }
}

/// Upper half of code page 437, the legacy ZIP name encoding
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Decode an entry name. Flagged names must be UTF-8; unflagged names
/// that are not valid UTF-8 are read as CP437.
fn decode_name(raw: Vec<u8>, flags: u16) -> Result<String> {
    match String::from_utf8(raw) {
        Ok(name) => Ok(name),
        Err(e) if flags & FLAG_UTF8 != 0 => Err(AssetFsError::CorruptArchive(format!(
            "invalid UTF-8 in entry name: {}",
            e.utf8_error()
        ))),
        Err(e) => Ok(decode_cp437(e.as_bytes())),
    }
}

fn decode_cp437(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| match b {
            0x00..=0x7f => b as char,
            _ => CP437_HIGH[(b - 0x80) as usize],
        })
        .collect()
}

pub(crate) fn check_path_length(path_bytes: &[u8]) -> Result<()> {
    if path_bytes.len() > MAX_PATH_LENGTH {
        return Err(AssetFsError::InvalidPath(format!(
            "Path too long: {} bytes (max {})",
            path_bytes.len(),
            MAX_PATH_LENGTH
        )));
    }
    Ok(())
}

pub(crate) fn to_u32(value: u64, what: &str) -> Result<u32> {
    // u32::MAX is reserved as the zip64 marker
    if value >= u32::MAX as u64 {
        return Err(AssetFsError::CorruptArchive(format!(
            "{} {} exceeds the 32-bit container limit",
            what, value
        )));
    }
    Ok(value as u32)
}

/// Build the extended timestamp extra field carrying only the mtime.
/// Times outside the signed 32-bit range fall back to the DOS fields.
pub(crate) fn extended_timestamp_field(modified_time: i64) -> Vec<u8> {
    let Ok(mtime) = i32::try_from(modified_time) else {
        return Vec::new();
    };
    let mut extra = Vec::with_capacity(9);
    extra.extend_from_slice(&EXTENDED_TIMESTAMP_ID.to_le_bytes());
    extra.extend_from_slice(&5u16.to_le_bytes());
    extra.push(0x01);
    extra.extend_from_slice(&mtime.to_le_bytes());
    extra
}

/// Find the mtime inside an extended timestamp extra field, if any
pub(crate) fn parse_extended_timestamp(mut extra: &[u8]) -> Option<i64> {
    while extra.len() >= 4 {
        let id = u16::from_le_bytes([extra[0], extra[1]]);
        let size = u16::from_le_bytes([extra[2], extra[3]]) as usize;
        let body = extra.get(4..4 + size)?;
        if id == EXTENDED_TIMESTAMP_ID && body.len() >= 5 && body[0] & 0x01 != 0 {
            let mtime = i32::from_le_bytes([body[1], body[2], body[3], body[4]]);
            return Some(mtime as i64);
        }
        extra = &extra[4 + size..];
    }
    None
}

/// Convert unix seconds to MS-DOS (time, date), clamped to 1980..=2107
pub fn unix_to_dos(secs: i64) -> (u16, u16) {
    let Some(dt) = DateTime::from_timestamp(secs, 0) else {
        return (0, 0x21);
    };
    let year = dt.year();
    if year < 1980 {
        return (0, 0x21);
    }
    if year > 2107 {
        return ((23 << 11) | (59 << 5) | 29, (127 << 9) | (12 << 5) | 31);
    }

    let time = ((dt.hour() as u16) << 11) | ((dt.minute() as u16) << 5) | (dt.second() as u16 / 2);
    let date = (((year - 1980) as u16) << 9) | ((dt.month() as u16) << 5) | dt.day() as u16;
    (time, date)
}

/// Convert MS-DOS (time, date) to unix seconds, read as UTC
pub fn dos_to_unix(time: u16, date: u16) -> i64 {
    let year = 1980 + (date >> 9) as i32;
    let month = ((date >> 5) & 0x0F) as u32;
    let day = (date & 0x1F) as u32;
    let hour = (time >> 11) as u32;
    let minute = ((time >> 5) & 0x3F) as u32;
    let second = ((time & 0x1F) * 2) as u32;

    NaiveDate::from_ymd_opt(year, month.max(1), day.max(1))
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(315_532_800) // 1980-01-01T00:00:00Z
}

/// Unix seconds to `SystemTime`
pub fn unix_to_system_time(secs: i64) -> SystemTime {
    if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
    }
}

/// `SystemTime` to unix seconds, truncating sub-second precision
pub fn system_time_to_unix(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

// Helper functions for reading primitive types
pub(crate) fn read_u16<R: Read>(mut reader: R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(mut reader: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
