mod end_record;
mod format;
mod local_entry;
mod reader;
mod writer;

pub use end_record::{EndRecord, END_RECORD_SIGNATURE, END_RECORD_SIZE};
pub use format::{
    dos_to_unix, system_time_to_unix, unix_to_dos, unix_to_system_time, CompressionMethod,
    EntryInfo, CD_ENTRY_SIZE, DEFAULT_FILE_MODE, DIRECTORY_MODE, MAX_PATH_LENGTH, S_IFDIR,
    S_IFMT, S_IFREG,
};
pub use local_entry::{LocalEntryHeader, LOCAL_ENTRY_SIGNATURE, LOCAL_ENTRY_SIZE};
pub use reader::ArchiveReader;
pub use writer::{ArchiveWriter, FileOptions};
