//! Corruption detection: damaged archives must fail construction cleanly

use assetfs::{ArchiveWriter, AssetFs, AssetFsError, CompressionMethod, FileOptions};

/// Helper: Create a valid archive with stored entries so payloads are
/// findable in the raw bytes
fn create_test_archive() -> Vec<u8> {
    let mut writer = ArchiveWriter::new(Vec::new());
    let options = FileOptions::default()
        .compression(CompressionMethod::Stored)
        .modified(946_684_800);
    writer.add_file("test.txt", b"Hello, World!", options.clone()).unwrap();
    writer.add_file("data.bin", &[0xAB; 1024], options).unwrap();
    writer.finish().unwrap()
}

fn find(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
        .unwrap()
}

#[test]
fn test_valid_archive_opens() {
    let fs = AssetFs::from_bytes(&create_test_archive()).unwrap();
    assert!(fs.contains("/test.txt"));
    assert!(fs.contains("/data.bin"));
}

#[test]
fn test_empty_and_garbage_input() {
    for data in [&b""[..], &b"PK"[..], &[0u8; 4096][..]] {
        assert!(matches!(
            AssetFs::from_bytes(data),
            Err(AssetFsError::CorruptArchive(_))
        ));
    }
}

#[test]
fn test_truncated_archive() {
    let data = create_test_archive();
    for len in [data.len() - 1, data.len() / 2, 30] {
        assert!(
            matches!(
                AssetFs::from_bytes(&data[..len]),
                Err(AssetFsError::CorruptArchive(_))
            ),
            "truncation to {} bytes not detected",
            len
        );
    }
}

#[test]
fn test_payload_corruption_names_entry() {
    let mut data = create_test_archive();
    let offset = find(&data, b"Hello, World!");
    data[offset] ^= 0xFF;

    match AssetFs::from_bytes(&data) {
        Err(AssetFsError::CorruptEntry { path, reason }) => {
            assert_eq!(path, "test.txt");
            assert!(reason.contains("CRC"), "unexpected reason: {}", reason);
        }
        other => panic!("expected CorruptEntry, got {:?}", other),
    }
}

#[test]
fn test_unsupported_compression_method() {
    let mut data = create_test_archive();
    // Method field of the first central directory record
    let offset = find(&data, b"PK\x01\x02") + 10;
    data[offset..offset + 2].copy_from_slice(&99u16.to_le_bytes());

    assert!(matches!(
        AssetFs::from_bytes(&data),
        Err(AssetFsError::CorruptEntry { .. })
    ));
}

#[test]
fn test_bad_local_header_offset() {
    let mut data = create_test_archive();
    // Local header offset field of the first central directory record
    let offset = find(&data, b"PK\x01\x02") + 42;
    data[offset..offset + 4].copy_from_slice(&0x00FF_FFFFu32.to_le_bytes());

    assert!(matches!(
        AssetFs::from_bytes(&data),
        Err(AssetFsError::CorruptEntry { .. })
    ));
}

#[test]
fn test_lying_uncompressed_size() {
    let mut writer = ArchiveWriter::new(Vec::new());
    writer
        .add_file(
            "big.txt",
            &b"zzzzzzzz".repeat(4096),
            FileOptions::default().modified(0),
        )
        .unwrap();
    let mut data = writer.finish().unwrap();

    // Uncompressed size field of the central directory record
    let offset = find(&data, b"PK\x01\x02") + 24;
    data[offset..offset + 4].copy_from_slice(&16u32.to_le_bytes());

    match AssetFs::from_bytes(&data) {
        Err(AssetFsError::CorruptEntry { path, .. }) => assert_eq!(path, "big.txt"),
        other => panic!("expected CorruptEntry, got {:?}", other),
    }
}
