mod common;

use std::io::{Cursor, Read};

use djx100_memtool::container::{
    ContainerError, ContainerReader, ContainerWriter, Header, SectionDescriptor, SectionKind,
    CURRENT_VERSION, DEFAULT_COMMENT, SECTION_COUNT,
};

use common::build_legacy_container;

fn channel_sections(start: u32, size: u32) -> [Option<SectionDescriptor>; SECTION_COUNT] {
    let mut sections = [None; SECTION_COUNT];
    sections[0] = Some(SectionDescriptor {
        start,
        size,
        kind: SectionKind::ChannelMemory,
    });
    sections
}

fn write_container(pages: &[[u8; 256]]) -> Vec<u8> {
    let sections = channel_sections(0x20000, (pages.len() * 256) as u32);
    let mut writer =
        ContainerWriter::create(Cursor::new(Vec::new()), DEFAULT_COMMENT, sections).unwrap();
    for page in pages {
        writer.append(page).unwrap();
    }
    let (cursor, _) = writer.finalize().unwrap();
    cursor.into_inner()
}

#[test]
fn test_roundtrip_preserves_payload() {
    let mut first = [0u8; 256];
    for (i, byte) in first.iter_mut().enumerate() {
        *byte = i as u8;
    }
    let bytes = write_container(&[first, [0x5A; 256]]);
    assert_eq!(bytes.len(), 256 + 512);

    let mut reader = ContainerReader::open(Cursor::new(bytes), true).unwrap();
    let header = reader.header().clone();
    assert_eq!(header.version, CURRENT_VERSION);
    assert_eq!(header.data_size, 512);
    assert_eq!(header.comment, DEFAULT_COMMENT);

    let section = header.channel_memory_section().unwrap();
    assert_eq!(section.start, 0x20000);
    assert_eq!(section.size, 512);

    let payload = reader.read_payload().unwrap();
    assert_eq!(&payload[..256], &first);
    assert_eq!(&payload[256..], &[0x5A; 256]);
}

#[test]
fn test_data_size_matches_file_length_minus_header() {
    let bytes = write_container(&[[0u8; 256]]);
    let header = Header::decode(bytes[..256].try_into().unwrap()).unwrap();
    assert_eq!(u64::from(header.data_size), (bytes.len() - 256) as u64);
}

#[test]
fn test_checksum_covers_section_table_then_payload() {
    let bytes = write_container(&[[0xC3; 256]]);
    let header = Header::decode(bytes[..256].try_into().unwrap()).unwrap();

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bytes[0x50..0xD0]);
    hasher.update(&bytes[256..]);
    assert_eq!(header.checksum, hasher.finalize());
}

#[test]
fn test_flipped_payload_byte_fails_checksum() {
    let mut bytes = write_container(&[[0x11; 256]]);
    bytes[256 + 37] ^= 0x01;

    match ContainerReader::open(Cursor::new(bytes), true) {
        Err(ContainerError::ChecksumMismatch { stored, computed }) => {
            assert_ne!(stored, computed);
        }
        other => panic!("expected ChecksumMismatch, got {:?}", other.err()),
    }
}

#[test]
fn test_flipped_section_table_byte_fails_checksum() {
    let mut bytes = write_container(&[[0x11; 256]]);
    bytes[0x60] ^= 0xFF;

    assert!(matches!(
        ContainerReader::open(Cursor::new(bytes), true),
        Err(ContainerError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_skipping_checksum_accepts_corrupt_payload() {
    let mut bytes = write_container(&[[0x11; 256]]);
    bytes[256] = 0xEE;

    let mut reader = ContainerReader::open(Cursor::new(bytes), false).unwrap();
    let payload = reader.read_payload().unwrap();
    assert_eq!(payload[0], 0xEE);
    assert_eq!(payload[1], 0x11);
}

#[test]
fn test_version1_is_exempt_from_checksum() {
    // Version 1 predates the checksum; whatever sits at 0xFC is noise.
    let payload = vec![0xAB; 512];
    let bytes = build_legacy_container(1, &payload, Some(0xBAD0BAD0));

    let mut reader = ContainerReader::open(Cursor::new(bytes), true).unwrap();
    assert_eq!(reader.header().version, 1);
    assert!(reader.header().sections.iter().all(|s| s.is_none()));
    assert_eq!(reader.read_payload().unwrap(), payload);
}

#[test]
fn test_version2_checksum_is_validated() {
    let payload = vec![0x3C; 512];
    let good = build_legacy_container(2, &payload, Some(crc32fast::hash(&payload)));
    let reader = ContainerReader::open(Cursor::new(good), true).unwrap();
    assert_eq!(reader.header().version, 2);

    let bad = build_legacy_container(2, &payload, Some(0x12345678));
    assert!(matches!(
        ContainerReader::open(Cursor::new(bad), true),
        Err(ContainerError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_wrong_magic_is_rejected() {
    let payload = vec![0u8; 256];
    let mut bytes = build_legacy_container(2, &payload, Some(crc32fast::hash(&payload)));
    bytes[0] = b'Y';

    match ContainerReader::open(Cursor::new(bytes), true) {
        Err(ContainerError::BadMagic(magic)) => assert_eq!(&magic, b"Y100"),
        other => panic!("expected BadMagic, got {:?}", other.err()),
    }
}

#[test]
fn test_unknown_version_is_rejected() {
    let payload = vec![0u8; 256];
    let bytes = build_legacy_container(9, &payload, None);

    assert!(matches!(
        ContainerReader::open(Cursor::new(bytes), true),
        Err(ContainerError::UnsupportedVersion(9))
    ));
}

#[test]
fn test_truncated_file_is_rejected() {
    let bytes = vec![0x58; 100];
    assert!(matches!(
        ContainerReader::open(Cursor::new(bytes), true),
        Err(ContainerError::TruncatedHeader)
    ));
}

#[test]
fn test_size_mismatch_is_rejected() {
    // Header records 512 bytes but only 256 follow.
    let mut bytes = build_legacy_container(1, &vec![0u8; 256], None);
    bytes[5..9].copy_from_slice(&512u32.to_le_bytes());

    assert!(matches!(
        ContainerReader::open(Cursor::new(bytes), true),
        Err(ContainerError::SizeMismatch {
            header: 512,
            actual: 256
        })
    ));
}

#[test]
fn test_unfinalized_file_is_rejected() {
    // An interrupted backup never patches the size field, so the header
    // still reads zero and the file must not pass validation.
    let header = Header::new(DEFAULT_COMMENT, channel_sections(0x20000, 256));
    let mut bytes = header.encode().unwrap().to_vec();
    bytes.extend_from_slice(&[0x77; 256]);

    assert!(ContainerReader::open(Cursor::new(bytes), true).is_err());
}

#[test]
fn test_reader_streams_payload_bounded() {
    let bytes = write_container(&[[0x42; 256], [0x43; 256]]);
    let mut reader = ContainerReader::open(Cursor::new(bytes), true).unwrap();
    assert_eq!(reader.remaining(), 512);

    let mut chunk = [0u8; 100];
    let mut total = 0;
    loop {
        let n = reader.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        total += n;
    }
    assert_eq!(total, 512);
    assert_eq!(reader.remaining(), 0);
}
