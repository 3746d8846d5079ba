pub mod header;
pub mod reader;
pub mod writer;

pub use header::{
    Header, SectionDescriptor, SectionKind, COMMENT_LEN, CURRENT_VERSION, DEFAULT_COMMENT,
    HEADER_LEN, SECTION_COUNT,
};
pub use reader::ContainerReader;
pub use writer::ContainerWriter;

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Invalid magic number: {}", hex::encode(.0))]
    BadMagic([u8; 4]),

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Checksum mismatch: stored {stored:08X}, computed {computed:08X}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("Data size mismatch: header says {header} bytes, file holds {actual}")]
    SizeMismatch { header: u64, actual: u64 },

    #[error("Payload of {0} bytes overflows the size field")]
    PayloadTooLarge(u64),

    #[error("Comment does not fit the 64-byte header field")]
    CommentTooLong,

    #[error("File too short to hold a container header")]
    TruncatedHeader,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ContainerError>;
