use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TorrentParserError {
    #[error("Unexpected End: input ended before the value was complete")]
    UnexpectedEnd,

    #[error("Invalid Structure: {0}")]
    InvalidStructure(String),

    #[error("Unknown Specifier: {0:#04x}")]
    UnknownSpecifier(u8),

    #[error("Invalid Integer: {0}")]
    InvalidInteger(String),

    #[error("Integer Overflow: value does not fit in 64 bits")]
    IntegerOverflow,

    #[error("Truncated String: expected {expected} bytes, found {found}")]
    TruncatedString { expected: usize, found: usize },

    #[error("Missing Required Field: {0}")]
    MissingRequiredField(String),

    #[error("Invalid Field Type: expected {expected}, found {found}")]
    FieldTypeError { expected: String, found: String },

    #[error("Invalid Field: {0}")]
    InvalidField(String),

    #[error("Ambiguous Mode: info is neither single-file nor multi-file ({0})")]
    AmbiguousMode(String),

    #[error("Invalid Peer Blob: length {0} is not a multiple of 6")]
    InvalidPeerBlob(usize),

    #[error("Duplicate Key: {0}")]
    DuplicateKey(String),

    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}
