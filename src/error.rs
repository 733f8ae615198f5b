//! Error types for the PDF syntax layer

use std::io;
use thiserror::Error;

/// Main error type for lexing and parsing operations
///
/// Lexical and grammar variants carry the absolute byte offset at which the
/// problem was detected, so callers can point at the offending input.
#[derive(Error, Debug)]
pub enum PDFSyntaxError {
    /// The underlying source failed to deliver bytes
    #[error("malformed PDF: reading at offset {offset}: {source}")]
    Read {
        offset: i64,
        #[source]
        source: io::Error,
    },

    /// Input ended where EOF is not tolerated
    #[error("malformed PDF: reading at offset {offset}: unexpected end of file")]
    UnexpectedEof { offset: i64 },

    /// A delimiter that cannot start a token
    #[error("unexpected delimiter `{}` at offset {offset}", printable(.byte))]
    UnexpectedDelimiter { byte: u8, offset: i64 },

    /// Hex string with an odd digit count, a non-hex byte, or no terminator
    #[error("malformed hex string at offset {offset}: {message}")]
    MalformedHexString { message: String, offset: i64 },

    /// Backslash followed by a byte with no escape meaning
    #[error("invalid escape sequence \\{} at offset {offset}", printable(.byte))]
    InvalidEscape { byte: u8, offset: i64 },

    /// Octal escape whose value does not fit in a byte
    #[error("invalid octal escape \\{value:03o} at offset {offset}")]
    InvalidOctalEscape { value: u32, offset: i64 },

    /// `#` in a name not followed by two hex digits
    #[error("malformed name at offset {offset}")]
    MalformedName { offset: i64 },

    /// Digit run that does not fit in an i64
    #[error("invalid integer {text} at offset {offset}")]
    InvalidInteger { text: String, offset: i64 },

    /// Real-looking text that does not parse
    #[error("invalid real {text} at offset {offset}")]
    InvalidReal { text: String, offset: i64 },

    /// Keyword where an object was expected
    #[error("unexpected keyword {keyword:?} parsing object at offset {offset}")]
    UnexpectedKeyword { keyword: String, offset: i64 },

    /// Dictionary key that is not a name
    #[error("unexpected non-name key {found} parsing dictionary at offset {offset}")]
    NonNameKey { found: String, offset: i64 },

    /// Indirect object definition not closed by `endobj`
    #[error("missing endobj after indirect object definition at offset {offset}")]
    MissingEndobj { offset: i64 },

    /// `stream` keyword not followed by CR, LF or CRLF
    #[error("stream keyword not followed by newline at offset {offset}")]
    StreamWithoutNewline { offset: i64 },

    /// Malformed PDF structure
    #[error("malformed PDF: {0}")]
    MalformedPDF(String),

    /// Invalid key length
    #[error("Invalid key length: {0}")]
    InvalidKeyLength(usize),

    /// Invalid data length
    #[error("Invalid data length for {operation}")]
    InvalidDataLength { operation: String },

    /// Cryptographic operation failed
    #[error("Cryptographic operation failed: {0}")]
    CryptoError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

fn printable(byte: &u8) -> char {
    char::from(*byte)
}

/// Result type for PDF syntax operations
pub type PDFSyntaxResult<T> = Result<T, PDFSyntaxError>;

impl PDFSyntaxError {
    /// Create a new malformed PDF error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPDF(msg.into())
    }

    /// Create a new crypto error
    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::CryptoError(msg.into())
    }

    /// Create a new invalid data length error
    pub fn invalid_length(operation: impl Into<String>) -> Self {
        Self::InvalidDataLength {
            operation: operation.into(),
        }
    }

    /// Absolute byte offset the error refers to, when known
    pub fn offset(&self) -> Option<i64> {
        match self {
            Self::Read { offset, .. }
            | Self::UnexpectedEof { offset }
            | Self::UnexpectedDelimiter { offset, .. }
            | Self::MalformedHexString { offset, .. }
            | Self::InvalidEscape { offset, .. }
            | Self::InvalidOctalEscape { offset, .. }
            | Self::MalformedName { offset }
            | Self::InvalidInteger { offset, .. }
            | Self::InvalidReal { offset, .. }
            | Self::UnexpectedKeyword { offset, .. }
            | Self::NonNameKey { offset, .. }
            | Self::MissingEndobj { offset }
            | Self::StreamWithoutNewline { offset } => Some(*offset),
            _ => None,
        }
    }

    /// Check if error comes from the tokenizer
    pub fn is_lexical_error(&self) -> bool {
        matches!(self,
            Self::UnexpectedDelimiter { .. } |
            Self::MalformedHexString { .. } |
            Self::InvalidEscape { .. } |
            Self::InvalidOctalEscape { .. } |
            Self::MalformedName { .. } |
            Self::InvalidInteger { .. } |
            Self::InvalidReal { .. }
        )
    }

    /// Check if error comes from the object grammar
    pub fn is_syntax_error(&self) -> bool {
        matches!(self,
            Self::UnexpectedKeyword { .. } |
            Self::NonNameKey { .. } |
            Self::MissingEndobj { .. } |
            Self::StreamWithoutNewline { .. } |
            Self::MalformedPDF(_)
        )
    }

    /// Check if error is cryptographic
    pub fn is_crypto_error(&self) -> bool {
        matches!(self,
            Self::CryptoError(_) |
            Self::InvalidKeyLength(_) |
            Self::InvalidDataLength { .. }
        )
    }

    /// Check if error is an intolerated end of input
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::UnexpectedEof { .. })
    }
}

impl From<aes::cipher::InvalidLength> for PDFSyntaxError {
    fn from(err: aes::cipher::InvalidLength) -> Self {
        Self::CryptoError(err.to_string())
    }
}
