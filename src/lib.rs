//! PDF Syntax Library for Rust
//!
//! A streaming lexer and recursive-descent object parser for the PDF file
//! syntax. Bytes are pulled on demand from any [`std::io::Read`] source, turned
//! into [`Token`]s, and assembled into [`Object`]s: dictionaries, arrays,
//! indirect references, indirect object definitions and streams (whose payload
//! is located by offset, never read).
//!
//! ```
//! use pdf_syntax::{Buffer, ObjPtr};
//!
//! let mut buffer = Buffer::from_bytes(b"5 0 obj << /Parent 3 0 R >> endobj".to_vec());
//! let obj = buffer.read_object().unwrap();
//! let def = obj.as_definition().unwrap();
//! assert_eq!(def.ptr, ObjPtr::new(5, 0));
//! let dict = def.obj.as_dict().unwrap();
//! assert_eq!(dict.get_reference("Parent"), Some(ObjPtr::new(3, 0)));
//! ```

use std::fmt;
use std::io::Cursor;

mod error;
mod crypto;
mod pdf;

pub use error::{PDFSyntaxError, PDFSyntaxResult};
pub use crypto::{CryptoProvider, StandardCryptoProvider};
pub use pdf::{
    Buffer, BufferConfig, Dictionary, Name, ObjDef, ObjPtr, Object, Stream, Token,
    DEFAULT_BUFFER_SIZE,
};

/// Cipher used for strings of an encrypted document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cipher {
    /// RC4 stream cipher (PDF 1.1 to 1.5 security handlers)
    #[default]
    Rc4,
    /// AES-128 in CBC mode with the IV prefixed to the data (PDF 1.6)
    Aes,
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cipher::Rc4 => write!(f, "RC4"),
            Cipher::Aes => write!(f, "AES"),
        }
    }
}

/// Parse a single object from the start of `data`
///
/// Indirect references and definitions are recognized and a dictionary
/// followed by `stream` yields a [`Stream`]. The end of the slice is
/// tolerated, so a trailing integer or an unterminated dictionary or array
/// is returned as far as it goes.
pub fn parse_object(data: &[u8]) -> PDFSyntaxResult<Object> {
    let config = BufferConfig {
        allow_eof: true,
        ..BufferConfig::default()
    };
    let mut buffer = Buffer::with_config(Cursor::new(data), 0, config);
    buffer.read_object()
}
