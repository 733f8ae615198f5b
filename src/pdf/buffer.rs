//! Re-fillable byte source with byte and token pushback

use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use log::{debug, trace};
use zeroize::Zeroizing;

use crate::crypto::{CryptoProvider, StandardCryptoProvider};
use crate::error::{PDFSyntaxError, PDFSyntaxResult};
use crate::Cipher;
use super::{ObjPtr, Token};

/// Default block capacity of a [`Buffer`]
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Byte returned for every read past the end of input
const EOF_SENTINEL: u8 = b'\n';

/// Construction options for a [`Buffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Block size; refills end on multiples of it relative to the absolute offset
    pub capacity: usize,
    /// Treat end of input as a token instead of an error
    pub allow_eof: bool,
    /// Recognize `N G R` and `N G obj` while parsing objects
    pub allow_objptr: bool,
    /// Turn a dictionary followed by `stream` into a [`Stream`](super::Stream)
    pub allow_stream: bool,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_SIZE,
            allow_eof: false,
            allow_objptr: true,
            allow_stream: true,
        }
    }
}

/// Byte source feeding the tokenizer and the object parser
///
/// Bytes are pulled from the reader one block at a time. `offset` is the
/// absolute position just past the buffered block, so the position of the
/// next byte is always `offset - buf.len() + pos`.
pub struct Buffer<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    capacity: usize,
    offset: i64,
    origin: i64,
    unread: Vec<Token>,
    pub(crate) eof: bool,
    pub(crate) allow_eof: bool,
    pub(crate) allow_objptr: bool,
    pub(crate) allow_stream: bool,
    pub(crate) key: Option<Zeroizing<Vec<u8>>>,
    pub(crate) cipher: Cipher,
    pub(crate) objptr: ObjPtr,
    pub(crate) crypto: Box<dyn CryptoProvider>,
}

impl<R: Read> Buffer<R> {
    /// Create a buffer over `reader`, whose first byte sits at absolute `offset`
    pub fn new(reader: R, offset: i64) -> Self {
        Self::with_config(reader, offset, BufferConfig::default())
    }

    pub fn with_config(reader: R, offset: i64, config: BufferConfig) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(config.capacity),
            pos: 0,
            capacity: config.capacity.max(1),
            offset,
            origin: offset,
            unread: Vec::new(),
            eof: false,
            allow_eof: config.allow_eof,
            allow_objptr: config.allow_objptr,
            allow_stream: config.allow_stream,
            key: None,
            cipher: Cipher::default(),
            objptr: ObjPtr::default(),
            crypto: Box::new(StandardCryptoProvider::new()),
        }
    }

    /// Absolute offset of the next unread byte
    pub fn read_offset(&self) -> i64 {
        self.offset - self.buf.len() as i64 + self.pos as i64
    }

    /// Check if the source has been exhausted
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Refill the block; returns false once the source is exhausted.
    fn reload(&mut self) -> PDFSyntaxResult<bool> {
        let cap = self.capacity as i64;
        let want = (cap - self.offset.rem_euclid(cap)) as usize;
        self.buf.resize(want, 0);
        self.pos = 0;

        let n = loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.clear();
                    return Err(PDFSyntaxError::Read {
                        offset: self.offset,
                        source: e,
                    });
                }
            }
        };
        self.buf.truncate(n);

        if n == 0 {
            trace!("End of input at offset {}", self.offset);
            self.eof = true;
            return Ok(false);
        }
        trace!("Loaded {} bytes at offset {}", n, self.offset);
        self.offset += n as i64;
        Ok(true)
    }

    /// Next byte of input
    ///
    /// The first read past the end returns a newline and sets the EOF flag.
    /// Later reads return the newline again only when EOF is tolerated.
    pub fn read_byte(&mut self) -> PDFSyntaxResult<u8> {
        if self.pos >= self.buf.len() {
            if self.eof {
                if !self.allow_eof {
                    return Err(PDFSyntaxError::UnexpectedEof { offset: self.offset });
                }
                return Ok(EOF_SENTINEL);
            }
            if !self.reload()? {
                return Ok(EOF_SENTINEL);
            }
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Step back one byte; does nothing at the start of a block.
    pub fn unread_byte(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    /// Push a token back; pushed tokens are returned last in, first out.
    pub fn unread_token(&mut self, token: Token) {
        self.unread.push(token);
    }

    pub(crate) fn pop_token(&mut self) -> Option<Token> {
        self.unread.pop()
    }

    /// Advance to absolute `offset` by reading forward
    ///
    /// Blocks are discarded until the target falls inside the buffered one.
    /// If input ends first this stops silently when EOF is tolerated and
    /// fails otherwise. Pending tokens are dropped.
    pub fn seek_forward(&mut self, offset: i64) -> PDFSyntaxResult<()> {
        let block_start = self.offset - self.buf.len() as i64;
        if offset < block_start {
            return Err(PDFSyntaxError::malformed(format!(
                "cannot seek forward to offset {} from offset {}",
                offset,
                self.read_offset()
            )));
        }
        trace!("Seeking forward to offset {}", offset);
        self.unread.clear();
        while self.offset < offset {
            if !self.reload()? {
                if !self.allow_eof {
                    return Err(PDFSyntaxError::UnexpectedEof { offset: self.offset });
                }
                return Ok(());
            }
        }
        self.pos = self.buf.len() - (self.offset - offset) as usize;
        Ok(())
    }

    /// Replace the key and cipher used to decrypt strings
    pub fn set_key(&mut self, key: &[u8], cipher: Cipher) {
        debug!("Installing {} byte {} string key", key.len(), cipher);
        self.key = Some(Zeroizing::new(key.to_vec()));
        self.cipher = cipher;
    }

    pub fn clear_key(&mut self) {
        self.key = None;
    }

    pub fn set_allow_eof(&mut self, allow: bool) {
        self.allow_eof = allow;
    }

    pub fn set_allow_objptr(&mut self, allow: bool) {
        self.allow_objptr = allow;
    }

    pub fn set_allow_stream(&mut self, allow: bool) {
        self.allow_stream = allow;
    }

    /// Set the object whose strings are being read; id 0 disables decryption.
    pub fn set_objptr(&mut self, ptr: ObjPtr) {
        self.objptr = ptr;
    }

    pub fn objptr(&self) -> ObjPtr {
        self.objptr
    }

    pub fn set_crypto_provider(&mut self, provider: Box<dyn CryptoProvider>) {
        self.crypto = provider;
    }

    /// Consume the buffer, returning the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> Buffer<R> {
    /// Reposition the source at absolute `offset`
    ///
    /// Buffered bytes, pending tokens and the EOF flag are discarded.
    pub fn seek(&mut self, offset: i64) -> PDFSyntaxResult<()> {
        if offset < self.origin {
            return Err(PDFSyntaxError::malformed(format!(
                "seek to offset {} before start of input at {}",
                offset, self.origin
            )));
        }
        debug!("Seeking to offset {}", offset);
        self.reader.seek(SeekFrom::Start((offset - self.origin) as u64))?;
        self.offset = offset;
        self.buf.clear();
        self.pos = 0;
        self.unread.clear();
        self.eof = false;
        Ok(())
    }
}

impl Buffer<Cursor<Vec<u8>>> {
    /// Buffer over in-memory bytes starting at offset 0
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(data.into()), 0)
    }
}

impl<R> fmt::Debug for Buffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("offset", &self.offset)
            .field("pos", &self.pos)
            .field("buffered", &self.buf.len())
            .field("pending_tokens", &self.unread.len())
            .field("eof", &self.eof)
            .field("allow_eof", &self.allow_eof)
            .field("allow_objptr", &self.allow_objptr)
            .field("allow_stream", &self.allow_stream)
            .field("encrypted", &self.key.is_some())
            .field("cipher", &self.cipher)
            .field("objptr", &self.objptr)
            .finish()
    }
}
