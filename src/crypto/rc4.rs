//! RC4 decryption provider implementation

use rc4::consts::{U10, U11, U12, U13, U14, U15, U16, U5, U6, U7, U8, U9};
use rc4::{KeyInit, Rc4, StreamCipher};
use crate::error::{PDFSyntaxError, PDFSyntaxResult};
use super::CipherProvider;

/// RC4 provider for object keys of 5 to 16 bytes
#[derive(Debug, Default)]
pub(crate) struct RC4Provider;

impl RC4Provider {
    pub fn new() -> Self {
        Self
    }
}

macro_rules! apply_rc4 {
    ($key:expr, $data:expr, $($len:literal => $size:ty),+ $(,)?) => {
        match $key.len() {
            $(
                $len => {
                    let mut cipher = Rc4::<$size>::new_from_slice($key)?;
                    cipher.apply_keystream($data);
                }
            )+
            n => return Err(PDFSyntaxError::InvalidKeyLength(n)),
        }
    };
}

impl CipherProvider for RC4Provider {
    fn process_data(&self, data: &[u8], key: &[u8]) -> PDFSyntaxResult<Vec<u8>> {
        let mut out = data.to_vec();
        apply_rc4!(key, &mut out,
            5 => U5, 6 => U6, 7 => U7, 8 => U8, 9 => U9, 10 => U10,
            11 => U11, 12 => U12, 13 => U13, 14 => U14, 15 => U15, 16 => U16,
        );
        Ok(out)
    }
}
