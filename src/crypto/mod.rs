//! String decryption services invoked while promoting string tokens to objects

mod rc4;
mod aes;
mod engine;

pub use engine::StandardCryptoProvider;
use crate::error::PDFSyntaxResult;
use crate::pdf::ObjPtr;
use crate::Cipher;

/// Decryption service consulted by the object parser
///
/// Implementations receive the document key exactly as configured on the
/// buffer and must derive any per-object key themselves.
pub trait CryptoProvider: Send + Sync {
    /// Decrypt the bytes of a string that belongs to the object `ptr`
    fn decrypt_string(
        &self,
        key: &[u8],
        cipher: Cipher,
        ptr: ObjPtr,
        data: &[u8],
    ) -> PDFSyntaxResult<Vec<u8>>;
}

/// Block or stream cipher applied with an already derived object key
pub(crate) trait CipherProvider: Send + Sync {
    fn process_data(&self, data: &[u8], key: &[u8]) -> PDFSyntaxResult<Vec<u8>>;
}
