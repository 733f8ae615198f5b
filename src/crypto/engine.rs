//! Standard per-object string decryption

use log::trace;
use md5::{Digest, Md5};
use zeroize::Zeroizing;

use crate::error::PDFSyntaxResult;
use crate::pdf::ObjPtr;
use crate::Cipher;
use super::aes::AESProvider;
use super::rc4::RC4Provider;
use super::{CipherProvider, CryptoProvider};

/// Default decryption service: MD5-derived object keys with RC4 or AES-128
pub struct StandardCryptoProvider {
    rc4: RC4Provider,
    aes: AESProvider,
}

impl Default for StandardCryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardCryptoProvider {
    /// Create new provider instance
    pub fn new() -> Self {
        Self {
            rc4: RC4Provider::new(),
            aes: AESProvider::new(),
        }
    }

    /// Derive the key for a single object from the document key
    pub(crate) fn object_key(&self, file_key: &[u8], ptr: ObjPtr, cipher: Cipher) -> Zeroizing<Vec<u8>> {
        let mut hasher = Md5::new();
        hasher.update(file_key);

        // Low-order 3 bytes of the object number, then the generation
        hasher.update(&ptr.id.to_le_bytes()[0..3]);
        hasher.update(ptr.gen.to_le_bytes());

        if cipher == Cipher::Aes {
            hasher.update(b"sAlT");
        }

        let hash = hasher.finalize();
        let key_len = (file_key.len() + 5).min(16);
        Zeroizing::new(hash[..key_len].to_vec())
    }

    fn provider(&self, cipher: Cipher) -> &dyn CipherProvider {
        match cipher {
            Cipher::Rc4 => &self.rc4,
            Cipher::Aes => &self.aes,
        }
    }
}

impl CryptoProvider for StandardCryptoProvider {
    fn decrypt_string(
        &self,
        key: &[u8],
        cipher: Cipher,
        ptr: ObjPtr,
        data: &[u8],
    ) -> PDFSyntaxResult<Vec<u8>> {
        trace!("Decrypting {} byte string of object {} with {}", data.len(), ptr, cipher);
        let object_key = self.object_key(key, ptr, cipher);
        self.provider(cipher).process_data(data, &object_key)
    }
}
