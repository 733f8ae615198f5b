//! AES-CBC decryption provider implementation

use aes::{Aes128, Block};
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, KeyInit};
use crate::error::{PDFSyntaxError, PDFSyntaxResult};
use super::CipherProvider;

const BLOCK_SIZE: usize = 16;

/// AES-128 provider; input is the IV followed by CBC ciphertext
pub(crate) struct AESProvider;

impl AESProvider {
    pub fn new() -> Self {
        Self
    }

    fn decrypt_cbc(&self, data: &[u8], cipher: &Aes128) -> PDFSyntaxResult<Vec<u8>> {
        if data.len() < BLOCK_SIZE || data.len() % BLOCK_SIZE != 0 {
            return Err(PDFSyntaxError::invalid_length("AES"));
        }

        let (iv, encrypted) = data.split_at(BLOCK_SIZE);
        let mut out = encrypted.to_vec();
        let mut prev_block: Block = GenericArray::clone_from_slice(iv);

        for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
            let saved_block: Block = GenericArray::clone_from_slice(chunk);
            cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
            for (b, p) in chunk.iter_mut().zip(prev_block.iter()) {
                *b ^= p;
            }
            prev_block = saved_block;
        }

        strip_padding(&mut out);
        Ok(out)
    }
}

/// Remove a well-formed PKCS#7 suffix; anything else is left untouched.
fn strip_padding(data: &mut Vec<u8>) {
    let Some(&last) = data.last() else {
        return;
    };
    let pad = last as usize;
    if pad == 0 || pad > BLOCK_SIZE || pad > data.len() {
        return;
    }
    if data[data.len() - pad..].iter().all(|&b| b == last) {
        data.truncate(data.len() - pad);
    }
}

impl CipherProvider for AESProvider {
    fn process_data(&self, data: &[u8], key: &[u8]) -> PDFSyntaxResult<Vec<u8>> {
        if key.len() != BLOCK_SIZE {
            return Err(PDFSyntaxError::InvalidKeyLength(key.len()));
        }
        let cipher = Aes128::new_from_slice(key)?;
        self.decrypt_cbc(data, &cipher)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aes::cipher::BlockEncrypt;
    use pretty_assertions::assert_eq;

    /// CBC-encrypt `plain` with PKCS#7 padding, prefixing the IV.
    pub(crate) fn encrypt_cbc(key: &[u8], iv: &[u8; 16], plain: &[u8]) -> Vec<u8> {
        let cipher = Aes128::new_from_slice(key).unwrap();
        let pad = BLOCK_SIZE - plain.len() % BLOCK_SIZE;
        let mut data = plain.to_vec();
        data.extend(std::iter::repeat(pad as u8).take(pad));

        let mut out = iv.to_vec();
        let mut prev: Block = GenericArray::clone_from_slice(iv);
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            for (b, p) in chunk.iter_mut().zip(prev.iter()) {
                *b ^= p;
            }
            let block = GenericArray::from_mut_slice(chunk);
            cipher.encrypt_block(block);
            prev = block.clone();
            out.extend_from_slice(chunk);
        }
        out
    }

    #[test]
    fn test_aes_known_vector() {
        // FIPS-197 appendix C.1 with a zero IV and no padding on the block
        let provider = AESProvider::new();
        let key = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let mut data = vec![0u8; 16];
        data.extend(hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a").unwrap());

        let plain = provider.process_data(&data, &key).unwrap();
        assert_eq!(hex::encode(plain), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn test_aes_round_trip_strips_padding() {
        let provider = AESProvider::new();
        let key = [7u8; 16];
        let iv = [3u8; 16];
        let encrypted = encrypt_cbc(&key, &iv, b"Test AES-128 decryption with CBC mode");

        let decrypted = provider.process_data(&encrypted, &key).unwrap();
        assert_eq!(decrypted, b"Test AES-128 decryption with CBC mode".to_vec());
    }

    #[test]
    fn test_invalid_key_length() {
        let provider = AESProvider::new();
        let key = vec![1u8; 24];

        assert!(matches!(
            provider.process_data(&[0u8; 32], &key),
            Err(PDFSyntaxError::InvalidKeyLength(24))
        ));
    }

    #[test]
    fn test_invalid_data_length() {
        let provider = AESProvider::new();
        let key = vec![1u8; 16];

        assert!(matches!(
            provider.process_data(&[0u8; 8], &key),
            Err(PDFSyntaxError::InvalidDataLength { .. })
        ));
        assert!(matches!(
            provider.process_data(&[0u8; 20], &key),
            Err(PDFSyntaxError::InvalidDataLength { .. })
        ));
    }

    #[test]
    fn test_strip_padding_leaves_malformed_suffix() {
        let mut data = vec![1, 2, 3, 2];
        strip_padding(&mut data);
        assert_eq!(data, vec![1, 2, 3, 2]);

        let mut data = vec![9, 9, 3, 3, 3];
        strip_padding(&mut data);
        assert_eq!(data, vec![9, 9]);
    }
}
