//! AES in CBC mode.

use super::BlockCipher;
use crate::error::{CoreError, CoreResult};
use aes_gcm::aes::cipher::{generic_array::GenericArray, KeyInit};
use aes_gcm::aes::{Aes128, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, InnerIvInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES block size in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

const KEY_SIZES: &[usize] = &[16, 32];

/// Raw AES key material (128 or 256 bits).
///
/// The key is automatically zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: Vec<u8>,
}

impl EncryptionKey {
    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not 16 or 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if !KEY_SIZES.contains(&bytes.len()) {
            return Err(CoreError::invalid_key_size(bytes.len(), KEY_SIZES));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Returns the key as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

enum Aes {
    Aes128(Aes128),
    Aes256(Aes256),
}

impl Aes {
    fn decrypt_cbc(
        &self,
        iv: &[u8; AES_BLOCK_SIZE],
        input: &[u8],
        output: &mut [u8],
    ) -> CoreResult<()> {
        let iv = GenericArray::from_slice(iv);
        let result = match self {
            Self::Aes128(cipher) => cbc::Decryptor::<Aes128>::inner_iv_init(cipher.clone(), iv)
                .decrypt_padded_b2b_mut::<NoPadding>(input, output)
                .map(|_| ()),
            Self::Aes256(cipher) => cbc::Decryptor::<Aes256>::inner_iv_init(cipher.clone(), iv)
                .decrypt_padded_b2b_mut::<NoPadding>(input, output)
                .map(|_| ()),
        };
        result.map_err(|e| CoreError::decryption(format!("AES-CBC: {e}")))
    }
}

/// AES-CBC decryption with a fixed initialization vector.
///
/// Every call to [`BlockCipher::decrypt`] restarts the chain from the IV,
/// so each frame payload decrypts on its own.
pub struct AesCbcCipher {
    aes: Aes,
    iv: [u8; AES_BLOCK_SIZE],
}

impl AesCbcCipher {
    /// Creates a cipher from a key and an initialization vector.
    #[must_use]
    pub fn new(key: &EncryptionKey, iv: [u8; AES_BLOCK_SIZE]) -> Self {
        let bytes = key.as_bytes();
        // EncryptionKey only admits 16 or 32 bytes.
        let aes = if bytes.len() == 16 {
            Aes::Aes128(Aes128::new(GenericArray::from_slice(bytes)))
        } else {
            Aes::Aes256(Aes256::new(GenericArray::from_slice(bytes)))
        };
        Self { aes, iv }
    }
}

impl BlockCipher for AesCbcCipher {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn decrypt(&self, ciphertext: &[u8], cleartext: &mut [u8]) -> CoreResult<()> {
        if ciphertext.len() % AES_BLOCK_SIZE != 0 || cleartext.len() != ciphertext.len() {
            return Err(CoreError::decryption(format!(
                "AES-CBC needs whole blocks: {} ciphertext bytes, {} output bytes",
                ciphertext.len(),
                cleartext.len()
            )));
        }

        self.aes.decrypt_cbc(&self.iv, ciphertext, cleartext)
    }
}

impl std::fmt::Debug for AesCbcCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self.aes {
            Aes::Aes128(_) => "AES-128-CBC",
            Aes::Aes256(_) => "AES-256-CBC",
        };
        f.debug_struct("AesCbcCipher")
            .field("variant", &variant)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DecryptionContext;
    use cbc::cipher::{BlockEncryptMut, KeyIvInit};

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn cbc_encrypt(key: &[u8], iv: [u8; 16], plaintext: &[u8]) -> Vec<u8> {
        cbc::Encryptor::<Aes256>::new_from_slices(key, &iv)
            .unwrap()
            .encrypt_padded_vec_mut::<NoPadding>(plaintext)
    }

    #[test]
    fn nist_cbc_aes128_vector() {
        let key = EncryptionKey::from_bytes(&hex("2b7e151628aed2a6abf7158809cf4f3c")).unwrap();
        let mut iv = [0u8; 16];
        iv.copy_from_slice(&hex("000102030405060708090a0b0c0d0e0f"));
        let cipher = AesCbcCipher::new(&key, iv);

        let ciphertext = hex("7649abac8119b246cee98e9b12e9197d");
        let mut cleartext = vec![0u8; 16];
        cipher.decrypt(&ciphertext, &mut cleartext).unwrap();
        assert_eq!(cleartext, hex("6bc1bee22e409f96e93d7e117393172a"));
    }

    #[test]
    fn aes256_decrypt_inverts_encrypt() {
        let key_bytes = [0x42u8; 32];
        let iv = [7u8; 16];
        let plaintext: Vec<u8> = (0u8..64).collect();
        let ciphertext = cbc_encrypt(&key_bytes, iv, &plaintext);

        let key = EncryptionKey::from_bytes(&key_bytes).unwrap();
        let cipher = AesCbcCipher::new(&key, iv);
        let mut cleartext = vec![0u8; ciphertext.len()];
        cipher.decrypt(&ciphertext, &mut cleartext).unwrap();
        assert_eq!(cleartext, plaintext);
    }

    #[test]
    fn each_call_restarts_chain() {
        let key_bytes = [0x11u8; 32];
        let iv = [0u8; 16];
        let plaintext = [9u8; 32];
        let ciphertext = cbc_encrypt(&key_bytes, iv, &plaintext);

        let key = EncryptionKey::from_bytes(&key_bytes).unwrap();
        let cipher = AesCbcCipher::new(&key, iv);
        for _ in 0..2 {
            let mut cleartext = vec![0u8; 32];
            cipher.decrypt(&ciphertext, &mut cleartext).unwrap();
            assert_eq!(cleartext, plaintext.to_vec());
        }
    }

    #[test]
    fn padded_payload_through_context() {
        let key_bytes = [0x24u8; 32];
        let iv = [3u8; 16];
        // 20 meaningful bytes behind 12 bytes of leading padding.
        let mut stored_plain = vec![0u8; 12];
        stored_plain.extend_from_slice(b"twenty bytes payload");
        let ciphertext = cbc_encrypt(&key_bytes, iv, &stored_plain);

        let key = EncryptionKey::from_bytes(&key_bytes).unwrap();
        let ctx = DecryptionContext::new(Box::new(AesCbcCipher::new(&key, iv))).unwrap();
        assert_eq!(ctx.required_ciphertext_length(20), 32);
        assert_eq!(ctx.decrypt(&ciphertext, 20).unwrap(), b"twenty bytes payload".to_vec());
    }

    #[test]
    fn partial_block_rejected() {
        let key = EncryptionKey::from_bytes(&[0u8; 16]).unwrap();
        let cipher = AesCbcCipher::new(&key, [0u8; 16]);
        let mut out = vec![0u8; 15];
        assert!(cipher.decrypt(&[0u8; 15], &mut out).is_err());
    }

    #[test]
    fn invalid_key_size() {
        let result = EncryptionKey::from_bytes(&[0u8; 24]);
        assert!(matches!(
            result,
            Err(CoreError::InvalidKeySize { actual: 24, .. })
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let key = EncryptionKey::from_bytes(&[0xAB; 16]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }
}
