//! Decryption of encrypted log payloads.
//!
//! An encrypted log stores each payload rounded up to a whole number of
//! cipher blocks. The padding sits in front of the meaningful bytes: after
//! decrypting the full ciphertext, the reader drops the first
//! `padding = required_ciphertext_length(n) - n` bytes and keeps the next
//! `n`. Changing this offset breaks compatibility with existing logs.
//!
//! The cipher itself is opaque to the reader. Anything implementing
//! [`BlockCipher`] can be wrapped in a [`DecryptionContext`]; with the
//! `encryption` feature enabled, [`AesCbcCipher`] provides AES in CBC mode.
//!
//! ## Usage
//!
//! ```
//! use logscope_core::crypto::{DecryptionContext, IdentityCipher};
//!
//! let ctx = DecryptionContext::new(Box::new(IdentityCipher::new(8))).unwrap();
//! assert_eq!(ctx.required_ciphertext_length(13), 16);
//!
//! let plain = ctx.decrypt(b"...abcdefghijklm", 13).unwrap();
//! assert_eq!(&plain, b"abcdefghijklm");
//! ```

#[cfg(feature = "encryption")]
mod aes;

#[cfg(feature = "encryption")]
pub use aes::{AesCbcCipher, EncryptionKey, AES_BLOCK_SIZE};

use crate::error::{CoreError, CoreResult};

/// A block cipher's decrypt operation.
///
/// Implementations are stateless per call: every call decrypts its input
/// independently of earlier calls.
pub trait BlockCipher: Send + Sync {
    /// Cipher block size in bytes.
    fn block_size(&self) -> usize;

    /// Decrypts `ciphertext` into `cleartext`.
    ///
    /// Both buffers have the same length, a multiple of [`Self::block_size`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying cipher fails.
    fn decrypt(&self, ciphertext: &[u8], cleartext: &mut [u8]) -> CoreResult<()>;
}

/// A cipher whose cleartext equals its ciphertext.
///
/// Useful for tests and for logs whose payloads were padded but not
/// encrypted.
#[derive(Debug, Clone, Copy)]
pub struct IdentityCipher {
    block_size: usize,
}

impl IdentityCipher {
    /// Creates an identity cipher with the given block size.
    #[must_use]
    pub const fn new(block_size: usize) -> Self {
        Self { block_size }
    }
}

impl BlockCipher for IdentityCipher {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn decrypt(&self, ciphertext: &[u8], cleartext: &mut [u8]) -> CoreResult<()> {
        cleartext.copy_from_slice(ciphertext);
        Ok(())
    }
}

/// Decrypts and de-pads frame payloads.
pub struct DecryptionContext {
    cipher: Box<dyn BlockCipher>,
    block_size: usize,
}

impl DecryptionContext {
    /// Wraps a cipher.
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher reports a block size of zero.
    pub fn new(cipher: Box<dyn BlockCipher>) -> CoreResult<Self> {
        let block_size = cipher.block_size();
        if block_size == 0 {
            return Err(CoreError::decryption("block size must be at least 1"));
        }
        Ok(Self { cipher, block_size })
    }

    /// Cipher block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of padding bytes in front of a payload of `plain_len` bytes.
    #[must_use]
    pub fn padding(&self, plain_len: usize) -> usize {
        match plain_len % self.block_size {
            0 => 0,
            tail => self.block_size - tail,
        }
    }

    /// Stored size of a payload of `plain_len` bytes.
    ///
    /// Exact multiples of the block size get no padding.
    #[must_use]
    pub fn required_ciphertext_length(&self, plain_len: usize) -> usize {
        plain_len + self.padding(plain_len)
    }

    /// Decrypts a stored payload and returns its `plain_len` meaningful bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `ciphertext` is not exactly
    /// [`required_ciphertext_length(plain_len)`](Self::required_ciphertext_length)
    /// bytes long, or if the cipher fails.
    pub fn decrypt(&self, ciphertext: &[u8], plain_len: usize) -> CoreResult<Vec<u8>> {
        let required = self.required_ciphertext_length(plain_len);
        if ciphertext.len() != required {
            return Err(CoreError::decryption(format!(
                "ciphertext is {} bytes, expected {required} for {plain_len} cleartext bytes",
                ciphertext.len()
            )));
        }

        let mut cleartext = vec![0u8; required];
        self.cipher.decrypt(ciphertext, &mut cleartext)?;

        let padding = required - plain_len;
        Ok(cleartext.split_off(padding))
    }
}

impl std::fmt::Debug for DecryptionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionContext")
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}
