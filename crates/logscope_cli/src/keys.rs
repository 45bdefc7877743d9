//! Key material from the command line.

use logscope_core::{AesCbcCipher, DecryptionContext, EncryptionKey, AES_BLOCK_SIZE};
use thiserror::Error;

/// Errors in user-supplied key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Not a hex string.
    #[error("invalid hex in {what}: {reason}")]
    InvalidHex {
        /// Which argument.
        what: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The IV is not one block long.
    #[error("IV must be 16 bytes, got {0}")]
    IvLength(usize),

    /// The key was rejected.
    #[error(transparent)]
    Key(#[from] logscope_core::CoreError),
}

/// Decodes a hex string, ignoring whitespace and an optional `0x` prefix.
pub fn hex_decode(what: &'static str, hex: &str) -> Result<Vec<u8>, KeyError> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    let hex = hex.strip_prefix("0x").unwrap_or(&hex);

    if !hex.is_ascii() {
        return Err(KeyError::InvalidHex {
            what,
            reason: "non-ASCII character".into(),
        });
    }
    if hex.len() % 2 != 0 {
        return Err(KeyError::InvalidHex {
            what,
            reason: "odd number of digits".into(),
        });
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| KeyError::InvalidHex {
                what,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Builds an AES-CBC decryption context from hex key and IV arguments.
///
/// A missing IV means all zeros.
pub fn decryption_context(
    key_hex: &str,
    iv_hex: Option<&str>,
) -> Result<DecryptionContext, KeyError> {
    let key = EncryptionKey::from_bytes(&hex_decode("key", key_hex)?)?;

    let mut iv = [0u8; AES_BLOCK_SIZE];
    if let Some(iv_hex) = iv_hex {
        let bytes = hex_decode("iv", iv_hex)?;
        if bytes.len() != AES_BLOCK_SIZE {
            return Err(KeyError::IvLength(bytes.len()));
        }
        iv.copy_from_slice(&bytes);
    }

    Ok(DecryptionContext::new(Box::new(AesCbcCipher::new(&key, iv)))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hex() {
        assert_eq!(hex_decode("key", "00ff10").unwrap(), vec![0x00, 0xff, 0x10]);
        assert_eq!(hex_decode("key", "0xAB cd").unwrap(), vec![0xab, 0xcd]);
        assert!(hex_decode("key", "").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(matches!(
            hex_decode("key", "abc"),
            Err(KeyError::InvalidHex { what: "key", .. })
        ));
        assert!(hex_decode("iv", "zz").is_err());
        assert!(hex_decode("iv", "é0").is_err());
    }

    #[test]
    fn builds_context() {
        let key = "2b7e151628aed2a6abf7158809cf4f3c";
        let ctx = decryption_context(key, Some("000102030405060708090a0b0c0d0e0f")).unwrap();
        assert_eq!(ctx.block_size(), AES_BLOCK_SIZE);
        assert!(decryption_context(key, None).is_ok());
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(matches!(
            decryption_context("00", None),
            Err(KeyError::Key(_))
        ));
        let key = "00".repeat(32);
        assert!(matches!(
            decryption_context(&key, Some("0011")),
            Err(KeyError::IvLength(2))
        ));
    }
}
