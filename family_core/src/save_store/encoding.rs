//! Reversible obfuscation of stored text.
//!
//! Text is XORed with a per-installation key and base64 encoded. This keeps save
//! files from being casually read or edited in place; it is not encryption and
//! offers no protection against someone holding the key, which lives in the same
//! storage as the data. Losing the key makes every encoded blob unreadable.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;
use thiserror::Error;

/// Length of a generated key in bytes.
pub const KEY_LEN: usize = 32;

/// Errors raised when a blob cannot be turned back into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("data is corrupted or undecodable: {0}")]
    Undecodable(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Symmetric obfuscation key.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageKey(Vec<u8>);

impl StorageKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; KEY_LEN];
        rand::rng().fill(&mut bytes[..]);
        Self(bytes)
    }

    /// Build a key from raw bytes. Empty keys are rejected.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, EncodingError> {
        if bytes.is_empty() {
            return Err(EncodingError::InvalidKey("key is empty".to_string()));
        }
        Ok(Self(bytes))
    }

    /// Parse the hex form written by [`StorageKey::to_hex`].
    pub fn from_hex(hex: &str) -> Result<Self, EncodingError> {
        let hex = hex.trim();
        if hex.len() % 2 != 0 {
            return Err(EncodingError::InvalidKey("odd number of hex digits".to_string()));
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| {
                hex.get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| EncodingError::InvalidKey(format!("bad hex at offset {i}")))
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Self::from_bytes(bytes)
    }

    /// Lowercase hex form, suitable for the plaintext key slot.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    fn apply(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.0.iter().cycle())
            .map(|(byte, key)| byte ^ key)
            .collect()
    }
}

impl std::fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StorageKey({} bytes)", self.0.len())
    }
}

/// Obfuscate text with the key.
pub fn encode(text: &str, key: &StorageKey) -> String {
    STANDARD.encode(key.apply(text.as_bytes()))
}

/// Reverse [`encode`]. Fails with [`EncodingError::Undecodable`] on malformed
/// input or when the bytes were produced with a different key.
pub fn decode(opaque: &str, key: &StorageKey) -> Result<String, EncodingError> {
    let bytes = STANDARD
        .decode(opaque.trim())
        .map_err(|e| EncodingError::Undecodable(e.to_string()))?;
    String::from_utf8(key.apply(&bytes)).map_err(|e| EncodingError::Undecodable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encoded_text_is_not_plaintext() {
        let key = StorageKey::generate();
        let encoded = encode("{\"name\":\"Maya\"}", &key);
        assert!(!encoded.contains("Maya"));
        assert_eq!(decode(&encoded, &key).unwrap(), "{\"name\":\"Maya\"}");
    }

    #[test]
    fn test_wrong_key_is_an_error_not_a_panic() {
        let key = StorageKey::from_bytes(vec![0x80; KEY_LEN]).unwrap();
        let other = StorageKey::from_bytes(vec![0x01; KEY_LEN]).unwrap();
        let encoded = encode("plain ascii save data", &key);

        // Flipping the high bit of every ASCII byte can never be valid UTF-8.
        assert!(matches!(
            decode(&encoded, &StorageKey::from_bytes(vec![0x00; KEY_LEN]).unwrap()),
            Err(EncodingError::Undecodable(_))
        ));
        assert_ne!(decode(&encoded, &other).ok().as_deref(), Some("plain ascii save data"));
    }

    #[test]
    fn test_garbage_input() {
        let key = StorageKey::generate();
        assert!(matches!(
            decode("not base64 at all!!", &key),
            Err(EncodingError::Undecodable(_))
        ));
    }

    #[test]
    fn test_key_hex_round_trip() {
        let key = StorageKey::generate();
        let restored = StorageKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, restored);

        assert!(StorageKey::from_hex("abc").is_err());
        assert!(StorageKey::from_hex("zz").is_err());
        assert!(StorageKey::from_hex("").is_err());
    }

    proptest! {
        #[test]
        fn prop_decode_reverses_encode(text in ".*", key in proptest::collection::vec(any::<u8>(), 1..48)) {
            let key = StorageKey::from_bytes(key).unwrap();
            prop_assert_eq!(decode(&encode(&text, &key), &key).unwrap(), text);
        }
    }
}
