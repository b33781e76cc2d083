// AES-256-GCM envelopes exchanged with the IoT gateway

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IOT_KEY_LEN;

pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Failed to parse JSON: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),

    #[error("Failed to decode {field}: {source}")]
    Base64 {
        field: &'static str,
        source: base64::DecodeError,
    },

    #[error("invalid IV length: {0}")]
    InvalidIvLength(usize),

    #[error("invalid tag length: {0}")]
    InvalidTagLength(usize),

    #[error("cipher: message authentication failed")]
    Authentication,

    #[error("cipher: encryption failed")]
    Encryption,
}

/// Wire format: `{"data": b64(ciphertext), "iv": b64(12 bytes), "tag": b64(16 bytes)}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub data: String,
    pub iv: String,
    pub tag: String,
}

/// Shared AES-256 key; never printed
#[derive(Clone)]
pub struct PayloadKey([u8; IOT_KEY_LEN]);

impl std::fmt::Debug for PayloadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PayloadKey(..)")
    }
}

impl PayloadKey {
    pub fn new(key: [u8; IOT_KEY_LEN]) -> Self {
        Self(key)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }

    /// Parse a JSON envelope from the gateway and decrypt it
    pub fn open(&self, body: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let envelope: Envelope = serde_json::from_slice(body)?;
        self.open_envelope(&envelope)
    }

    pub fn open_envelope(&self, envelope: &Envelope) -> Result<Vec<u8>, CryptoError> {
        let mut ciphertext = decode_field("data", &envelope.data)?;
        let iv = decode_field("IV", &envelope.iv)?;
        let tag = decode_field("tag", &envelope.tag)?;

        if iv.len() != IV_LEN {
            return Err(CryptoError::InvalidIvLength(iv.len()));
        }
        if tag.len() != TAG_LEN {
            return Err(CryptoError::InvalidTagLength(tag.len()));
        }

        // The gateway ships the tag separately; GCM wants it appended
        ciphertext.extend_from_slice(&tag);

        self.cipher()
            .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
            .map_err(|_| CryptoError::Authentication)
    }

    /// Encrypt under a fresh random IV
    pub fn seal(&self, plaintext: &[u8]) -> Result<Envelope, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&nonce);
        self.seal_with_iv(plaintext, iv)
    }

    pub fn seal_with_iv(&self, plaintext: &[u8], iv: [u8; IV_LEN]) -> Result<Envelope, CryptoError> {
        let mut sealed = self
            .cipher()
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|_| CryptoError::Encryption)?;

        let tag = sealed.split_off(sealed.len() - TAG_LEN);
        Ok(Envelope {
            data: BASE64.encode(&sealed),
            iv: BASE64.encode(iv),
            tag: BASE64.encode(tag),
        })
    }
}

/// Decrypt a raw gateway response body
pub fn decrypt_envelope(body: &[u8], key: &PayloadKey) -> Result<Vec<u8>, CryptoError> {
    key.open(body)
}

pub fn seal_envelope(
    plaintext: &[u8],
    key: &PayloadKey,
    iv: [u8; IV_LEN],
) -> Result<Envelope, CryptoError> {
    key.seal_with_iv(plaintext, iv)
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(value)
        .map_err(|source| CryptoError::Base64 { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PayloadKey {
        PayloadKey::new(*b"0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn seal_then_open() {
        let key = key();
        let envelope = key.seal(br#"{"temperature":31.5,"humidity":62}"#).unwrap();
        let body = serde_json::to_vec(&envelope).unwrap();

        let plaintext = key.open(&body).unwrap();
        assert_eq!(plaintext, br#"{"temperature":31.5,"humidity":62}"#);
    }

    #[test]
    fn opens_known_vector_shape() {
        let key = key();
        let envelope = key.seal_with_iv(b"fan:on", [7u8; IV_LEN]).unwrap();
        assert_eq!(BASE64.decode(&envelope.iv).unwrap(), vec![7u8; IV_LEN]);
        assert_eq!(BASE64.decode(&envelope.tag).unwrap().len(), TAG_LEN);
        assert_eq!(BASE64.decode(&envelope.data).unwrap().len(), b"fan:on".len());
        assert_eq!(key.open_envelope(&envelope).unwrap(), b"fan:on");
    }

    #[test]
    fn tampered_tag_fails_closed() {
        let key = key();
        let mut envelope = key.seal(b"belt:off").unwrap();
        let mut tag = BASE64.decode(&envelope.tag).unwrap();
        tag[0] ^= 0x01;
        envelope.tag = BASE64.encode(tag);

        assert!(matches!(key.open_envelope(&envelope), Err(CryptoError::Authentication)));
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let key = key();
        let mut envelope = key.seal(b"belt:off").unwrap();
        let mut data = BASE64.decode(&envelope.data).unwrap();
        data[0] ^= 0x80;
        envelope.data = BASE64.encode(data);

        assert!(matches!(key.open_envelope(&envelope), Err(CryptoError::Authentication)));
    }

    #[test]
    fn wrong_key_fails_closed() {
        let envelope = key().seal(b"bulb:on").unwrap();
        let other = PayloadKey::new([9u8; IOT_KEY_LEN]);
        assert!(matches!(other.open_envelope(&envelope), Err(CryptoError::Authentication)));
    }

    #[test]
    fn rejects_bad_iv_and_tag_lengths() {
        let key = key();
        let mut envelope = key.seal(b"water:on").unwrap();

        let good_iv = envelope.iv.clone();
        envelope.iv = BASE64.encode([0u8; 16]);
        assert!(matches!(key.open_envelope(&envelope), Err(CryptoError::InvalidIvLength(16))));

        envelope.iv = good_iv;
        envelope.tag = BASE64.encode([0u8; 12]);
        assert!(matches!(key.open_envelope(&envelope), Err(CryptoError::InvalidTagLength(12))));
    }

    #[test]
    fn rejects_malformed_input() {
        let key = key();
        assert!(matches!(key.open(b"not json"), Err(CryptoError::MalformedEnvelope(_))));

        let envelope = Envelope {
            data: "!!!".to_string(),
            iv: BASE64.encode([0u8; IV_LEN]),
            tag: BASE64.encode([0u8; TAG_LEN]),
        };
        assert!(matches!(
            key.open_envelope(&envelope),
            Err(CryptoError::Base64 { field: "data", .. })
        ));
    }

    #[test]
    fn free_functions_match_key_methods() {
        let key = key();
        let envelope = seal_envelope(b"feeder:on", &key, [1u8; IV_LEN]).unwrap();
        let body = serde_json::to_vec(&envelope).unwrap();
        assert_eq!(decrypt_envelope(&body, &key).unwrap(), b"feeder:on");
    }

    #[test]
    fn debug_does_not_print_key() {
        assert_eq!(format!("{:?}", key()), "PayloadKey(..)");
    }
}
