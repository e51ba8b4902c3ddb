//! Password-based string encryption.
//!
//! AES-256 in ECB mode with PKCS#7 padding, keyed by a single SHA-256 pass
//! over the password, with standard base64 as the text encoding.
//!
//! There is no salt and no IV: the same password and plaintext always give
//! the same ciphertext. That makes a ciphertext reproducible from memory,
//! and it also means equal plaintexts are visible as equal ciphertexts and
//! the password is only as strong as its own entropy.

use std::fmt;

use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use sha2::{Digest, Sha256};

type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// 256-bit key material derived from a password.
pub struct SecretKey([u8; 32]);

impl SecretKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Reasons a ciphertext could not be turned back into a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecryptionError {
    #[error("ciphertext is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("ciphertext is {0} bytes, expected a non-zero multiple of 16")]
    InvalidLength(usize),

    #[error("wrong key or corrupted ciphertext")]
    BadPadding,

    #[error("decrypted bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// SHA-256 of the password's UTF-8 bytes.
pub fn derive_key(password: &str) -> SecretKey {
    SecretKey(Sha256::digest(password.as_bytes()).into())
}

/// Encrypts `plaintext` under `password` and returns base64 text.
pub fn encrypt(plaintext: &str, password: &str) -> String {
    let key = derive_key(password);
    let ciphertext = Aes256EcbEnc::new(&key.0.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    STANDARD.encode(ciphertext)
}

/// Reverses [`encrypt`]. Surrounding whitespace in the input is ignored.
pub fn decrypt(ciphertext_b64: &str, password: &str) -> Result<String, DecryptionError> {
    let ciphertext = STANDARD.decode(ciphertext_b64.trim())?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(DecryptionError::InvalidLength(ciphertext.len()));
    }

    let key = derive_key(password);
    let plaintext = Aes256EcbDec::new(&key.0.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| DecryptionError::BadPadding)?;

    String::from_utf8(plaintext).map_err(|_| DecryptionError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_derive_key_is_sha256() {
        assert_eq!(
            hex::encode(derive_key("password").as_bytes()),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_known_vectors() {
        // Cross-checked with `openssl enc -aes-256-ecb`
        assert_eq!(encrypt("hello world", "password"), "2B22cS3UC5s35WBihLBo8w==");
        assert_eq!(encrypt("", "password"), "e9h/RSWbmWxY1BjDV4YsXw==");
    }

    #[test]
    fn test_decrypt_known_vector() {
        assert_eq!(
            decrypt("2B22cS3UC5s35WBihLBo8w==", "password").unwrap(),
            "hello world"
        );
        assert_eq!(decrypt("  2B22cS3UC5s35WBihLBo8w==\n", "password").unwrap(), "hello world");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(encrypt("same", "key"), encrypt("same", "key"));
        assert_ne!(encrypt("same", "key"), encrypt("same", "other key"));
    }

    #[test]
    fn test_private_key_round_trip() {
        let private_key = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        let encrypted = encrypt(private_key, "correct horse battery staple");
        // 64 bytes of plaintext pad to 80 bytes of ciphertext
        assert_eq!(STANDARD.decode(&encrypted).unwrap().len(), 80);
        assert_eq!(
            decrypt(&encrypted, "correct horse battery staple").unwrap(),
            private_key
        );
    }

    #[test]
    fn test_unicode_round_trip() {
        let text = "Привет мир! 你好世界!";
        assert_eq!(decrypt(&encrypt(text, "ключ"), "ключ").unwrap(), text);
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            decrypt("not base64!", "key"),
            Err(DecryptionError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_invalid_length() {
        // 5 bytes
        assert_eq!(
            decrypt("aGVsbG8=", "key"),
            Err(DecryptionError::InvalidLength(5))
        );
        assert_eq!(decrypt("", "key"), Err(DecryptionError::InvalidLength(0)));
    }

    #[test]
    fn test_wrong_key() {
        let encrypted = encrypt("Secret message", "correct_password");
        match decrypt(&encrypted, "wrong_password") {
            Ok(plaintext) => assert_ne!(plaintext, "Secret message"),
            Err(e) => assert!(matches!(
                e,
                DecryptionError::BadPadding | DecryptionError::InvalidUtf8
            )),
        }
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        assert_eq!(format!("{:?}", derive_key("hunter2")), "SecretKey(..)");
    }

    proptest! {
        #[test]
        fn round_trip(plaintext in ".*", password in ".*") {
            let encrypted = encrypt(&plaintext, &password);
            prop_assert_eq!(decrypt(&encrypted, &password).unwrap(), plaintext);
        }

        #[test]
        fn wrong_password_never_reveals_plaintext(plaintext in ".+", password in ".*", other in ".*") {
            prop_assume!(password != other);
            let encrypted = encrypt(&plaintext, &password);
            if let Ok(recovered) = decrypt(&encrypted, &other) {
                prop_assert_ne!(recovered, plaintext);
            }
        }
    }
}
