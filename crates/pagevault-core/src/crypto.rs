//! Cryptographic primitive provider.
//!
//! Decrypt-only by design: this library recovers plaintext that was sealed
//! at provisioning time, it never produces ciphertext. All operations take
//! an explicit algorithm descriptor and reject unknown names before
//! touching any primitive.

use std::fmt;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rsa::pkcs8::DecodePrivateKey;
use rsa::Oaep;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, Result};
use crate::types::HexBytes;

/// The only supported symmetric algorithm name.
pub const AES_GCM: &str = "AES-GCM";

/// The only supported asymmetric algorithm name.
pub const RSA_OAEP: &str = "RSA-OAEP";

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// GCM nonce length in bytes.
pub const IV_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Symmetric algorithm descriptor as carried in the protected documents.
///
/// The tag travels here rather than appended to the ciphertext, so the
/// ciphertext field of a record is exactly the encrypted payload length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetricAlgorithm {
    /// Algorithm name, `AES-GCM` for every current document.
    pub name: String,
    /// Nonce, 12 bytes.
    pub iv: HexBytes,
    /// Authentication tag, 16 bytes.
    pub tag: HexBytes,
}

impl SymmetricAlgorithm {
    /// Build an AES-GCM descriptor from raw nonce and tag bytes.
    pub fn aes_gcm(iv: impl Into<HexBytes>, tag: impl Into<HexBytes>) -> Self {
        Self {
            name: AES_GCM.to_string(),
            iv: iv.into(),
            tag: tag.into(),
        }
    }
}

/// Asymmetric algorithm descriptor for certificate credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsymmetricAlgorithm {
    /// Algorithm name, `RSA-OAEP` for every current document.
    pub name: String,
}

fn ensure_symmetric_algo(name: &str) -> Result<()> {
    if name == AES_GCM {
        Ok(())
    } else {
        Err(CryptoError::UnsupportedAlgorithm(name.to_string()))
    }
}

fn ensure_asymmetric_algo(name: &str) -> Result<()> {
    if name == RSA_OAEP {
        Ok(())
    } else {
        Err(CryptoError::UnsupportedAlgorithm(name.to_string()))
    }
}

/// An imported AES-256 key.
///
/// `Debug` never prints the key bytes.
#[derive(Clone)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Import raw key bytes for the named algorithm.
    pub fn import(bytes: &[u8], algorithm: &str) -> Result<Self> {
        ensure_symmetric_algo(algorithm)?;
        let key: [u8; KEY_LEN] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_LEN,
                    got: bytes.len(),
                })?;
        Ok(Self(key))
    }

    /// Derive a key from a password: the key is the SHA-256 digest of the
    /// password bytes.
    pub fn derive_from_password(password: &str, algorithm: &str) -> Result<Self> {
        ensure_symmetric_algo(algorithm)?;
        Ok(Self(sha256(password.as_bytes())))
    }

    /// Decrypt a detached-tag AES-GCM ciphertext.
    pub fn decrypt(&self, algorithm: &SymmetricAlgorithm, ciphertext: &[u8]) -> Result<Vec<u8>> {
        ensure_symmetric_algo(&algorithm.name)?;
        if algorithm.iv.len() != IV_LEN {
            return Err(CryptoError::InvalidIv {
                expected: IV_LEN,
                got: algorithm.iv.len(),
            });
        }
        if algorithm.tag.len() != TAG_LEN {
            return Err(CryptoError::InvalidTag {
                expected: TAG_LEN,
                got: algorithm.tag.len(),
            });
        }

        let cipher =
            Aes256Gcm::new_from_slice(&self.0).map_err(|_| CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                got: self.0.len(),
            })?;
        let nonce = Nonce::from_slice(algorithm.iv.as_slice());

        // aes-gcm expects ciphertext || tag in one buffer.
        let mut buf = Vec::with_capacity(ciphertext.len() + TAG_LEN);
        buf.extend_from_slice(ciphertext);
        buf.extend_from_slice(algorithm.tag.as_slice());

        cipher
            .decrypt(nonce, buf.as_slice())
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(redacted)")
    }
}

/// An imported RSA private key for certificate login.
///
/// `Debug` never prints the key.
#[derive(Clone)]
pub struct PrivateKey(Box<rsa::RsaPrivateKey>);

impl PrivateKey {
    /// Import a PKCS#8 PEM private key for the named algorithm.
    pub fn from_pkcs8_pem(pem: &str, algorithm: &str) -> Result<Self> {
        ensure_asymmetric_algo(algorithm)?;
        let key = rsa::RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|err| CryptoError::InvalidPem(err.to_string()))?;
        Ok(Self(Box::new(key)))
    }

    /// Unwrap an RSA-OAEP-SHA256 wrapped key, returning the raw key bytes.
    pub fn unwrap_key(&self, wrapped: &[u8]) -> Result<Vec<u8>> {
        self.0
            .decrypt(Oaep::new::<Sha256>(), wrapped)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(redacted)")
    }
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 digest of `data` as a lowercase hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;
    use rand::RngCore;

    use super::*;

    /// Encrypt helper for tests only: the library itself never encrypts.
    fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> (SymmetricAlgorithm, Vec<u8>) {
        let cipher = Aes256Gcm::new_from_slice(key).unwrap();
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        let nonce = Nonce::from_slice(&iv);
        let mut sealed = cipher.encrypt(nonce, plaintext).unwrap();
        let tag = sealed.split_off(sealed.len() - TAG_LEN);
        (SymmetricAlgorithm::aes_gcm(iv.to_vec(), tag), sealed)
    }

    #[test]
    fn test_decrypt_roundtrip() {
        let key_bytes = [7u8; KEY_LEN];
        let (algo, ciphertext) = seal(&key_bytes, b"fragment body");
        let key = SymmetricKey::import(&key_bytes, AES_GCM).unwrap();
        let plain = key.decrypt(&algo, &ciphertext).unwrap();
        assert_eq!(plain, b"fragment body");
    }

    #[test]
    fn test_decrypt_rejects_tampered_ciphertext() {
        let key_bytes = [7u8; KEY_LEN];
        let (algo, mut ciphertext) = seal(&key_bytes, b"fragment body");
        ciphertext[0] ^= 0x01;
        let key = SymmetricKey::import(&key_bytes, AES_GCM).unwrap();
        assert!(matches!(
            key.decrypt(&algo, &ciphertext),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_decrypt_rejects_wrong_key() {
        let (algo, ciphertext) = seal(&[7u8; KEY_LEN], b"fragment body");
        let key = SymmetricKey::import(&[8u8; KEY_LEN], AES_GCM).unwrap();
        assert!(matches!(
            key.decrypt(&algo, &ciphertext),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_import_rejects_unknown_algorithm() {
        assert!(matches!(
            SymmetricKey::import(&[0u8; KEY_LEN], "AES-CBC"),
            Err(CryptoError::UnsupportedAlgorithm(name)) if name == "AES-CBC"
        ));
    }

    #[test]
    fn test_import_rejects_bad_key_length() {
        assert!(matches!(
            SymmetricKey::import(&[0u8; 16], AES_GCM),
            Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                got: 16
            })
        ));
    }

    #[test]
    fn test_decrypt_rejects_bad_iv_length() {
        let key = SymmetricKey::import(&[0u8; KEY_LEN], AES_GCM).unwrap();
        let algo = SymmetricAlgorithm::aes_gcm(vec![0u8; 8], vec![0u8; TAG_LEN]);
        assert!(matches!(
            key.decrypt(&algo, b""),
            Err(CryptoError::InvalidIv {
                expected: IV_LEN,
                got: 8
            })
        ));
    }

    #[test]
    fn test_password_derivation_is_sha256() {
        let key = SymmetricKey::derive_from_password("hunter2", AES_GCM).unwrap();
        assert_eq!(key.0, sha256(b"hunter2"));
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_rsa_unwrap_roundtrip() {
        let mut rng = rand::thread_rng();
        let private = rsa::RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public = private.to_public_key();
        let key_bytes = [9u8; KEY_LEN];
        let wrapped = public
            .encrypt(&mut rng, Oaep::new::<Sha256>(), &key_bytes)
            .unwrap();

        let key = PrivateKey(Box::new(private));
        assert_eq!(key.unwrap_key(&wrapped).unwrap(), key_bytes.to_vec());
    }

    #[test]
    fn test_pem_import_rejects_garbage() {
        assert!(matches!(
            PrivateKey::from_pkcs8_pem("not a pem", RSA_OAEP),
            Err(CryptoError::InvalidPem(_))
        ));
    }
}
