//! Provisioning-side sealing helpers.
//!
//! The library itself only decrypts; these helpers are the encrypt-side
//! inverse used to build test documents: AES-GCM sealing with fresh
//! nonces, password-derived keys, and RSA-OAEP key wrapping.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::EncodePrivateKey;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use pagevault_core::{sha256, HexBytes, SymmetricAlgorithm, IV_LEN, KEY_LEN, TAG_LEN};

/// Generate a fresh random AES-256 key.
pub fn random_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    key
}

/// Seal a plaintext under the given key with a fresh nonce.
///
/// Returns the algorithm descriptor (carrying nonce and detached tag) and
/// the ciphertext, the same split the protected documents use.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> (SymmetricAlgorithm, HexBytes) {
    let cipher = Aes256Gcm::new_from_slice(key).expect("key length is KEY_LEN");
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);
    let mut sealed = cipher.encrypt(nonce, plaintext).expect("aes-gcm encrypt");
    let tag = sealed.split_off(sealed.len() - TAG_LEN);
    (
        SymmetricAlgorithm::aes_gcm(iv.to_vec(), tag),
        HexBytes::new(sealed),
    )
}

/// Seal a plaintext under a password-derived key.
pub fn seal_with_password(password: &str, plaintext: &[u8]) -> (SymmetricAlgorithm, HexBytes) {
    seal(&sha256(password.as_bytes()), plaintext)
}

/// Wrap a symmetric key to an RSA public key with OAEP-SHA256.
pub fn wrap_key_rsa(public: &RsaPublicKey, key: &[u8; KEY_LEN]) -> HexBytes {
    let mut rng = rand::thread_rng();
    let wrapped = public
        .encrypt(&mut rng, Oaep::new::<Sha256>(), key)
        .expect("rsa-oaep wrap");
    HexBytes::new(wrapped)
}

/// Generate a fresh 2048-bit RSA keypair, returning the private key as a
/// PKCS#8 PEM string along with the public half.
pub fn generate_rsa_keypair() -> (String, RsaPublicKey) {
    let mut rng = rand::thread_rng();
    let private = RsaPrivateKey::new(&mut rng, 2048).expect("rsa keygen");
    let public = private.to_public_key();
    let pem = private
        .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
        .expect("pkcs8 encode")
        .to_string();
    (pem, public)
}
