//! Password and PIN hashing
//!
//! Stored format: `s256$<salt hex>$<sha256(salt || secret) hex>`.
//! Bare 64-char lowercase hex digests (unsalted SHA-256) are still accepted
//! for coordinator accounts imported from the previous system.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "s256";
const SALT_LEN: usize = 16;

fn digest(salt: &[u8], secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a password or PIN with a fresh random salt.
pub fn hash_secret(secret: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}${}", SCHEME, hex::encode(salt), digest(&salt, secret))
}

/// Check `secret` against a stored hash in either supported format.
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(salt_hex), Some(expected)) => match hex::decode(salt_hex) {
            Ok(salt) => constant_time_eq(digest(&salt, secret).as_bytes(), expected.as_bytes()),
            Err(_) => false,
        },
        (Some(legacy), None, None) if is_legacy_digest(legacy) => {
            constant_time_eq(digest(&[], secret).as_bytes(), legacy.as_bytes())
        }
        _ => false,
    }
}

fn is_legacy_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salted_hash_round_trip() {
        let stored = hash_secret("4821");
        assert!(stored.starts_with("s256$"));
        assert!(verify_secret("4821", &stored));
        assert!(!verify_secret("4822", &stored));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_secret("same"), hash_secret("same"));
    }

    #[test]
    fn legacy_unsalted_digest() {
        // sha256("password")
        let legacy = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert!(verify_secret("password", legacy));
        assert!(!verify_secret("Password", legacy));
        assert!(!verify_secret("password", &legacy.to_uppercase()));
    }

    #[test]
    fn garbage_never_verifies() {
        assert!(!verify_secret("x", ""));
        assert!(!verify_secret("x", "s256$zz$00"));
        assert!(!verify_secret("x", "bcrypt$abc$def"));
    }
}
