//! PBKDF2-HMAC-SHA256 credential records, encoded as
//! `pbkdf2_sha256$<iterations>$<salt_hex>$<key_hex>` so verification is
//! self-describing and iteration bumps don't break stored hashes.

use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const ALGORITHM: &str = "pbkdf2_sha256";
const ITERATIONS: u32 = 150_000;
const SALT_BYTES: usize = 16;
const KEY_BYTES: usize = 32;

pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);

    let mut key = [0u8; KEY_BYTES];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt_hex.as_bytes(), ITERATIONS, &mut key);

    format!("{ALGORITHM}${ITERATIONS}${salt_hex}${}", hex::encode(key))
}

/// Constant-time verification. Malformed records fail verification
/// instead of erroring.
pub fn verify(record: &str, candidate: &str) -> bool {
    let mut parts = record.split('$');
    let (Some(algorithm), Some(iterations), Some(salt_hex), Some(key_hex), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if algorithm != ALGORITHM {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(stored_key) = hex::decode(key_hex) else {
        return false;
    };
    if stored_key.len() != KEY_BYTES {
        return false;
    }

    let mut derived = [0u8; KEY_BYTES];
    pbkdf2_hmac::<Sha256>(candidate.as_bytes(), salt_hex.as_bytes(), iterations, &mut derived);

    derived.ct_eq(stored_key.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_correct_password() {
        let record = hash("s3cret!");
        assert!(record.starts_with("pbkdf2_sha256$150000$"));
        assert!(verify(&record, "s3cret!"));
    }

    #[test]
    fn rejects_wrong_password() {
        let record = hash("s3cret!");
        assert!(!verify(&record, "wrong"));
    }

    #[test]
    fn salts_make_records_unique() {
        assert_ne!(hash("same"), hash("same"));
    }

    #[test]
    fn malformed_records_fail_closed() {
        assert!(!verify("", "anything"));
        assert!(!verify("pbkdf2_sha256$notanumber$ab$cd", "anything"));
        assert!(!verify("md5$1$ab$cd", "anything"));
        assert!(!verify("pbkdf2_sha256$150000$ab$zz-not-hex", "anything"));
        assert!(!verify("pbkdf2_sha256$150000$ab$cd$extra", "anything"));
    }
}
