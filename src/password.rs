//! Password hashing for account credentials.
//!
//! Stored form: `pbkdf2:<iterations>:<hex_salt>:<hex_hash>` using
//! PBKDF2-HMAC-SHA256. Verification re-derives with the parameters embedded
//! in the stored string, so the iteration count can change without
//! invalidating existing credentials.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::RngCore;
use sha2::Sha256;

const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password.as_bytes(), &salt, ITERATIONS)?;
    Ok(format!(
        "pbkdf2:{}:{}:{}",
        ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    ))
}

/// Verify a plaintext password against a stored hash string.
///
/// Any parse failure of the stored form verifies false; callers get one
/// uniform signal for bad credentials.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split(':');
    let (scheme, iterations, salt_hex, hash_hex) = match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some(scheme), Some(iter), Some(salt), Some(hash), None) => (scheme, iter, salt, hash),
        _ => return false,
    };
    if scheme != "pbkdf2" {
        return false;
    }
    let iterations: u32 = match iterations.parse() {
        Ok(n) if n > 0 => n,
        _ => return false,
    };
    let salt = match hex::decode(salt_hex) {
        Ok(s) => s,
        Err(_) => return false,
    };
    let expected = match hex::decode(hash_hex) {
        Ok(h) => h,
        Err(_) => return false,
    };
    let derived = match derive(password.as_bytes(), &salt, iterations) {
        Ok(d) => d,
        Err(_) => return false,
    };
    constant_time_eq(&derived, &expected)
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> Result<[u8; HASH_LEN], String> {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut out).map_err(|e| e.to_string())?;
    Ok(out)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for i in 0..a.len() {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let stored = hash_password("hunter2").unwrap();
        assert!(stored.starts_with("pbkdf2:"));
        assert_eq!(stored.split(':').count(), 4);
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_salts_are_unique() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a));
        assert!(verify_password("same-password", &b));
    }

    #[test]
    fn test_malformed_stored_hash_verifies_false() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "pbkdf2:100000:deadbeef"));
        assert!(!verify_password("x", "bcrypt:10:aa:bb"));
        assert!(!verify_password("x", "pbkdf2:0:aa:bb"));
        assert!(!verify_password("x", "pbkdf2:100000:zz:bb"));
        assert!(!verify_password("x", "pbkdf2:100000:aa:bb:cc"));
    }

    #[test]
    fn test_tampered_hash_verifies_false() {
        let stored = hash_password("secret").unwrap();
        let mut tampered = stored.clone();
        // Flip the last hex digit of the hash.
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_password("secret", &tampered));
    }
}
