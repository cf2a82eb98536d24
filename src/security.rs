//! Password hashing.
//!
//! Bcrypt ignores everything past 72 bytes of input, so both hashing and
//! verification truncate to that limit first (dropping any partial trailing
//! UTF-8 sequence) to keep the two sides consistent.

use anyhow::{Context, Result};
use tokio::task;

/// Bcrypt input limit in bytes.
const BCRYPT_MAX_BYTES: usize = 72;

fn truncate_password(password: &str) -> &str {
    if password.len() <= BCRYPT_MAX_BYTES {
        return password;
    }
    let mut end = BCRYPT_MAX_BYTES;
    while !password.is_char_boundary(end) {
        end -= 1;
    }
    &password[..end]
}

/// Hash a password with a random salt at the default work factor.
///
/// Runs on the blocking pool: bcrypt is CPU-intensive and would stall the
/// async runtime if run inline.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = truncate_password(password).to_string();

    task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .context("Password hashing task panicked")?
        .context("Failed to hash password")
}

/// Verify a plaintext password against a stored digest.
///
/// Malformed digests verify as `false` rather than surfacing an error.
pub async fn verify_password(plain: &str, digest: &str) -> bool {
    let plain = truncate_password(plain).to_string();
    let digest = digest.to_string();

    task::spawn_blocking(move || bcrypt::verify(&plain, &digest).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let digest = hash_password("secret123").await.unwrap();
        assert!(verify_password("secret123", &digest).await);
        assert!(!verify_password("wrong", &digest).await);
    }

    #[tokio::test]
    async fn verify_rejects_malformed_digest() {
        assert!(!verify_password("secret123", "not-a-bcrypt-digest").await);
    }

    #[tokio::test]
    async fn input_beyond_72_bytes_is_ignored() {
        let long = "a".repeat(80);
        let digest = hash_password(&long).await.unwrap();

        // Differs only after byte 72: indistinguishable from the stored form.
        let mut other = "a".repeat(72);
        other.push_str("bbbbbbbb");
        assert!(verify_password(&other, &digest).await);
        assert!(verify_password(&"a".repeat(72), &digest).await);

        // A difference within the first 72 bytes still fails.
        assert!(!verify_password(&"a".repeat(71), &digest).await);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 24 x 3-byte chars = 72 bytes, then one more pushes past the limit.
        let s = "\u{20AC}".repeat(25); // € is 3 bytes
        let t = truncate_password(&s);
        assert!(t.len() <= 72);
        assert_eq!(t, "\u{20AC}".repeat(24));

        // 4-byte char straddling the boundary is dropped entirely.
        let mut s = "a".repeat(70);
        s.push('\u{1F600}');
        assert_eq!(truncate_password(&s), "a".repeat(70));
    }
}
