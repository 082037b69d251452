//! One-time credential generation for provisioned accounts.
//!
//! Secrets are sampled from the OS random source over a fixed 72-symbol
//! alphabet. At 16 symbols that is just over 98 bits of entropy, comfortably
//! above the 70-bit floor the account provisioner requires.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::seq::SliceRandom;
use rand::Rng;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const PUNCTUATION: &[u8] = b"!@#$%&*-_+?";

/// Union of the four symbol classes above, in order.
pub const CREDENTIAL_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%&*-_+?";

/// Default secret length. Requests below [`MIN_CREDENTIAL_LENGTH`] are
/// clamped up, never down.
pub const CREDENTIAL_LENGTH: usize = 16;
pub const MIN_CREDENTIAL_LENGTH: usize = 12;

/// Handed to the operator together with a freshly onboarded lease.
pub const CREDENTIAL_DISCLAIMER: &str = "Share this temporary credential with the tenant over a \
     secure channel. It is displayed only once and cannot be recovered afterwards.";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to hash credential: {0}")]
    Hash(String),
    #[error("stored credential hash is malformed: {0}")]
    Malformed(String),
}

/// A freshly generated one-time secret. The plaintext lives only inside this
/// value; `Debug` output is redacted so it cannot leak through logs.
#[derive(Clone)]
pub struct TemporaryCredential {
    secret: String,
}

impl TemporaryCredential {
    pub fn generate() -> Self {
        Self::with_length(CREDENTIAL_LENGTH)
    }

    /// Generate a secret of `length` symbols (clamped to the minimum) with at
    /// least one symbol from each character class.
    pub fn with_length(length: usize) -> Self {
        let length = length.max(MIN_CREDENTIAL_LENGTH);
        let mut rng = OsRng;

        let mut symbols: Vec<u8> = Vec::with_capacity(length);
        for class in [UPPER, LOWER, DIGITS, PUNCTUATION] {
            symbols.push(class[rng.gen_range(0..class.len())]);
        }
        while symbols.len() < length {
            symbols.push(CREDENTIAL_ALPHABET[rng.gen_range(0..CREDENTIAL_ALPHABET.len())]);
        }
        symbols.shuffle(&mut rng);

        Self {
            secret: symbols.iter().map(|byte| *byte as char).collect(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Consume the credential, yielding the plaintext for its single
    /// operator-facing disclosure.
    pub fn into_secret(self) -> String {
        self.secret
    }

    /// Argon2id hash suitable for account storage. Salt is generated per
    /// hash from the OS random source.
    pub fn hash(&self) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(self.secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }
}

impl fmt::Debug for TemporaryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TemporaryCredential(<redacted>)")
    }
}

/// Verify a plaintext secret against a stored Argon2id hash. `Ok(false)` on
/// mismatch, `Err` only when the stored hash cannot be parsed.
pub fn verify_credential(secret: &str, hash: &str) -> Result<bool, CredentialError> {
    let parsed =
        argon2::PasswordHash::new(hash).map_err(|err| CredentialError::Malformed(err.to_string()))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(CredentialError::Malformed(err.to_string())),
    }
}
