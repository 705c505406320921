//! Password hashing for the credential pair carried by history lines.
//!
//! Always Argon2id with a random salt, stored in PHC string format
//! (`$argon2id$v=19$...`). There is no fallback scheme.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, TechServError, ValidationError};

/// Salt length in bytes, before base64 encoding.
const SALT_LEN: usize = 16;

/// An Argon2id hash in PHC string format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPassword`] for an empty password and
    /// [`CredentialError::Hashing`] if Argon2 fails.
    pub fn hash(password: &str) -> Result<Self, TechServError> {
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(CredentialError::from)?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(CredentialError::from)?;
        Ok(Self(hash.to_string()))
    }

    /// Wrap a digest read back from storage.
    #[must_use]
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// The PHC string, suitable for storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `password` matches this digest.
    ///
    /// A wrong password yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Hashing`] when the stored digest cannot be
    /// parsed.
    pub fn verify(&self, password: &str) -> Result<bool, TechServError> {
        let parsed = PasswordHash::new(&self.0).map_err(CredentialError::from)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialError::from(err).into()),
        }
    }
}
