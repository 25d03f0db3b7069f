// Password handling: secret wrapper and Argon2id hashing

use crate::core::errors::CredentialError;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

/// Plaintext used only to derive the timing-equalisation hash
const DUMMY_PASSWORD: &str = "notes-service-dummy-password";

/// Plaintext password with memory protection
///
/// Uses `secrecy::Secret` so the value never shows up in logs or debug output.
pub struct Password(SecretString);

impl Password {
    pub fn new(password: &str) -> Self {
        Self(SecretString::new(password.to_string()))
    }

    /// Expose the plaintext (use with caution)
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose_secret().is_empty()
    }

    fn duplicate(&self) -> Self {
        Self::new(self.expose_secret())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("value", &"<REDACTED>")
            .finish()
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<REDACTED>")
    }
}

/// Argon2id hasher producing salted PHC strings
///
/// Hashing is deliberately expensive. The async entry points move the work onto
/// the blocking pool so request workers keep serving other connections.
///
/// The timing-equalisation hash is derived once at construction, so the first
/// unknown-user login costs the same as every later one.
pub struct CredentialHasher {
    params: Params,
    dummy_hash: String,
}

impl CredentialHasher {
    /// Create a hasher with explicit Argon2 cost parameters
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| CredentialError::Hashing(format!("Invalid Argon2 parameters: {}", e)))?;
        let dummy_hash = Self::hash_with(&params, &Password::new(DUMMY_PASSWORD))?;
        Ok(Self { params, dummy_hash })
    }

    fn argon2_with(params: &Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
    }

    fn hash_with(params: &Params, password: &Password) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Self::argon2_with(params)
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Hash a password with a fresh random salt
    pub fn hash_sync(&self, password: &Password) -> Result<String, CredentialError> {
        Self::hash_with(&self.params, password)
    }

    /// Check a password against a stored PHC string
    ///
    /// The digest comparison inside `password-hash` is constant-time.
    /// Returns `Ok(false)` on mismatch and `Err` only for a malformed stored hash.
    pub fn verify_sync(&self, stored_hash: &str, password: &Password) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| CredentialError::Hashing(format!("Invalid stored hash: {}", e)))?;

        match Self::argon2_with(&self.params).verify_password(password.expose_secret().as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Hashing(e.to_string())),
        }
    }

    pub async fn hash(self: &Arc<Self>, password: &Password) -> Result<String, CredentialError> {
        let hasher = Arc::clone(self);
        let password = password.duplicate();
        tokio::task::spawn_blocking(move || hasher.hash_sync(&password))
            .await
            .map_err(|e| CredentialError::Hashing(format!("Hashing task failed: {}", e)))?
    }

    pub async fn verify(
        self: &Arc<Self>,
        stored_hash: &str,
        password: &Password,
    ) -> Result<bool, CredentialError> {
        let hasher = Arc::clone(self);
        let stored_hash = stored_hash.to_string();
        let password = password.duplicate();
        tokio::task::spawn_blocking(move || hasher.verify_sync(&stored_hash, &password))
            .await
            .map_err(|e| CredentialError::Hashing(format!("Verification task failed: {}", e)))?
    }

    /// Burn one verification for a username that does not exist
    ///
    /// Keeps login latency independent of whether the user is registered.
    pub async fn verify_unknown_user(self: &Arc<Self>, password: &Password) {
        let hasher = Arc::clone(self);
        let password = password.duplicate();
        let _ =
            tokio::task::spawn_blocking(move || hasher.verify_sync(&hasher.dummy_hash, &password))
                .await;
    }
}
