use anyhow::Result;
use tracing::info;

use crate::constants::pin;
use crate::db::{Store, User};

/// API-key validation and the email+PIN rotation workflow.
///
/// PINs are canonical strings end to end: generated as a 6-digit decimal
/// string, stored as text, compared byte for byte.
#[derive(Clone)]
pub struct CredentialService {
    store: Store,
}

impl CredentialService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolve an API key to its user. `None` means no record matches.
    pub async fn authenticate(&self, api_key: &str) -> Result<Option<User>> {
        self.store.verify_api_key(api_key).await
    }

    /// Issue a one-time PIN for the account matching `email`, overwriting
    /// any prior code. Returns false when no record matches.
    pub async fn request_pin(&self, email: &str) -> Result<bool> {
        let code = generate_pin();

        if !self.store.set_user_pin(email, &code).await? {
            return Ok(false);
        }

        // The code itself stays out of the log sink.
        info!(email = %email, "One-time PIN issued (value redacted)");

        Ok(true)
    }

    /// Exchange a valid email+PIN pair for a fresh API key. The stored PIN
    /// is cleared in the same update. `None` covers every failure the
    /// caller must treat as forbidden: unknown email, no pending PIN, or a
    /// mismatched code. A mismatch leaves the record untouched.
    pub async fn redeem_pin(&self, email: &str, pin: &str) -> Result<Option<String>> {
        let Some((user, stored_pin)) = self.store.get_user_by_email_with_pin(email).await? else {
            return Ok(None);
        };

        let Some(stored_pin) = stored_pin else {
            return Ok(None);
        };

        if stored_pin != pin {
            return Ok(None);
        }

        let new_api_key = generate_api_key();
        self.store
            .rotate_user_api_key(user.id, &new_api_key)
            .await?;

        info!(username = %user.username, "API key rotated via PIN redemption");

        Ok(Some(new_api_key))
    }
}

/// Generate a uniformly random 6-digit PIN in [100000, 999999]
#[must_use]
pub fn generate_pin() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    rng.random_range(pin::MIN..=pin::MAX).to_string()
}

/// Generate a fresh 128-bit random API key (UUID v4 string)
#[must_use]
pub fn generate_api_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_is_six_digits_in_range() {
        for _ in 0..1000 {
            let code = generate_pin();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((pin::MIN..=pin::MAX).contains(&value));
        }
    }

    #[test]
    fn test_api_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_api_key()));
        }
    }
}
