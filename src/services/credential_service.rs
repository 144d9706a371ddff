use std::sync::Arc;
use thiserror::Error;
use tokio::task;
use tracing::{debug, info};

use crate::auth::password::{PasswordError, PasswordHashing};
use crate::database::models::{NewUser, User};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("username or email already registered")]
    DuplicateIdentity,

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

impl From<DatabaseError> for CredentialError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(_) => CredentialError::DuplicateIdentity,
            other => CredentialError::Database(other),
        }
    }
}

/// Owns password handling for user records: registration, credential checks
/// and admin promotion. Argon2 work runs on the blocking pool.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn Store>,
    hashing: PasswordHashing,
}

impl CredentialService {
    pub fn new(store: Arc<dyn Store>, hashing: PasswordHashing) -> Self {
        Self { store, hashing }
    }

    /// Create a user with a freshly salted hash. Uniqueness is left to the
    /// store so concurrent registrations resolve to exactly one winner.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CredentialError> {
        let hashing = self.hashing.clone();
        let plaintext = password.to_string();
        let password = task::spawn_blocking(move || hashing.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Hash(e.to_string()))??;
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password,
            })
            .await?;

        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// `None` for an unknown identifier and for a wrong password alike
    pub async fn verify(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<User>, CredentialError> {
        let Some(user) = self.store.find_user_by_identifier(identifier).await? else {
            debug!("No user matches identifier {}", identifier);
            return Ok(None);
        };

        let hashing = self.hashing.clone();
        let plaintext = password.to_string();
        let stored = user.password.clone();
        let matches = task::spawn_blocking(move || hashing.verify(&plaintext, &stored))
            .await
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        if matches {
            Ok(Some(user))
        } else {
            debug!("Password mismatch for user {}", user.username);
            Ok(None)
        }
    }

    pub async fn promote(&self, username: &str) -> Result<Option<User>, CredentialError> {
        let user = self.store.set_admin(username, true).await?;
        if let Some(user) = &user {
            info!("Promoted {} to admin", user.username);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn service() -> CredentialService {
        CredentialService::new(
            Arc::new(MemoryStore::new()),
            PasswordHashing::new(1, 8).unwrap(),
        )
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let service = service();
        let user = service
            .register("justatest", "test@test.com", "greaterthaneight")
            .await
            .unwrap();
        assert_ne!(user.password, "greaterthaneight");
        assert!(!user.is_admin);
        assert!(user.active);
    }

    #[tokio::test]
    async fn duplicate_registration_fails_either_order() {
        let service = service();
        service.register("one", "same@test.com", "pw").await.unwrap();
        let err = service.register("two", "same@test.com", "pw").await.unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateIdentity));
        let err = service.register("one", "other@test.com", "pw").await.unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn verify_by_username_or_email() {
        let service = service();
        service.register("tyler", "tyler@test.com", "secret").await.unwrap();

        assert!(service.verify("tyler", "secret").await.unwrap().is_some());
        assert!(service.verify("tyler@test.com", "secret").await.unwrap().is_some());
        assert!(service.verify("tyler", "wrong").await.unwrap().is_none());
        assert!(service.verify("nobody", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn promote_sets_admin_flag() {
        let service = service();
        service.register("meghan", "meghan@test.com", "secret").await.unwrap();
        let promoted = service.promote("meghan").await.unwrap().unwrap();
        assert!(promoted.is_admin);
        assert!(service.promote("ghost").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_leaves_the_runtime_free() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let service = CredentialService::new(
            Arc::new(MemoryStore::new()),
            PasswordHashing::new(2, 16 * 1024).unwrap(),
        );
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        service.register("tyler", "tyler@test.com", "secret").await.unwrap();
        assert!(service.verify("tyler", "secret").await.unwrap().is_some());
        ticker.abort();

        // On a single-threaded runtime the ticker only advances if hashing yielded
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }
}
