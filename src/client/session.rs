//! Session Store
//!
//! Owns the authentication token and the cached user profile. Both live in
//! the local store under the `token` and `user` keys and are written and
//! cleared together. Unreadable stored data is treated as absent.

use crate::client::store::LocalStore;
use crate::shared::{StoreError, UserProfile};
use std::sync::{Arc, Mutex, PoisonError};

/// Key of the raw session token
pub const TOKEN_KEY: &str = "token";
/// Key of the JSON-serialized user profile
pub const USER_KEY: &str = "user";

/// Token and cached profile of the signed-in user
pub struct SessionStore {
    store: Arc<dyn LocalStore>,
    /// Serializes read-modify-write cycles on the profile
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Persist token and profile in one write.
    pub fn set_session(&self, token: &str, profile: &UserProfile) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(profile)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.set_entries(&[(TOKEN_KEY, token), (USER_KEY, encoded.as_str())])?;
        tracing::info!("[SESSION] Session stored for {}", profile.username);
        Ok(())
    }

    pub fn get_token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn get_profile(&self) -> Option<UserProfile> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) if profile.is_well_formed() => Some(profile),
            Ok(_) => {
                tracing::warn!("[SESSION] Cached profile has no username, treating as absent");
                None
            }
            Err(e) => {
                tracing::warn!("[SESSION] Cached profile is unreadable, treating as absent: {}", e);
                None
            }
        }
    }

    /// Replace the cached profile, leaving the token untouched.
    pub fn update_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(profile)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.set_entries(&[(USER_KEY, encoded.as_str())])
    }

    /// Read-modify-write on the cached profile.
    ///
    /// Returns `Ok(None)` without writing when no readable profile is cached.
    /// Otherwise returns what `f` returned.
    pub fn modify_profile<R>(&self, f: impl FnOnce(&mut UserProfile) -> R) -> Result<Option<R>, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(mut profile) = self.get_profile() else {
            return Ok(None);
        };
        let result = f(&mut profile);
        let encoded = serde_json::to_string(&profile)?;
        self.store.set_entries(&[(USER_KEY, encoded.as_str())])?;
        Ok(Some(result))
    }

    /// Replace the cached profile with `profile` only while `owner` is still
    /// signed in.
    ///
    /// Skips the write and returns `Ok(false)` when the token is gone or the
    /// cached profile belongs to someone else.
    pub fn replace_profile_for(&self, owner: &UserProfile, profile: &UserProfile) -> Result<bool, StoreError> {
        let encoded = serde_json::to_string(profile)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let signed_in = self.get_token().is_some()
            && self.get_profile().is_some_and(|cached| same_user(&cached, owner));
        if !signed_in {
            tracing::debug!("[SESSION] Session for {} ended, discarding profile update", owner.username);
            return Ok(false);
        }
        self.store.set_entries(&[(USER_KEY, encoded.as_str())])?;
        Ok(true)
    }

    /// Remove token and profile. Idempotent.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove_entries(&[TOKEN_KEY, USER_KEY])?;
        tracing::info!("[SESSION] Session cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some() && self.get_profile().is_some()
    }

    /// Token and profile together, or `None` if either is missing.
    pub fn current(&self) -> Option<(String, UserProfile)> {
        Some((self.get_token()?, self.get_profile()?))
    }
}

/// Same account: by id when both carry one, by username otherwise.
fn same_user(a: &UserProfile, b: &UserProfile) -> bool {
    if !a.id.is_empty() && !b.id.is_empty() {
        a.id == b.id
    } else {
        a.username == b.username
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::store::MemoryStore;

    fn profile() -> UserProfile {
        let mut profile = UserProfile::new("ana");
        profile.id = "u1".to_string();
        profile.email = "ana@example.com".to_string();
        profile.favorite_movie_ids.insert("m1");
        profile
    }

    #[test]
    fn test_set_and_get_session() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(!session.is_authenticated());

        session.set_session("tok", &profile()).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.get_token().as_deref(), Some("tok"));
        assert_eq!(session.get_profile(), Some(profile()));
    }

    #[test]
    fn test_clear_session_is_idempotent() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.set_session("tok", &profile()).unwrap();

        session.clear_session().unwrap();
        session.clear_session().unwrap();
        assert!(session.get_token().is_none());
        assert!(session.get_profile().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_update_profile_keeps_token() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.set_session("tok", &profile()).unwrap();

        let mut updated = profile();
        updated.email = "new@x.com".to_string();
        session.update_profile(&updated).unwrap();

        assert_eq!(session.get_token().as_deref(), Some("tok"));
        assert_eq!(session.get_profile().unwrap().email, "new@x.com");
    }

    #[test]
    fn test_corrupt_profile_is_absent() {
        let store = MemoryStore::new()
            .with_entry(TOKEN_KEY, "tok")
            .with_entry(USER_KEY, "{ definitely not json");
        let session = SessionStore::new(Arc::new(store));

        assert!(session.get_profile().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_token_without_profile_is_not_authenticated() {
        let store = MemoryStore::new().with_entry(TOKEN_KEY, "tok");
        let session = SessionStore::new(Arc::new(store));
        assert!(!session.is_authenticated());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_modify_profile_without_profile_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionStore::new(store.clone());

        let result = session.modify_profile(|p| p.favorite_movie_ids.insert("m2")).unwrap();
        assert!(result.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_modify_profile_persists() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.set_session("tok", &profile()).unwrap();

        let inserted = session.modify_profile(|p| p.favorite_movie_ids.insert("m2")).unwrap();
        assert_eq!(inserted, Some(true));
        assert!(session.get_profile().unwrap().favorite_movie_ids.contains("m2"));
    }

    #[test]
    fn test_replace_profile_for_signed_in_owner() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.set_session("tok", &profile()).unwrap();

        let mut renamed = profile();
        renamed.username = "ana2".to_string();
        assert!(session.replace_profile_for(&profile(), &renamed).unwrap());
        assert_eq!(session.get_profile().unwrap().username, "ana2");
        assert_eq!(session.get_token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_replace_profile_for_after_clear_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionStore::new(store.clone());
        session.set_session("tok", &profile()).unwrap();
        session.clear_session().unwrap();

        assert!(!session.replace_profile_for(&profile(), &profile()).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_profile_for_other_user_writes_nothing() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let mut bob = UserProfile::new("bob");
        bob.id = "u2".to_string();
        session.set_session("bob-token", &bob).unwrap();

        assert!(!session.replace_profile_for(&profile(), &profile()).unwrap());
        assert_eq!(session.get_profile(), Some(bob));
        assert_eq!(session.get_token().as_deref(), Some("bob-token"));
    }
}
