//! # Favorites Synchronizer
//!
//! Membership queries and optimistic toggles on the cached favorite-id set.
//!
//! A mutation is applied to the cached profile and persisted before the
//! remote call is issued, so `is_favorite` reflects it immediately. When the
//! server answers with the updated user record, that record replaces the
//! cache. When the remote call fails the local mutation stays in place,
//! unless rollback is enabled, in which case the inverse is applied before
//! the error is returned.
//!
//! Toggles on the same id are not serialized against each other: the
//! response that completes last decides what the cache ends up holding.

use crate::client::api::{ApiClient, Confirmation};
use crate::shared::{ApiError, FavoriteIds, MovieSummary};
use std::fmt;
use std::sync::Arc;

/// Which way a toggle went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

impl fmt::Display for ToggleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleOutcome::Added => write!(f, "Added to favorite list"),
            ToggleOutcome::Removed => write!(f, "Removed from favorite list"),
        }
    }
}

/// Favorite-set owner for the signed-in user
#[derive(Debug)]
pub struct FavoritesSync {
    api: Arc<ApiClient>,
    rollback_on_failure: bool,
}

impl FavoritesSync {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            rollback_on_failure: false,
        }
    }

    /// Undo the optimistic mutation when the remote call fails.
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback_on_failure = enabled;
        self
    }

    /// Cached membership. No I/O beyond reading the local store.
    pub fn is_favorite(&self, movie_id: &str) -> bool {
        self.api
            .session()
            .get_profile()
            .is_some_and(|profile| profile.favorite_movie_ids.contains(movie_id))
    }

    pub fn favorite_ids(&self) -> FavoriteIds {
        self.api
            .session()
            .get_profile()
            .map(|profile| profile.favorite_movie_ids)
            .unwrap_or_default()
    }

    pub async fn toggle_favorite(&self, movie_id: &str) -> Result<ToggleOutcome, ApiError> {
        if self.is_favorite(movie_id) {
            self.remove_favorite(movie_id).await?;
            Ok(ToggleOutcome::Removed)
        } else {
            self.add_favorite(movie_id).await?;
            Ok(ToggleOutcome::Added)
        }
    }

    pub async fn add_favorite(&self, movie_id: &str) -> Result<(), ApiError> {
        if movie_id.trim().is_empty() {
            tracing::warn!("[FAVORITES] Refusing to add an empty movie id");
            return Err(ApiError::precondition("movie id must not be empty"));
        }
        self.require_session()?;

        let inserted = self
            .api
            .session()
            .modify_profile(|profile| profile.favorite_movie_ids.insert(movie_id))?
            .ok_or_else(ApiError::not_authenticated)?;
        tracing::debug!("[FAVORITES] Optimistically added {}", movie_id);

        match self.api.add_favorite(movie_id).await {
            Ok(confirmation) => self.reconcile(confirmation),
            Err(e) => {
                tracing::warn!("[FAVORITES] Remote add of {} failed: {}", movie_id, e);
                if self.rollback_on_failure && inserted {
                    match self
                        .api
                        .session()
                        .modify_profile(|profile| profile.favorite_movie_ids.remove(movie_id))
                    {
                        Ok(_) => tracing::debug!("[FAVORITES] Rolled back add of {}", movie_id),
                        Err(store_err) => {
                            tracing::warn!("[FAVORITES] Rollback of add {} failed: {}", movie_id, store_err)
                        }
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn remove_favorite(&self, movie_id: &str) -> Result<(), ApiError> {
        if movie_id.trim().is_empty() {
            return Err(ApiError::precondition("movie id must not be empty"));
        }
        self.require_session()?;

        let removed = self
            .api
            .session()
            .modify_profile(|profile| profile.favorite_movie_ids.remove(movie_id))?
            .ok_or_else(ApiError::not_authenticated)?;
        tracing::debug!("[FAVORITES] Optimistically removed {}", movie_id);

        match self.api.remove_favorite(movie_id).await {
            Ok(confirmation) => self.reconcile(confirmation),
            Err(e) => {
                tracing::warn!("[FAVORITES] Remote remove of {} failed: {}", movie_id, e);
                if self.rollback_on_failure && removed {
                    match self
                        .api
                        .session()
                        .modify_profile(|profile| profile.favorite_movie_ids.insert(movie_id))
                    {
                        Ok(_) => tracing::debug!("[FAVORITES] Rolled back remove of {}", movie_id),
                        Err(store_err) => {
                            tracing::warn!("[FAVORITES] Rollback of remove {} failed: {}", movie_id, store_err)
                        }
                    }
                }
                Err(e)
            }
        }
    }

    /// Entries of the last catalog snapshot that are favorites, in catalog order.
    pub fn favorite_movies(&self) -> Vec<MovieSummary> {
        let Some(catalog) = self.api.catalog_snapshot() else {
            return Vec::new();
        };
        let favorites = self.favorite_ids();
        catalog
            .iter()
            .filter(|movie| favorites.contains(&movie.id))
            .cloned()
            .collect()
    }

    /// Replace the cached favorites with the server's copy.
    pub async fn refresh(&self) -> Result<FavoriteIds, ApiError> {
        let ids = self.api.fetch_favorite_ids().await?;
        tracing::debug!("[FAVORITES] Refreshed {} favorites from server", ids.len());
        Ok(ids)
    }

    fn require_session(&self) -> Result<(), ApiError> {
        if self.api.session().is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::not_authenticated())
        }
    }

    /// The server's echoed record wins over the optimistic cache.
    fn reconcile(&self, confirmation: Confirmation) -> Result<(), ApiError> {
        let Confirmation::Profile(profile) = confirmation else {
            return Ok(());
        };
        if !self.api.session().replace_profile_for(&profile, &profile)? {
            tracing::debug!("[FAVORITES] Echoed profile of {} no longer matches the session", profile.username);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::SessionStore;
    use crate::client::store::{LocalStore, MemoryStore};
    use crate::shared::{ErrorKind, UserProfile};
    use reqwest::{Client, Url};

    fn sync_with_favorites(ids: &[&str]) -> FavoritesSync {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        let mut profile = UserProfile::new("ana");
        for id in ids {
            profile.favorite_movie_ids.insert(*id);
        }
        session.set_session("tok", &profile).unwrap();

        // Port 9 (discard) refuses connections, so remote calls fail fast.
        let api = ApiClient::with_client(Url::parse("http://127.0.0.1:9/").unwrap(), Client::new(), session);
        FavoritesSync::new(Arc::new(api))
    }

    #[test]
    fn test_is_favorite_reads_cache() {
        let sync = sync_with_favorites(&["m1"]);
        assert!(sync.is_favorite("m1"));
        assert!(!sync.is_favorite("m2"));
    }

    #[test]
    fn test_favorite_movies_without_snapshot_is_empty() {
        let sync = sync_with_favorites(&["m1"]);
        assert!(sync.favorite_movies().is_empty());
    }

    #[test]
    fn test_toggle_outcome_messages() {
        assert_eq!(ToggleOutcome::Added.to_string(), "Added to favorite list");
        assert_eq!(ToggleOutcome::Removed.to_string(), "Removed from favorite list");
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected_without_mutation() {
        let sync = sync_with_favorites(&["m1"]);
        let err = sync.add_favorite("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(sync.favorite_ids().as_slice(), ["m1"]);
    }

    #[tokio::test]
    async fn test_failed_add_keeps_optimistic_update() {
        let sync = sync_with_favorites(&["m1"]);
        let err = sync.add_favorite("m2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(sync.is_favorite("m2"));
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back_when_enabled() {
        let sync = sync_with_favorites(&["m1"]).with_rollback(true);
        assert!(sync.add_favorite("m2").await.is_err());
        assert!(!sync.is_favorite("m2"));
        assert!(sync.is_favorite("m1"));
    }

    #[tokio::test]
    async fn test_failed_remove_rolls_back_when_enabled() {
        let sync = sync_with_favorites(&["m1"]).with_rollback(true);
        assert!(sync.remove_favorite("m1").await.is_err());
        assert!(sync.is_favorite("m1"));
    }

    #[tokio::test]
    async fn test_unauthenticated_toggle_is_precondition() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        let api = ApiClient::with_client(Url::parse("http://127.0.0.1:9/").unwrap(), Client::new(), session);
        let sync = FavoritesSync::new(Arc::new(api));

        let err = sync.toggle_favorite("m1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    /// Memory store that refuses writes once `writes_left` runs out.
    struct ExhaustibleStore {
        inner: MemoryStore,
        writes_left: std::sync::atomic::AtomicUsize,
    }

    impl LocalStore for ExhaustibleStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set_entries(&self, entries: &[(&str, &str)]) -> Result<(), crate::shared::StoreError> {
            use std::sync::atomic::Ordering;
            if self
                .writes_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
            {
                return Err(crate::shared::StoreError::Io {
                    message: "disk full".to_string(),
                });
            }
            self.inner.set_entries(entries)
        }

        fn remove_entries(&self, keys: &[&str]) -> Result<(), crate::shared::StoreError> {
            self.inner.remove_entries(keys)
        }
    }

    #[tokio::test]
    async fn test_failed_rollback_still_returns_remote_error() {
        // One write for the session, one for the optimistic add, none for the rollback.
        let store = Arc::new(ExhaustibleStore {
            inner: MemoryStore::new(),
            writes_left: std::sync::atomic::AtomicUsize::new(2),
        });
        let session = Arc::new(SessionStore::new(store));
        session.set_session("tok", &UserProfile::new("ana")).unwrap();
        let api = ApiClient::with_client(Url::parse("http://127.0.0.1:9/").unwrap(), Client::new(), session);
        let sync = FavoritesSync::new(Arc::new(api)).with_rollback(true);

        let err = sync.add_favorite("m2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(sync.is_favorite("m2"));
    }
}
