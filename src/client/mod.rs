//! Client Module
//!
//! The stateful half of the crate: the local store, the session store, the
//! API gateway and the favorites synchronizer.
//!
//! # Architecture
//!
//! - **`config`** - environment-driven configuration
//! - **`store`** - client-local key-value persistence
//! - **`session`** - token and cached profile
//! - **`api`** - one async method per remote resource, error normalization
//! - **`favorites`** - optimistic favorite toggles against the cached profile
//!
//! Everything above `store` depends on `SessionStore`, never on the raw
//! store, so tests can substitute a `MemoryStore`.
//!
//! # Example
//!
//! ```rust,no_run
//! use myflix_sync::client::MyflixClient;
//! use myflix_sync::shared::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MyflixClient::from_config(&myflix_sync::client::config::from_env()?);
//! client.api.login(&Credentials::new("ana", "secret")).await?;
//! client.api.list_catalog().await?;
//! client.favorites.toggle_favorite("m1").await?;
//! let favorites = client.favorites.favorite_movies();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod store;
pub mod session;
pub mod api;
pub mod favorites;

use crate::shared::AppConfig;
use std::sync::Arc;

// Re-export commonly used types
pub use api::{ApiClient, Confirmation};
pub use favorites::{FavoritesSync, ToggleOutcome};
pub use session::SessionStore;
pub use store::{FileStore, LocalStore, MemoryStore};

/// Wired-up gateway and favorites synchronizer sharing one session.
#[derive(Debug, Clone)]
pub struct MyflixClient {
    pub api: Arc<ApiClient>,
    pub favorites: Arc<FavoritesSync>,
}

impl MyflixClient {
    /// Build on a `FileStore` at `config.store_path`.
    pub fn from_config(config: &AppConfig) -> Self {
        let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(&config.store_path));
        Self::with_store(config, store)
    }

    pub fn with_store(config: &AppConfig, store: Arc<dyn LocalStore>) -> Self {
        let session = Arc::new(SessionStore::new(store));
        let api = Arc::new(ApiClient::new(config, session));
        let favorites = Arc::new(FavoritesSync::new(api.clone()).with_rollback(config.rollback_on_failure));
        Self { api, favorites }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.api.session()
    }
}
