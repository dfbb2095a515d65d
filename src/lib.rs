//! myflix-sync - Session & Favorites Synchronization Layer
//!
//! Client-resident data access for the myFlix catalog service: signs a user
//! in, caches the session locally, fetches catalog records and keeps the
//! user's favorites set in sync with the backend.
//!
//! # Module Structure
//!
//! - **`shared`** - Plain data exchanged with the service and persisted locally
//!   - Credentials, user profile, favorite ids, catalog records
//!   - Error taxonomy
//!   - Validated configuration
//!
//! - **`client`** - The stateful layer
//!   - Local key-value store (file or in-memory)
//!   - Session store (token + cached profile)
//!   - API gateway (one async method per remote resource)
//!   - Favorites synchronizer (optimistic toggles)
//!
//! # Usage
//!
//! ```rust,no_run
//! use myflix_sync::client::{config, MyflixClient};
//! use myflix_sync::shared::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MyflixClient::from_config(&config::from_env()?);
//! client.api.login(&Credentials::new("ana", "secret")).await?;
//! client.api.list_catalog().await?;
//!
//! if !client.favorites.is_favorite("m1") {
//!     client.favorites.toggle_favorite("m1").await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! `ApiClient`, `SessionStore` and `FavoritesSync` are `Send + Sync` and are
//! shared by `Arc`. Read-modify-write cycles on the cached profile are
//! serialized inside `SessionStore`; independent remote calls complete in any order.
//!
//! # Error Handling
//!
//! Every fallible operation returns `Result<T, shared::ApiError>`. Malformed
//! local data is treated as absent rather than raised.

/// Shared types and data structures
pub mod shared;

/// Session, gateway and favorites
pub mod client;
