//! Mock remote service and a client wired to it
//!
//! Every `TestContext` owns its own wiremock server and an in-memory local
//! store, so tests never touch the network or the user's data directory.

use myflix_sync::client::{LocalStore, MemoryStore, MyflixClient};
use myflix_sync::shared::{AppConfig, UserProfile};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub client: MyflixClient,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_rollback(false).await
    }

    pub async fn with_rollback(rollback: bool) -> Self {
        let server = MockServer::start().await;
        let config = AppConfig::builder()
            .api_url(server.uri())
            .store_path("/nonexistent/session.json")
            .rollback_on_failure(rollback)
            .build()
            .expect("mock server URI is a valid config");
        let store = Arc::new(MemoryStore::new());
        let client = MyflixClient::with_store(&config, store.clone());
        Self { server, store, client }
    }

    /// Context with `ana` signed in and the given favorites cached.
    pub async fn signed_in(favorites: &[&str]) -> Self {
        let ctx = Self::new().await;
        ctx.seed_user(json!({ "Username": "ana", "FavoriteMovies": favorites }));
        ctx
    }

    /// Write raw `token` and `user` entries, bypassing the session store.
    pub fn seed_user(&self, user: Value) {
        self.store
            .set_entries(&[("token", TOKEN), ("user", user.to_string().as_str())])
            .expect("memory store writes cannot fail");
    }

    pub fn cached_profile(&self) -> Option<UserProfile> {
        self.client.session().get_profile()
    }

    pub fn cached_favorites(&self) -> Vec<String> {
        self.client.favorites.favorite_ids().as_slice().to_vec()
    }

    /// Raw persisted `user` entry, decoded as JSON.
    pub fn stored_user(&self) -> Option<Value> {
        self.store
            .get("user")
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }
}

pub fn user_json(username: &str, favorites: &[&str]) -> Value {
    json!({
        "_id": format!("id-{}", username),
        "Username": username,
        "Password": "$2b$10$not-a-real-hash",
        "Email": format!("{}@example.com", username),
        "Birthday": "1990-04-12T00:00:00.000Z",
        "FavoriteMovies": favorites
    })
}

pub fn movie_json(id: &str, title: &str, genre: &str, director: &str) -> Value {
    json!({
        "_id": id,
        "Title": title,
        "Description": format!("About {}", title),
        "Genre": { "Name": genre, "Description": format!("{} films", genre) },
        "Director": { "Name": director, "Bio": format!("{} bio", director) },
        "ImagePath": format!("{}.png", id),
        "Featured": false
    })
}
