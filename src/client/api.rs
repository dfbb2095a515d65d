//! API Gateway Client
//!
//! One async method per remote resource of the catalog service. Every
//! authenticated call attaches `Authorization: Bearer <token>` from the
//! session store, and every failure is converted to [`ApiError`] before it
//! reaches the caller: no `reqwest::Error` escapes this module.
//!
//! # Status mapping
//!
//! - no response → `Network`
//! - 401 / 403 → `Auth`
//! - other 4xx with `{"errors": [...]}` → `Validation` with field errors
//! - other 4xx with a text body → `Validation` without field errors
//! - 5xx, empty 4xx and anything unrecognized → `Server`

use crate::client::session::SessionStore;
use crate::shared::error::GENERIC_FAILURE_MESSAGE;
use crate::shared::{
    ApiError, AppConfig, Credentials, FavoriteIds, FieldError, LoginResponse, MovieSummary, ProfileUpdate,
    Registration, UserProfile,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};

/// Server acknowledgement of a mutation that has no fixed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// The server echoed the updated user record
    Profile(UserProfile),
    /// Plain-text acknowledgement
    Message(String),
}

impl Confirmation {
    fn from_body(body: String) -> Self {
        match serde_json::from_str::<UserProfile>(&body) {
            Ok(profile) if profile.is_well_formed() => Confirmation::Profile(profile),
            _ => Confirmation::Message(body),
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Confirmation::Profile(profile) => Some(profile),
            Confirmation::Message(_) => None,
        }
    }
}

/// Gateway to the remote catalog service
pub struct ApiClient {
    base_url: Url,
    client: Client,
    session: Arc<SessionStore>,
    /// Result of the last successful `list_catalog`
    catalog: RwLock<Option<Arc<Vec<MovieSummary>>>>,
}

impl ApiClient {
    pub fn new(config: &AppConfig, session: Arc<SessionStore>) -> Self {
        Self::with_client(config.api_url.clone(), Client::new(), session)
    }

    pub fn with_client(base_url: Url, client: Client, session: Arc<SessionStore>) -> Self {
        Self {
            base_url,
            client,
            session,
            catalog: RwLock::new(None),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Register a new account. Does not sign in.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&["users"])?;
        let response = self
            .execute("register", self.client.post(url).json(registration))
            .await?;
        let profile: UserProfile = decode("register", response).await?;
        tracing::info!("[GATEWAY] Registered {}", profile.username);
        Ok(profile)
    }

    /// Sign in and persist the returned session.
    ///
    /// Credentials travel as query parameters. On any failure the session
    /// store is left untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(&["login"])?;
        let response = self
            .execute_with("login", self.client.post(url).query(credentials), normalize_login_error)
            .await?;
        let login: LoginResponse = decode("login", response).await?;

        if login.token.is_empty() || !login.user.is_well_formed() {
            tracing::warn!("[GATEWAY] Login response is missing a token or username");
            return Err(ApiError::server(GENERIC_FAILURE_MESSAGE));
        }

        self.session.set_session(&login.token, &login.user)?;
        tracing::info!("[GATEWAY] Logged in as {}", login.user.username);
        Ok(login)
    }

    /// Drop the local session. No network I/O.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear_session()?;
        Ok(())
    }

    /// Fetch the full catalog and keep it as the current snapshot.
    pub async fn list_catalog(&self) -> Result<Vec<MovieSummary>, ApiError> {
        let token = self.require_token()?;
        let url = self.endpoint(&["movies"])?;
        let response = self
            .execute("list_catalog", self.client.get(url).bearer_auth(token))
            .await?;
        let movies: Vec<MovieSummary> = decode("list_catalog", response).await?;

        tracing::debug!("[GATEWAY] Catalog snapshot holds {} entries", movies.len());
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(movies.clone()));
        Ok(movies)
    }

    /// Last catalog fetched by `list_catalog`, if any.
    pub fn catalog_snapshot(&self) -> Option<Arc<Vec<MovieSummary>>> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Look up a single catalog entry by title.
    pub async fn get_catalog_item(&self, title: &str) -> Result<MovieSummary, ApiError> {
        let token = self.require_token()?;
        let url = self.endpoint(&["movies", title])?;
        let response = self
            .execute("get_catalog_item", self.client.get(url).bearer_auth(token))
            .await?;
        decode("get_catalog_item", response).await
    }

    pub async fn get_by_director(&self, name: &str) -> Result<Vec<MovieSummary>, ApiError> {
        let token = self.require_token()?;
        let url = self.endpoint(&["movies", "director", name])?;
        let response = self
            .execute("get_by_director", self.client.get(url).bearer_auth(token))
            .await?;
        decode("get_by_director", response).await
    }

    pub async fn get_by_genre(&self, name: &str) -> Result<Vec<MovieSummary>, ApiError> {
        let token = self.require_token()?;
        let url = self.endpoint(&["movies", "genre", name])?;
        let response = self
            .execute("get_by_genre", self.client.get(url).bearer_auth(token))
            .await?;
        decode("get_by_genre", response).await
    }

    /// Read a user record. Refreshes the cached profile when it is the
    /// signed-in user's own record.
    pub async fn get_profile(&self, username: &str) -> Result<UserProfile, ApiError> {
        let token = self.require_token()?;
        let url = self.endpoint(&["users", username])?;
        let response = self
            .execute("get_profile", self.client.get(url).bearer_auth(token))
            .await?;
        let profile: UserProfile = decode("get_profile", response).await?;

        if self.session.replace_profile_for(&profile, &profile)? {
            tracing::debug!("[GATEWAY] Cached profile refreshed for {}", profile.username);
        }
        Ok(profile)
    }

    /// Edit the signed-in user's record and cache the server's result.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let (token, cached) = self.require_session()?;
        let url = self.endpoint(&["users", cached.username.as_str()])?;
        let response = self
            .execute("update_profile", self.client.put(url).bearer_auth(token).json(update))
            .await?;
        let profile: UserProfile = decode("update_profile", response).await?;

        if !self.session.replace_profile_for(&cached, &profile)? {
            tracing::warn!("[GATEWAY] Session changed during update of {}, cache left alone", cached.username);
        }
        tracing::info!("[GATEWAY] Profile updated for {}", profile.username);
        Ok(profile)
    }

    /// Delete the signed-in user's account and clear the session.
    pub async fn delete_account(&self) -> Result<String, ApiError> {
        let (token, cached) = self.require_session()?;
        let url = self.endpoint(&["users", cached.username.as_str()])?;
        let response = self
            .execute("delete_account", self.client.delete(url).bearer_auth(token))
            .await?;
        let message = read_text("delete_account", response).await?;

        self.session.clear_session()?;
        tracing::info!("[GATEWAY] Account {} deleted", cached.username);
        Ok(message)
    }

    /// Remote half of adding a favorite. Does not touch the cache.
    pub async fn add_favorite(&self, movie_id: &str) -> Result<Confirmation, ApiError> {
        require_movie_id(movie_id)?;
        let (token, cached) = self.require_session()?;
        let url = self.endpoint(&["users", cached.username.as_str(), "movies", movie_id])?;
        let response = self
            .execute("add_favorite", self.client.post(url).bearer_auth(token))
            .await?;
        Ok(Confirmation::from_body(read_text("add_favorite", response).await?))
    }

    /// Remote half of removing a favorite. Does not touch the cache.
    pub async fn remove_favorite(&self, movie_id: &str) -> Result<Confirmation, ApiError> {
        require_movie_id(movie_id)?;
        let (token, cached) = self.require_session()?;
        let url = self.endpoint(&["users", cached.username.as_str(), "movies", movie_id])?;
        let response = self
            .execute("remove_favorite", self.client.delete(url).bearer_auth(token))
            .await?;
        Ok(Confirmation::from_body(read_text("remove_favorite", response).await?))
    }

    /// Favorite ids as the server currently has them.
    pub async fn fetch_favorite_ids(&self) -> Result<FavoriteIds, ApiError> {
        let (_, cached) = self.require_session()?;
        let profile = self.get_profile(cached.username.as_str()).await?;
        Ok(profile.favorite_movie_ids)
    }

    fn require_token(&self) -> Result<String, ApiError> {
        self.session.get_token().ok_or_else(ApiError::not_authenticated)
    }

    fn require_session(&self) -> Result<(String, UserProfile), ApiError> {
        self.session.current().ok_or_else(ApiError::not_authenticated)
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::precondition(format!("API URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(&self, operation: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        self.execute_with(operation, request, normalize_error).await
    }

    /// `execute` with a custom mapping for non-success statuses.
    async fn execute_with(
        &self,
        operation: &str,
        request: RequestBuilder,
        on_failure: fn(StatusCode, &str) -> ApiError,
    ) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::warn!("[GATEWAY] {} transport failure: {}", operation, e);
            ApiError::network(format!("Unable to reach the server: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("[GATEWAY] {} -> {}", operation, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("[GATEWAY] {} failed with {}: {}", operation, status, body);
        Err(on_failure(status, &body))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish()
    }
}

fn require_movie_id(movie_id: &str) -> Result<(), ApiError> {
    if movie_id.trim().is_empty() {
        return Err(ApiError::precondition("movie id must not be empty"));
    }
    Ok(())
}

async fn read_text(operation: &str, response: Response) -> Result<String, ApiError> {
    response.text().await.map_err(|e| {
        tracing::warn!("[GATEWAY] {} body could not be read: {}", operation, e);
        ApiError::network(format!("Connection lost while reading the response: {}", e.without_url()))
    })
}

async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, ApiError> {
    let body = read_text(operation, response).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!("[GATEWAY] {} returned an unexpected payload: {}", operation, e);
        ApiError::server(GENERIC_FAILURE_MESSAGE)
    })
}

/// Map a non-success status and its body to the error taxonomy.
pub fn normalize_error(status: StatusCode, body: &str) -> ApiError {
    let json: Option<Value> = serde_json::from_str(body).ok();
    let server_message = json
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    match status.as_u16() {
        401 | 403 => {
            let message = server_message
                .or_else(|| plain_text(body))
                .unwrap_or_else(|| "Invalid credentials or session expired".to_string());
            ApiError::auth(message)
        }
        400..=499 => {
            if let Some(field_errors) = json.as_ref().and_then(parse_field_errors) {
                let message = server_message.unwrap_or_else(|| "Validation failed".to_string());
                return ApiError::validation(message, field_errors);
            }
            match server_message.or_else(|| plain_text(body)) {
                Some(message) => ApiError::validation(message, Vec::new()),
                None => ApiError::server(GENERIC_FAILURE_MESSAGE),
            }
        }
        _ => ApiError::server(GENERIC_FAILURE_MESSAGE),
    }
}

/// Login rejects bad credentials with `400 {"message": ..., "user": false}`.
fn normalize_login_error(status: StatusCode, body: &str) -> ApiError {
    match normalize_error(status, body) {
        ApiError::Validation { message, field_errors } if status == StatusCode::BAD_REQUEST && field_errors.is_empty() => {
            ApiError::auth(message)
        }
        other => other,
    }
}

/// `{"errors": [{"msg": "...", "param" | "path" | "field": "..."}]}`
fn parse_field_errors(body: &Value) -> Option<Vec<FieldError>> {
    let errors = body.get("errors")?.as_array()?;
    let parsed: Vec<FieldError> = errors
        .iter()
        .filter_map(|entry| {
            let message = entry
                .get("msg")
                .or_else(|| entry.get("message"))
                .and_then(Value::as_str)?;
            let field = ["param", "path", "field"]
                .iter()
                .find_map(|key| entry.get(*key).and_then(Value::as_str))
                .unwrap_or_default();
            Some(FieldError::new(field, message))
        })
        .collect();

    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// Non-empty, non-JSON response text.
fn plain_text(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('<') {
        return None;
    }
    Some(trimmed.to_string())
}
