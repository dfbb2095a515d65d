//! Shared Module
//!
//! Types exchanged with the remote catalog service and persisted in the
//! client-local store. Everything here is plain data: no I/O, no state.
//!
//! # Overview
//!
//! The shared module provides the explicit schemas the gateway parses at its
//! boundary, so the stateful components never handle untyped payloads.

/// Error taxonomy
pub mod error;

/// Application configuration
pub mod config;

/// Credentials, profile and favorite-id types
pub mod user;

/// Catalog records and detail views
pub mod catalog;

/// Re-export commonly used types for convenience
pub use error::{ApiError, ErrorKind, FieldError, StoreError};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use user::{Credentials, FavoriteIds, LoginResponse, ProfileUpdate, Registration, UserProfile};
pub use catalog::{DetailView, Director, Genre, MovieSummary};
