//! Common test utilities and helpers
//!
//! This module provides shared utilities for the integration tests:
//! - A wiremock-backed remote service with a wired-up client
//! - JSON payload builders matching the service's wire format
//! - Custom assertion macros
#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

pub use fixtures::*;
