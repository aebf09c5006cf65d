//! # Authentication Module
//!
//! Delegated Google credentials for the sync engine.
//!
//! ## Overview
//!
//! This module owns the lifecycle of the OAuth credential used to reach the
//! remote storage tree: the consent handshake, persistence of the resulting
//! tokens, and time-bounded refresh of the access token.
//!
//! ## Features
//!
//! - OAuth 2.0 authorization code flow with offline access
//! - SQLite-backed credential persistence
//! - Refresh-if-expired token resolution with a single exchange per call

pub mod credential_store;
pub mod error;
pub mod oauth;
pub mod refresher;
pub mod types;

pub use credential_store::{CredentialStore, SqliteCredentialStore};
pub use error::{AuthError, Result};
pub use oauth::{OAuthConfig, OAuthFlowManager};
pub use refresher::CredentialRefresher;
pub use types::{AccessToken, Credential, OAuthTokens, PrincipalId};
