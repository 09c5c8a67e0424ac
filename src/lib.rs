//! Core library for the campus handbook app.
//!
//! Owns the client-side session lifecycle and the authenticated request
//! pipeline. UI shells consume the [`Session`] snapshot and route every
//! backend call through the shared [`ApiClient`]:
//!
//! - `auth`: session state machine, credential persistence, token
//!   normalization
//! - `api`: shared HTTP client with bearer auth and 401 recovery, plus
//!   the login endpoint adapter
//! - `models`: user profile and role definitions
//! - `config`: API endpoint configuration
//!
//! The wiring is deliberate: `SessionManager` registers its own sign-out
//! as the client's unauthorized handler, so an expired token anywhere in
//! the app resets the session in memory and in durable storage.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthContext};
pub use auth::{AuthError, CredentialStore, Session, SessionManager};
pub use config::Config;
pub use models::UserProfile;
