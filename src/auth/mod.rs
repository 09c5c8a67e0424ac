//! Session and credential management.
//!
//! This module provides:
//! - `SessionManager`: the in-memory session lifecycle (bootstrap,
//!   sign-in, sign-out, profile updates), wired into the API client's
//!   401 recovery
//! - `CredentialStore`: durable token/profile/role persistence over
//!   pluggable secret backends
//! - token normalization for the heterogeneous login payload shapes

pub mod credentials;
pub mod error;
pub mod session;
pub mod token;

pub use credentials::{
    CredentialStore, FileBackend, KeyringBackend, MemoryBackend, SecretBackend, StoredCredentials,
};
pub use error::AuthError;
pub use session::{Session, SessionManager};
pub use token::{extract_token, normalize_token, normalize_token_str};
