//! HTTP gateway to the handbook backend.
//!
//! One shared `ApiClient` carries every outbound call: the current bearer
//! token is attached at send time and 401 responses are routed through
//! the registered unauthorized handler. `api::auth` wraps the login
//! endpoint and its drifting response shapes.

pub mod auth;
pub mod client;
pub mod context;
pub mod error;

pub use auth::{google_login, AuthPayload, SignInCredentials};
pub use client::ApiClient;
pub use context::{AuthContext, UnauthorizedHandler};
pub use error::ApiError;
