//! Shared authentication context for the outbound request channel.
//!
//! There is exactly one current token and one unauthorized handler per
//! client. Call sites never hold their own copies; the latest values are
//! read at request time.

use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::warn;

/// Async callback fired when the backend answers 401.
pub type UnauthorizedHandler = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Mutable request state owned by the API client: the current bearer token
/// plus the 401 recovery callback.
///
/// Last writer wins on both fields. Requests already in flight keep
/// whatever token they attached when they were sent.
#[derive(Default)]
pub struct AuthContext {
    token: RwLock<Option<String>>,
    unauthorized: RwLock<Option<UnauthorizedHandler>>,
}

impl AuthContext {
    /// Replace the bearer token used for subsequent requests.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    /// Current bearer token, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Replace the unauthorized-response handler.
    pub async fn set_unauthorized_handler(&self, handler: Option<UnauthorizedHandler>) {
        *self.unauthorized.write().await = handler;
    }

    /// Invoke the registered handler, if any.
    ///
    /// A handler failure is logged and goes no further; it never bubbles
    /// into the request that triggered it.
    pub(crate) async fn notify_unauthorized(&self) {
        let handler = self.unauthorized.read().await.clone();
        if let Some(handler) = handler {
            if let Err(e) = handler().await {
                warn!(error = %e, "Unauthorized handler failed");
            }
        }
    }
}
