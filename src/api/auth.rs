//! Login endpoint adapter.
//!
//! The backend's login response shape drifted across prototypes, so the
//! raw body is kept as JSON and the token, profile, and roles are probed
//! out of it. Callers end up with a uniform triple to hand to
//! `SessionManager::sign_in`.

use serde_json::Value;
use tracing::warn;

use crate::auth::{extract_token, AuthError};
use crate::models::UserProfile;

use super::{ApiClient, ApiError};

/// Exchange a Google ID token for a backend session.
pub async fn google_login(
    client: &ApiClient,
    id_token: &str,
    preferred_language: Option<&str>,
) -> Result<AuthPayload, ApiError> {
    let body = serde_json::json!({
        "idToken": id_token,
        "preferredLanguage": preferred_language,
    });
    let body: Value = client.post("/api/Auth/google-login", &body).await?;
    Ok(AuthPayload::new(body))
}

/// Raw login response body.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    body: Value,
}

/// Credentials extracted from a login response, ready for sign-in.
#[derive(Debug, Clone)]
pub struct SignInCredentials {
    pub token: String,
    pub user: Option<UserProfile>,
    pub roles: Vec<String>,
}

impl AuthPayload {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// The response body as received.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Extract the sign-in triple, failing when no token can be found.
    ///
    /// The profile and roles may live at the top level or under `data`; a
    /// profile that does not deserialize is dropped (logged), roles
    /// default to empty.
    pub fn into_credentials(self) -> Result<SignInCredentials, AuthError> {
        let token = extract_token(&self.body).ok_or(AuthError::MissingToken)?;

        let user = lookup(&self.body, &["user"])
            .or_else(|| lookup(&self.body, &["data", "user"]))
            .and_then(|value| match serde_json::from_value(value.clone()) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Login response carried an unreadable user profile");
                    None
                }
            });

        let roles = lookup(&self.body, &["roles"])
            .or_else(|| lookup(&self.body, &["data", "roles"]))
            .map(string_list)
            .unwrap_or_default();

        Ok(SignInCredentials { token, user, roles })
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cursor = value;
    for segment in path {
        cursor = cursor.get(segment)?;
    }
    Some(cursor)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_flat_payloads() {
        let payload = AuthPayload::new(json!({
            "token": "tok-1",
            "user": { "id": "u-1", "name": "An", "email": "an@example.edu" },
            "roles": ["Student"]
        }));

        let creds = payload.into_credentials().expect("credentials");
        assert_eq!(creds.token, "tok-1");
        assert_eq!(creds.user.as_ref().map(|u| u.id.as_str()), Some("u-1"));
        assert_eq!(creds.roles, vec!["Student".to_string()]);
    }

    #[test]
    fn extracts_data_wrapped_payloads() {
        let payload = AuthPayload::new(json!({
            "data": {
                "token": { "accessToken": "wrapped" },
                "user": { "id": "u-2", "name": "Binh", "email": "binh@example.edu" },
                "roles": ["Mentor", "Student"]
            }
        }));

        let creds = payload.into_credentials().expect("credentials");
        assert_eq!(creds.token, "wrapped");
        assert_eq!(creds.user.as_ref().map(|u| u.name.as_str()), Some("Binh"));
        assert_eq!(creds.roles.len(), 2);
    }

    #[test]
    fn missing_token_is_an_error() {
        let payload = AuthPayload::new(json!({
            "user": { "id": "u-3", "name": "Chi", "email": "chi@example.edu" }
        }));
        assert!(matches!(
            payload.into_credentials(),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn unreadable_profile_and_roles_degrade() {
        let payload = AuthPayload::new(json!({
            "token": "tok-2",
            "user": "not an object",
            "roles": "not a list"
        }));

        let creds = payload.into_credentials().expect("credentials");
        assert_eq!(creds.user, None);
        assert!(creds.roles.is_empty());
    }
}
