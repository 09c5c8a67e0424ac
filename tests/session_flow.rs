//! End-to-end session flow against a mock backend: token attachment,
//! login payload handling, and the 401 -> forced sign-out loop.

use std::sync::Arc;

use serde_json::{json, Value};

use handbook_core::api::google_login;
use handbook_core::auth::{CredentialStore, MemoryBackend, SecretBackend};
use handbook_core::{ApiClient, ApiError, Config, SessionManager, UserProfile};

fn sample_user() -> UserProfile {
    UserProfile {
        id: "u-1".to_string(),
        name: "An Nguyen".to_string(),
        email: "an@example.edu".to_string(),
        student_id: Some("SE150001".to_string()),
        photo: None,
    }
}

async fn client_for(server: &mockito::ServerGuard) -> (ApiClient, Arc<MemoryBackend>, Arc<SessionManager>) {
    let config = Config {
        base_url: server.url(),
        timeout_ms: 5_000,
    };
    let client = ApiClient::new(&config).expect("client");
    let backend = Arc::new(MemoryBackend::default());
    let store = CredentialStore::new(Arc::clone(&backend) as Arc<dyn SecretBackend>);
    let manager = SessionManager::new(&client, store).await;
    manager.bootstrap().await;
    (client, backend, manager)
}

#[tokio::test]
async fn signed_in_requests_carry_the_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let (client, _, manager) = client_for(&server).await;

    manager
        .sign_in("tok-1", Some(sample_user()), vec!["Student".to_string()])
        .await
        .expect("sign in");

    let mock = server
        .mock("GET", "/api/Club")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let clubs: Value = client.get("/api/Club").await.expect("request");
    assert_eq!(clubs, json!([]));
    mock.assert_async().await;
}

#[tokio::test]
async fn signed_out_requests_are_unauthenticated() {
    let mut server = mockito::Server::new_async().await;
    let (client, _, _manager) = client_for(&server).await;

    let mock = server
        .mock("GET", "/api/ClubType/active")
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let _: Value = client.get("/api/ClubType/active").await.expect("request");
    mock.assert_async().await;
}

#[tokio::test]
async fn a_401_resets_the_whole_session() {
    let mut server = mockito::Server::new_async().await;
    let (client, backend, manager) = client_for(&server).await;

    manager
        .sign_in("abc", Some(sample_user()), vec!["Student".to_string()])
        .await
        .expect("sign in");
    assert!(backend
        .get("handbook.token")
        .await
        .expect("get token")
        .is_some());

    let _mock = server
        .mock("GET", "/api/Notification")
        .with_status(401)
        .with_body(r#"{"message":"token expired"}"#)
        .create_async()
        .await;

    let result: Result<Value, ApiError> = client.get("/api/Notification").await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));

    // The failed call still surfaced, and the handler tore the session down.
    let session = manager.current().await;
    assert!(!session.is_authenticated());
    assert_eq!(session.user, None);
    assert!(session.roles.is_empty());
    assert_eq!(client.auth().token().await, None);
    assert_eq!(backend.get("handbook.token").await.expect("get"), None);
    assert_eq!(backend.get("handbook.user").await.expect("get"), None);
    assert_eq!(backend.get("handbook.roles").await.expect("get"), None);
}

#[tokio::test]
async fn later_requests_after_a_401_go_out_unauthenticated() {
    let mut server = mockito::Server::new_async().await;
    let (client, _, manager) = client_for(&server).await;

    manager
        .sign_in("abc", None, vec![])
        .await
        .expect("sign in");

    let _unauthorized = server
        .mock("GET", "/api/Notification")
        .with_status(401)
        .create_async()
        .await;
    let _ = client.get::<Value>("/api/Notification").await;

    let follow_up = server
        .mock("GET", "/api/Club")
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let _: Value = client.get("/api/Club").await.expect("follow-up request");
    follow_up.assert_async().await;
}

#[tokio::test]
async fn google_login_feeds_sign_in() {
    let mut server = mockito::Server::new_async().await;
    let (client, _, manager) = client_for(&server).await;

    let _mock = server
        .mock("POST", "/api/Auth/google-login")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": {
                    "token": { "accessToken": "jwt-123" },
                    "user": {
                        "id": "u-7",
                        "name": "Chi Tran",
                        "email": "chi@example.edu",
                        "studentId": "SE150777"
                    },
                    "roles": ["Student", "Mentor"]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let payload = google_login(&client, "google-id-token", Some("en"))
        .await
        .expect("login request");
    let creds = payload.into_credentials().expect("credentials");

    manager
        .sign_in(creds.token, creds.user, creds.roles)
        .await
        .expect("sign in");

    let session = manager.current().await;
    assert!(session.is_authenticated());
    assert_eq!(session.token.as_deref(), Some("jwt-123"));
    assert_eq!(
        session.user.as_ref().map(|u| u.student_id.as_deref()),
        Some(Some("SE150777"))
    );
    assert!(session.is_student() && session.is_mentor());
    assert_eq!(client.auth().token().await.as_deref(), Some("jwt-123"));
}
