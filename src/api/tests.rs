#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::models::TransactionStatus;

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri()).unwrap()
}

#[tokio::test]
async fn test_login_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth-service/auth/login"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_json(json!({ "username": "ana@example.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc.def.ghi" })))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let token = api.login("ana@example.com", "secret1").await.unwrap();
    assert_eq!(token, "abc.def.ghi");
}

#[tokio::test]
async fn test_login_without_token_field_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth-service/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": "ana" })))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    let err = api.login("ana@example.com", "secret1").await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[tokio::test]
async fn test_server_message_wins_over_status_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth-service/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid credentials" })),
        )
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    match api.login("ana@example.com", "wrong").await.unwrap_err() {
        ApiError::Server { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid credentials");
        }
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_falls_back_to_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transaction-service/transaction"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    api.set_token(Some("t".into()));
    match api.list_transactions().await.unwrap_err() {
        ApiError::Server { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_is_flagged_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transaction-service/transaction"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    api.set_token(Some("stale".into()));
    let err = api.list_transactions().await.unwrap_err();
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_list_unwraps_content_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transaction-service/transaction"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{
                "id": "t1",
                "title": "Salary",
                "description": "Monthly",
                "amount": 5000,
                "type": "INCOME",
                "status": "pending",
                "dueDate": "2024-01-31",
                "createdAt": "2024-01-02"
            }]
        })))
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    api.set_token(Some("tok".into()));
    let txns = api.list_transactions().await.unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].id, "t1");
    assert_eq!(txns[0].status, TransactionStatus::Pending);
}

#[tokio::test]
async fn test_delete_targets_the_id_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/transaction-service/transaction/t42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server).await;
    api.set_token(Some("tok".into()));
    api.delete_transaction("t42").await.unwrap();
}

#[tokio::test]
async fn test_calls_without_token_fail_locally() {
    let server = MockServer::start().await;
    let api = client_for(&server).await;
    let err = api.list_transactions().await.unwrap_err();
    assert!(matches!(err, ApiError::AuthRequired));
}

#[tokio::test]
async fn test_timeout_is_distinct_from_connection_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let slow = ApiClient::with_timeout(&server.uri(), Duration::from_millis(50)).unwrap();
    assert!(matches!(slow.health().await.unwrap_err(), ApiError::Timeout));

    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let refused = ApiClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
    assert!(matches!(
        refused.health().await.unwrap_err(),
        ApiError::Connection
    ));
}
