//! End-to-end tests of bearer injection and the 401 refresh protocol.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use learnx_client::{ApiRequest, ClientError, LearnxClient};
use learnx_core::{EnrolledCourse, MemoryTokenStore, TokenPair, TokenStore, User};

/// Matches requests that carry no Authorization header at all.
struct NoAuthorizationHeader;

impl Match for NoAuthorizationHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

async fn client_with_tokens(
    server: &MockServer,
    access: &str,
    refresh: &str,
) -> (LearnxClient, MemoryTokenStore) {
    let store = MemoryTokenStore::new();
    store.store(&TokenPair::new(access, refresh)).await.unwrap();

    let client = LearnxClient::builder()
        .base_url(server.uri())
        .token_store(store.clone())
        .build()
        .unwrap();

    (client, store)
}

fn me_body() -> serde_json::Value {
    json!({"username": "maya", "email": "maya@example.com"})
}

#[tokio::test]
async fn attaches_stored_access_token_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_with_tokens(&server, "A1", "R1").await;
    let user: User = client.execute(&ApiRequest::get("auth/me/")).await.unwrap();

    assert_eq!(user.username, "maya");
    assert_eq!(user.email, "maya@example.com");
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses/"))
        .and(NoAuthorizationHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = LearnxClient::new(server.uri()).unwrap();
    let response = client.send(&ApiRequest::get("courses/")).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_the_request_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me_body()))
        .expect(1)
        .mount(&server)
        .await;

    // The refresh call itself is bare: refresh token in the body, no bearer
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .and(NoAuthorizationHeader)
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server, "A1", "R1").await;
    let user: User = client.execute(&ApiRequest::get("auth/me/")).await.unwrap();

    assert_eq!(user.username, "maya");
    // New access token stored, refresh token untouched
    assert_eq!(store.access().await.unwrap().as_deref(), Some("A2"));
    assert_eq!(store.refresh().await.unwrap().as_deref(), Some("R1"));
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh_call() {
    learnx_core::telemetry::init_default();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses/enrolled/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})),
        )
        .expect(8)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/courses/enrolled/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(8)
        .mount(&server)
        .await;

    // Slow refresh so every rejected request queues behind the first one
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "fresh"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server, "stale", "R1").await;

    let results = join_all((0..8).map(|_| {
        let client = client.clone();
        async move {
            client
                .execute::<Vec<EnrolledCourse>>(&ApiRequest::get("courses/enrolled/"))
                .await
        }
    }))
    .await;

    for result in results {
        assert!(result.unwrap().is_empty());
    }
    assert_eq!(store.access().await.unwrap().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn refresh_failure_fails_all_queued_requests_and_clears_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})),
        )
        .expect(4)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is blacklisted"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server, "stale", "R-revoked").await;

    let results = join_all((0..4).map(|_| {
        let client = client.clone();
        async move {
            client
                .execute::<serde_json::Value>(&ApiRequest::get("auth/me/"))
                .await
        }
    }))
    .await;

    for result in results {
        match result {
            Err(ClientError::AuthenticationFailed(message)) => {
                assert!(message.contains("blacklisted"), "message: {message}");
            }
            other => panic!("expected authentication failure, got {other:?}"),
        }
    }

    // Both tokens are gone; the session cannot limp along half-armed
    assert_eq!(store.access().await.unwrap(), None);
    assert_eq!(store.refresh().await.unwrap(), None);
}

#[tokio::test]
async fn second_401_after_retry_is_terminal() {
    let server = MockServer::start().await;

    // The server rejects even the refreshed token
    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "account disabled"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    store.store(&TokenPair::new("A1", "R1")).await.unwrap();
    let expirations = Arc::new(AtomicUsize::new(0));
    let hook_counter = Arc::clone(&expirations);

    let client = LearnxClient::builder()
        .base_url(server.uri())
        .token_store(store.clone())
        .on_session_expired(move || {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let result = client
        .execute::<serde_json::Value>(&ApiRequest::get("auth/me/"))
        .await;

    match result {
        Err(ClientError::AuthenticationFailed(message)) => {
            assert_eq!(message, "account disabled");
        }
        other => panic!("expected authentication failure, got {other:?}"),
    }

    // The refresh itself succeeded, so the session survives; the caller
    // just gets told no
    assert_eq!(store.access().await.unwrap().as_deref(), Some("A2"));
    assert_eq!(store.refresh().await.unwrap().as_deref(), Some("R1"));
    assert_eq!(expirations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_refresh_token_lets_the_401_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    store.store_access("A-stale").await.unwrap();

    let client = LearnxClient::builder()
        .base_url(server.uri())
        .token_store(store.clone())
        .build()
        .unwrap();

    let result = client
        .execute::<serde_json::Value>(&ApiRequest::get("auth/me/"))
        .await;

    match result {
        Err(ClientError::AuthenticationFailed(message)) => {
            assert_eq!(message, "token expired");
        }
        other => panic!("expected authentication failure, got {other:?}"),
    }

    // The rejected access token was discarded
    assert_eq!(store.access().await.unwrap(), None);
}

#[tokio::test]
async fn session_expired_hook_fires_once_per_failed_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is blacklisted"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    store.store(&TokenPair::new("stale", "R-revoked")).await.unwrap();
    let expirations = Arc::new(AtomicUsize::new(0));
    let hook_counter = Arc::clone(&expirations);

    let client = LearnxClient::builder()
        .base_url(server.uri())
        .token_store(store)
        .on_session_expired(move || {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let results = join_all((0..3).map(|_| {
        let client = client.clone();
        async move {
            client
                .execute::<serde_json::Value>(&ApiRequest::get("auth/me/"))
                .await
        }
    }))
    .await;

    for result in results {
        assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    }

    // One settlement, one notification, no matter how many callers queued
    assert_eq!(expirations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_401_errors_pass_through_without_refreshing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses/999/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"detail": "No Course matches the given query."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server, "A1", "R1").await;
    let result = client.course(999).await;

    match result {
        Err(ClientError::NotFound(message)) => {
            assert_eq!(message, "No Course matches the given query.");
        }
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(store.access().await.unwrap().as_deref(), Some("A1"));
}
