//! Authorized requests against the platform API.

use crate::helpers::{builder, identity_server};

use session_core::error::RequestError;
use session_core::storage::MemoryTokenStorage;

use std::sync::Arc;

use reqwest::Method;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

/// **VALUE**: Verifies authorized requests carry the session token.
///
/// **WHY THIS MATTERS**: Every downstream API call depends on this header.
///
/// **BUG THIS CATCHES**: Would catch a missing `Bearer` prefix or a wrong base path join.
#[tokio::test]
async fn given_authenticated_store_when_sending_request_then_bearer_header_is_attached() {
    // GIVEN: An authenticated store and a jobs endpoint that requires the token
    let server = identity_server(&["good"]).await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    let store = builder(&server, Arc::new(MemoryTokenStorage::with_token("good")))
        .build()
        .expect("store should build");

    // WHEN: Building and sending a request
    let response = store
        .authorized_request(Method::POST, "/jobs")
        .await
        .expect("request should build")
        .send()
        .await
        .expect("request should send");

    // THEN
    assert_eq!(response.status().as_u16(), 201);
}

/// **VALUE**: Verifies an invalid session cannot build requests.
#[tokio::test]
async fn given_invalid_token_when_building_request_then_not_authenticated() {
    // GIVEN: A store whose stored token is rejected
    let server = identity_server(&[]).await;
    let store = builder(&server, Arc::new(MemoryTokenStorage::with_token("bad")))
        .build()
        .expect("store should build");

    // WHEN
    let result = store.authorized_request(Method::GET, "jobs").await;

    // THEN
    assert!(matches!(result, Err(RequestError::NotAuthenticated { .. })));
}
