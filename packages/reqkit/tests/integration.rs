use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reqkit::{create, CancellationToken, Error, FailureKind, Instance, Options};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[derive(thiserror::Error, Debug)]
#[error("api error {code}")]
struct ApiError {
    code: String,
}

fn alice() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    }
}

fn api(server: &MockServer) -> Instance {
    create(Options::new().prefix_url(format!("{}/api", server.uri())))
}

#[tokio::test]
async fn test_get_json_with_prefix_and_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/123"))
        .and(query_param("fields", "name"))
        .and(query_param("fields", "email"))
        .and(query_param("verbose", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alice()))
        .expect(1)
        .mount(&server)
        .await;

    let user: User = api(&server)
        .get(
            "users/123",
            Options::new()
                .param("fields", vec!["name", "email"])
                .param("verbose", true),
        )
        .json()
        .await
        .unwrap();

    assert_eq!(user, alice());
}

#[tokio::test]
async fn test_post_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(alice()))
        .respond_with(ResponseTemplate::new(201).set_body_json(alice()))
        .expect(1)
        .mount(&server)
        .await;

    let response = api(&server)
        .post("users", Options::new().with_body(&alice()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_instance_and_call_headers_merge() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/123"))
        .and(header("authorization", "Bearer call"))
        .and(header("x-client", "reqkit"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = api(&server).extend(
        Options::new()
            .header("Authorization", "Bearer instance")
            .header("X-Client", "reqkit"),
    );

    client
        .put("users/123", Options::new().header("authorization", "Bearer call"))
        .discard()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_success_status_is_response_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/999"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "bad id"
        })))
        .mount(&server)
        .await;

    let error = api(&server).get("users/999", None).text().await.unwrap_err();

    assert_eq!(error.kind(), FailureKind::Status);
    let response = error.into_response().unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "bad id");
}

#[tokio::test]
async fn test_failure_hook_retries_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let retries = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&retries);

    let client = api(&server).extend(Options::new().on_failure(move |error, attempt| {
        let counter = Arc::clone(&counter);
        async move {
            if error.status() != Some(StatusCode::INTERNAL_SERVER_ERROR) {
                return Err(error);
            }
            counter.fetch_add(1, Ordering::SeqCst);
            attempt
                .retry(attempt.options().clone().without_failure_hook())
                .await
        }
    }));

    let text = client.get("flaky", None).text().await.unwrap();

    assert_eq!(text, "OK");
    assert_eq!(retries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failure_hook_translates_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "code": "USER_HAS_ORDERS"
        })))
        .mount(&server)
        .await;

    let client = api(&server).extend(Options::new().on_failure(|error, _| async move {
        let response = error.into_response()?;
        let body: serde_json::Value = response.json().await?;
        Err(Error::custom(ApiError {
            code: body["code"].as_str().unwrap_or_default().to_string(),
        }))
    }));

    let error = client.delete("users/1", None).discard().await.unwrap_err();

    let api_error = error.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_error.code, "USER_HAS_ORDERS");
}

#[tokio::test]
async fn test_on_json_unwraps_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/numbers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": [1, 2, 3, 4]})),
        )
        .mount(&server)
        .await;

    let client = api(&server).extend(Options::new().on_json(|parsed| parsed["data"].clone()));

    let numbers: Vec<i32> = client.get("numbers", None).json().await.unwrap();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_timeout_shorter_than_delay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("done")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = api(&server);

    let error = client
        .get("slow", Options::new().timeout(Duration::from_millis(50)))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Timeout(_)));

    let text = client
        .get("slow", Options::new().timeout(Duration::from_secs(5)))
        .text()
        .await
        .unwrap();
    assert_eq!(text, "done");
}

#[tokio::test]
async fn test_caller_cancellation_is_abort() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let signal = CancellationToken::new();
    let pending = api(&server).get(
        "slow",
        Options::new()
            .timeout(Duration::from_secs(5))
            .signal(signal.clone()),
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    signal.cancel();

    let error = pending.await.unwrap_err();
    assert_eq!(error.kind(), FailureKind::Cancelled);
}

#[tokio::test]
async fn test_async_header_reads_fresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alice()))
        .expect(1)
        .mount(&server)
        .await;

    let token = Arc::new(AtomicUsize::new(1));
    let reader = Arc::clone(&token);

    let client = api(&server).extend(Options::new().get_options(move |_, _| {
        let reader = Arc::clone(&reader);
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let current = reader.load(Ordering::SeqCst);
            Ok(Options::new().header("authorization", format!("Bearer token-{}", current)))
        }
    }));

    let pending = client.get("me", None);
    token.store(2, Ordering::SeqCst);

    let user: User = pending.json().await.unwrap();
    assert_eq!(user, alice());
}

#[tokio::test]
async fn test_transport_failure_reaches_hook() {
    // Nothing listens on this port once the listener is dropped
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let client = create(Options::new().prefix_url(uri).on_failure(move |error, _| {
        if error.kind() == FailureKind::Transport {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        async move { Err(error) }
    }));

    let error = client.get("anything", None).await.unwrap_err();

    assert!(matches!(error, Error::Http(_)));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
