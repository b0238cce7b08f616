//! REST client against the mock API
//!
//! Run with: cargo test -p integration-tests --test rest_tests

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use discraft_common::Secret;
use discraft_core::Snowflake;
use discraft_rest::{RestClient, RestError};
use integration_tests::{MockApi, TEST_TOKEN};

fn client(api: &MockApi) -> RestClient {
    RestClient::new(api.base_url(), Secret::new(TEST_TOKEN)).unwrap()
}

#[tokio::test]
async fn test_gateway_discovery() {
    let api = MockApi::start().await.unwrap();
    api.set_gateway_url("wss://gateway.example");

    let gateway = client(&api).get_gateway_bot().await.unwrap();
    assert_eq!(gateway.url, "wss://gateway.example");
    assert_eq!(gateway.shards, Some(1));
}

#[tokio::test]
async fn test_create_message_sends_bot_credential() {
    let api = MockApi::start().await.unwrap();

    let message = client(&api)
        .create_message(Snowflake::new(42), "hello world")
        .await
        .unwrap();
    assert_eq!(message.content, "hello world");
    assert_eq!(message.channel_id, Snowflake::new(42));

    let posts = api.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].channel_id, "42");
    assert_eq!(posts[0].authorization.as_deref(), Some(format!("Bot {TEST_TOKEN}").as_str()));
}

#[tokio::test]
async fn test_too_many_requests_is_retried_once() {
    let api = MockApi::start().await.unwrap();
    let rest = client(&api);

    api.throttle_next(1);
    let start = Instant::now();
    rest.create_message(Snowflake::new(42), "after retry").await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(150));
    assert_eq!(api.post_attempts(), 2);
    assert_eq!(api.posts().len(), 1);
}

#[tokio::test]
async fn test_second_too_many_requests_is_returned() {
    let api = MockApi::start().await.unwrap();
    let rest = client(&api);

    api.throttle_next(2);
    let err = rest.create_message(Snowflake::new(42), "never").await.unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(api.post_attempts(), 2);
    assert!(api.posts().is_empty());
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let api = MockApi::start().await.unwrap();
    let rest = client(&api);

    api.fail_next(StatusCode::FORBIDDEN);
    let err = rest.create_message(Snowflake::new(42), "denied").await.unwrap_err();
    match err {
        RestError::Status { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert!(body.contains("Missing Access"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The failure does not poison the bucket
    rest.create_message(Snowflake::new(42), "allowed").await.unwrap();
    assert_eq!(api.posts().len(), 1);
}

#[tokio::test]
async fn test_exhausted_bucket_delays_next_request() {
    let api = MockApi::start().await.unwrap();
    let rest = client(&api);

    api.exhaust_next(Duration::from_millis(300));
    rest.create_message(Snowflake::new(42), "first").await.unwrap();

    // A different bucket is not held back
    let start = Instant::now();
    rest.create_message(Snowflake::new(43), "elsewhere").await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(200));

    let start = Instant::now();
    rest.create_message(Snowflake::new(42), "second").await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(150), "waited only {:?}", start.elapsed());
    assert_eq!(api.posts().len(), 3);
}
