//! Server lifecycle: start, stop, wait, restart, double-start.

mod common;

use std::time::Duration;

use tokio::time::timeout;

use kafkamock::KafkaMock;

use common::{init_tracing, start_mock, stop_mock, WireClient};

#[tokio::test]
async fn stop_without_start() {
    init_tracing();
    let mock = KafkaMock::new(21101);
    mock.request_stop();
    timeout(Duration::from_secs(5), mock.wait_for_termination())
        .await
        .expect("termination completes without a start");
}

#[tokio::test]
async fn wait_without_start_or_stop() {
    init_tracing();
    let mock = KafkaMock::new(21102);
    timeout(Duration::from_secs(5), mock.wait_for_termination())
        .await
        .expect("termination completes without a start");
}

#[tokio::test]
async fn start_then_stop() {
    let mock = start_mock(21103).await;
    timeout(Duration::from_secs(5), stop_mock(&mock))
        .await
        .expect("clean shutdown");
}

#[tokio::test]
async fn double_start_is_rejected() {
    let mock = start_mock(21104).await;
    assert!(mock.start().await.is_err());
    stop_mock(&mock).await;
}

#[tokio::test]
async fn start_works_again_after_termination() {
    let mock = start_mock(21105).await;
    stop_mock(&mock).await;

    mock.start().await.expect("second start after termination");
    let mut client = WireClient::connect(21105).await;
    assert_eq!(client.api_versions().await.error_code, 0);
    stop_mock(&mock).await;
}

#[tokio::test]
async fn stop_closes_connected_clients() {
    let mock = start_mock(21106).await;

    let mut client = WireClient::connect(21106).await;
    assert_eq!(client.api_versions().await.error_code, 0);

    mock.request_stop();
    timeout(Duration::from_secs(5), client.expect_closed())
        .await
        .expect("client saw the shutdown");

    timeout(Duration::from_secs(5), mock.wait_for_termination())
        .await
        .expect("termination completes");
}

#[tokio::test]
async fn restart_keeps_serving_on_the_same_port() {
    let mock = start_mock(21107).await;
    mock.simple_post("topic-a", 2, None, b"survivor");

    mock.restart().await.expect("restart");

    let mut client = WireClient::connect(21107).await;
    let messages = client.fetch_messages("topic-a", 2, 0, 300).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].value.as_deref(), Some(&b"survivor"[..]));

    stop_mock(&mock).await;
}
