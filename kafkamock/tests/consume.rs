//! End-to-end consume flows over real sockets: post records out-of-band,
//! read them back through the Fetch pipeline, commit, restart, rewind.

mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::{start_mock, stop_mock, WireClient};

#[tokio::test]
async fn read_one() {
    let mock = start_mock(21201).await;
    mock.create_partition_topics(&["topic-a"], 2);
    mock.simple_post("topic-a", 2, None, b"test");

    let mut client = WireClient::connect(21201).await;
    let committed = client.committed_offset("topic-a", 2).await;
    assert_eq!(committed, 0);

    let message = client.fetch_message("topic-a", 2, committed).await;
    assert_eq!(message.offset, 0);
    assert_eq!(message.value.as_deref(), Some(&b"test"[..]));

    stop_mock(&mock).await;
}

#[tokio::test]
async fn read_two_then_commit_then_reconnect() {
    let mock = start_mock(21202).await;
    mock.simple_post("topic-a", 2, None, b"test 1");
    mock.simple_post("topic-a", 2, None, b"test 2");

    {
        let mut client = WireClient::connect(21202).await;
        let first = client.fetch_message("topic-a", 2, 0).await;
        assert_eq!(first.value.as_deref(), Some(&b"test 1"[..]));
        let second = client.fetch_message("topic-a", 2, 1).await;
        assert_eq!(second.value.as_deref(), Some(&b"test 2"[..]));

        // commit the first message only (the next offset to consume is 1)
        assert_eq!(client.offset_commit("topic-a", 2, first.offset + 1).await, 0);
    }

    mock.restart().await.expect("restart");

    let mut client = WireClient::connect(21202).await;
    let committed = client.committed_offset("topic-a", 2).await;
    assert_eq!(committed, 1);

    let message = client.fetch_message("topic-a", 2, committed).await;
    assert_eq!(message.offset, 1);
    assert_eq!(message.value.as_deref(), Some(&b"test 2"[..]));

    stop_mock(&mock).await;
}

#[tokio::test]
async fn restart_retains_uncommitted_data() {
    let mock = start_mock(21203).await;
    mock.simple_post("topic-a", 2, None, b"test 1");
    mock.simple_post("topic-a", 2, None, b"test 2");

    {
        let mut client = WireClient::connect(21203).await;
        let messages = client.fetch_messages("topic-a", 2, 0, 300).await;
        assert_eq!(messages.len(), 2);
    }

    mock.restart().await.expect("restart");

    // no commits happened, so the group starts over at offset 0
    let mut client = WireClient::connect(21203).await;
    assert_eq!(client.committed_offset("topic-a", 2).await, 0);

    let messages = client.fetch_messages("topic-a", 2, 0, 300).await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].value.as_deref(), Some(&b"test 1"[..]));
    assert_eq!(messages[1].value.as_deref(), Some(&b"test 2"[..]));

    stop_mock(&mock).await;
}

#[tokio::test]
async fn bulk_commit_ten_thousand() {
    const COUNT: i64 = 10_000;

    let mock = start_mock(21204).await;
    for n in 0..COUNT {
        mock.simple_post(
            "topic-a",
            2,
            Some(format!("{n}").as_bytes()),
            format!("testing: test {n}").as_bytes(),
        );
    }

    let mut client = WireClient::connect(21204).await;
    let mut next_offset = 0;
    while next_offset < COUNT {
        let messages = client.fetch_messages("topic-a", 2, next_offset, 300).await;
        assert!(!messages.is_empty(), "stalled at offset {next_offset}");
        for message in messages {
            assert_eq!(message.offset, next_offset);
            next_offset += 1;
            assert_eq!(client.offset_commit("topic-a", 2, next_offset).await, 0);
        }
    }

    assert_eq!(client.committed_offset("topic-a", 2).await, COUNT);

    stop_mock(&mock).await;
}

#[tokio::test]
async fn rewind_via_consumer_group_offset() {
    let mock = start_mock(21205).await;
    mock.simple_post("topic-a", 2, None, b"test 1");
    mock.simple_post("topic-a", 2, None, b"test 2");

    {
        let mut client = WireClient::connect(21205).await;
        let first = client.fetch_message("topic-a", 2, 0).await;
        assert_eq!(client.offset_commit("topic-a", 2, first.offset + 1).await, 0);
        assert_eq!(client.committed_offset("topic-a", 2).await, 1);
    }

    mock.set_consumer_group_offset("topic-a", 2, common::GROUP_ID, 0);

    let mut client = WireClient::connect(21205).await;
    let committed = client.committed_offset("topic-a", 2).await;
    assert_eq!(committed, 0);

    let message = client.fetch_message("topic-a", 2, committed).await;
    assert_eq!(message.offset, 0);
    assert_eq!(message.value.as_deref(), Some(&b"test 1"[..]));

    stop_mock(&mock).await;
}

#[tokio::test]
async fn long_poll_picks_up_a_late_record() {
    let mock = start_mock(21206).await;
    mock.create_partition_topics(&["topic-a"], 2);

    let poster = mock.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        poster.simple_post("topic-a", 2, None, b"late arrival");
    });

    let started = Instant::now();
    let mut client = WireClient::connect(21206).await;
    let message = client.fetch_message("topic-a", 2, 0).await;
    assert_eq!(message.value.as_deref(), Some(&b"late arrival"[..]));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "record took too long to arrive"
    );

    stop_mock(&mock).await;
}

#[tokio::test]
async fn fetch_returns_promptly_once_data_flows() {
    let mock = start_mock(21207).await;
    mock.simple_post("topic-a", 2, None, b"already here");

    let mut client = WireClient::connect(21207).await;

    // MaxWait is 5s, but a produced record collapses the deadline
    let started = Instant::now();
    let messages = client.fetch_messages("topic-a", 2, 0, 5_000).await;
    assert_eq!(messages.len(), 1);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "fetch waited out MaxWait despite having data"
    );

    stop_mock(&mock).await;
}

#[tokio::test]
async fn fetch_respects_the_partition_byte_cap() {
    let mock = start_mock(21208).await;
    for n in 0..20 {
        mock.simple_post("topic-a", 2, None, format!("record {n:02}").as_bytes());
    }

    let mut client = WireClient::connect(21208).await;

    // each message is 34 + 9 bytes; cap to roughly three of them
    let response = client.fetch("topic-a", 2, 0, 300, 140).await;
    let records = response.responses[0].partitions[0].records.messages().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(response.responses[0].partitions[0].high_watermark, 3);

    // an uncapped fetch drains the rest
    let messages = client.fetch_messages("topic-a", 2, 3, 300).await;
    assert_eq!(messages.len(), 17);

    stop_mock(&mock).await;
}

#[tokio::test]
async fn finish_requests_breaks_a_long_poll() {
    let mock = start_mock(21209).await;
    mock.create_partition_topics(&["topic-a"], 2);

    let breaker = mock.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        breaker.finish_requests();
    });

    let started = Instant::now();
    let mut client = WireClient::connect(21209).await;
    let messages = client.fetch_messages("topic-a", 2, 0, 10_000).await;
    assert!(messages.is_empty());
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "finish_requests did not break the poll"
    );

    stop_mock(&mock).await;
}
