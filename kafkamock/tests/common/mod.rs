//! Shared helpers: a minimal wire-level Kafka client built on the
//! workspace codec, used to drive the mock over real TCP sockets.

#![allow(dead_code)] // each test binary uses its own subset

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, Duration, Instant};

use kafkamock::KafkaMock;
use kafkamock_protocol::codec::{peek_i32, Decode, Encode};
use kafkamock_protocol::messages::{
    ApiVersionsResponseV0, FetchPartition, FetchRequestV2, FetchResponseV2, FetchTopic,
    FindCoordinatorRequestV0, FindCoordinatorResponseV0, HeartbeatRequestV0, HeartbeatResponseV0,
    JoinGroupRequestV1, JoinGroupResponseV1, LeaveGroupRequestV0, LeaveGroupResponseV0,
    ListOffsetsRequestPartition, ListOffsetsRequestTopic, ListOffsetsRequestV1,
    ListOffsetsResponsePartition, ListOffsetsResponseV1, MetadataRequestV1, MetadataResponseV1,
    OffsetCommitRequestPartition, OffsetCommitRequestTopic, OffsetCommitRequestV2,
    OffsetCommitResponseV2, OffsetFetchRequestTopic, OffsetFetchRequestV1, OffsetFetchResponseV1,
    SyncGroupRequestV0, SyncGroupResponseV0,
};
use kafkamock_protocol::{MessageV1, RequestHeader};

pub const GROUP_ID: &str = "kafka-mock";
pub const CLIENT_ID: &str = "kafkamock-tests";

pub mod api_key {
    pub const PRODUCE: i16 = 0;
    pub const FETCH: i16 = 1;
    pub const LIST_OFFSETS: i16 = 2;
    pub const METADATA: i16 = 3;
    pub const OFFSET_COMMIT: i16 = 8;
    pub const OFFSET_FETCH: i16 = 9;
    pub const FIND_COORDINATOR: i16 = 10;
    pub const JOIN_GROUP: i16 = 11;
    pub const HEARTBEAT: i16 = 12;
    pub const LEAVE_GROUP: i16 = 13;
    pub const SYNC_GROUP: i16 = 14;
    pub const API_VERSIONS: i16 = 18;
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn start_mock(port: u16) -> KafkaMock {
    init_tracing();
    let mock = KafkaMock::new(port);
    mock.start().await.expect("mock starts");
    mock
}

pub async fn stop_mock(mock: &KafkaMock) {
    mock.request_stop();
    mock.wait_for_termination().await;
}

/// A request with an empty body (ApiVersions v0, or APIs the mock refuses).
pub struct NoBody;

impl Encode for NoBody {
    fn encode(&self, _out: &mut BytesMut) {}
}

/// A well-formed heartbeat body with junk bytes appended, for exercising
/// the leftover-bytes protocol error.
pub struct TrailingJunk;

impl Encode for TrailingJunk {
    fn encode(&self, out: &mut BytesMut) {
        HeartbeatRequestV0 {
            group_id: GROUP_ID.to_string(),
            generation_id: 0,
            member_id: "1".to_string(),
        }
        .encode(out);
        out.extend_from_slice(&[0xAA, 0xBB]);
    }
}

pub struct WireClient {
    stream: TcpStream,
    correlation_id: i32,
}

impl WireClient {
    pub async fn connect(port: u16) -> Self {
        let stream = TcpStream::connect(("127.0.0.1", port))
            .await
            .expect("connect to mock");
        Self {
            stream,
            correlation_id: 0,
        }
    }

    /// Send one framed request and return the response body (the bytes
    /// after the echoed correlation id).
    async fn call_raw<Req: Encode>(
        &mut self,
        api_key: i16,
        api_version: i16,
        request: &Req,
    ) -> Bytes {
        self.send_request(api_key, api_version, request).await;

        let mut size_buf = [0u8; 4];
        self.stream
            .read_exact(&mut size_buf)
            .await
            .expect("read response size");
        let size = usize::try_from(i32::from_be_bytes(size_buf)).expect("sane response size");
        let mut payload = vec![0u8; size];
        self.stream
            .read_exact(&mut payload)
            .await
            .expect("read response payload");

        let (at, correlation_id) = peek_i32(&payload, 0).expect("response correlation id");
        assert_eq!(correlation_id, self.correlation_id, "response out of order");
        Bytes::copy_from_slice(&payload[at..])
    }

    pub async fn send_request<Req: Encode>(
        &mut self,
        api_key: i16,
        api_version: i16,
        request: &Req,
    ) {
        self.correlation_id += 1;
        let header = RequestHeader {
            api_key,
            api_version,
            correlation_id: self.correlation_id,
            client_id: CLIENT_ID.to_string(),
            tags: None,
        };

        let mut body = BytesMut::new();
        header.encode(&mut body);
        request.encode(&mut body);

        let mut frame = BytesMut::with_capacity(4 + body.len());
        frame.put_i32(body.len() as i32);
        frame.extend_from_slice(&body);
        self.stream.write_all(&frame).await.expect("write request");
    }

    /// Send raw frame bytes, bypassing header/request encoding.
    pub async fn send_raw_frame(&mut self, payload: &[u8]) {
        let mut frame = BytesMut::with_capacity(4 + payload.len());
        frame.put_i32(payload.len() as i32);
        frame.extend_from_slice(payload);
        self.stream.write_all(&frame).await.expect("write raw frame");
    }

    /// Expect the server to close the connection without responding.
    pub async fn expect_closed(&mut self) {
        let mut buf = [0u8; 1];
        let read = tokio::time::timeout(Duration::from_secs(5), self.stream.read(&mut buf)).await;
        match read {
            Ok(Ok(0)) | Ok(Err(_)) => {}
            Ok(Ok(_)) => panic!("expected the connection to close, got data"),
            Err(_) => panic!("expected the connection to close, timed out"),
        }
    }

    async fn call<Req: Encode, Resp: Decode>(
        &mut self,
        api_key: i16,
        api_version: i16,
        request: &Req,
    ) -> Resp {
        let body = self.call_raw(api_key, api_version, request).await;
        let (next, response) = Resp::decode(&body, 0).expect("decode response");
        assert_eq!(next, body.len(), "response body fully consumed");
        response
    }

    // ------------------------------------------------------------------
    // Per-API calls
    // ------------------------------------------------------------------

    pub async fn api_versions(&mut self) -> ApiVersionsResponseV0 {
        self.call(api_key::API_VERSIONS, 0, &NoBody).await
    }

    pub async fn metadata(&mut self, topics: &[&str]) -> MetadataResponseV1 {
        let request = MetadataRequestV1 {
            topics: topics.iter().map(|t| (*t).to_string()).collect(),
        };
        self.call(api_key::METADATA, 1, &request).await
    }

    pub async fn find_coordinator(&mut self) -> FindCoordinatorResponseV0 {
        let request = FindCoordinatorRequestV0 {
            key: GROUP_ID.to_string(),
        };
        self.call(api_key::FIND_COORDINATOR, 0, &request).await
    }

    pub async fn join_group(&mut self) -> JoinGroupResponseV1 {
        let request = JoinGroupRequestV1 {
            group_id: GROUP_ID.to_string(),
            session_timeout_ms: 30_000,
            rebalance_timeout_ms: 30_000,
            member_id: String::new(),
            protocol_type: "consumer".to_string(),
            protocols: Vec::new(),
        };
        self.call(api_key::JOIN_GROUP, 1, &request).await
    }

    pub async fn sync_group(&mut self) -> SyncGroupResponseV0 {
        let request = SyncGroupRequestV0 {
            group_id: GROUP_ID.to_string(),
            generation_id: 0,
            member_id: "1".to_string(),
            assignments: Vec::new(),
        };
        self.call(api_key::SYNC_GROUP, 0, &request).await
    }

    pub async fn heartbeat(&mut self) -> HeartbeatResponseV0 {
        let request = HeartbeatRequestV0 {
            group_id: GROUP_ID.to_string(),
            generation_id: 0,
            member_id: "1".to_string(),
        };
        self.call(api_key::HEARTBEAT, 0, &request).await
    }

    pub async fn leave_group(&mut self) -> LeaveGroupResponseV0 {
        let request = LeaveGroupRequestV0 {
            group_id: GROUP_ID.to_string(),
            member_id: "1".to_string(),
        };
        self.call(api_key::LEAVE_GROUP, 0, &request).await
    }

    pub async fn offset_fetch(&mut self, topic: &str, partitions: &[i32]) -> OffsetFetchResponseV1 {
        let request = OffsetFetchRequestV1 {
            group_id: GROUP_ID.to_string(),
            topics: vec![OffsetFetchRequestTopic {
                name: topic.to_string(),
                partition_indexes: partitions.to_vec(),
            }],
        };
        self.call(api_key::OFFSET_FETCH, 1, &request).await
    }

    /// The group's committed offset on one partition, via OffsetFetch.
    pub async fn committed_offset(&mut self, topic: &str, partition: i32) -> i64 {
        let response = self.offset_fetch(topic, &[partition]).await;
        response.topics[0].partitions[0].committed_offset
    }

    /// Commit `offset` and return the per-partition error code.
    pub async fn offset_commit(&mut self, topic: &str, partition: i32, offset: i64) -> i16 {
        let request = OffsetCommitRequestV2 {
            group_id: GROUP_ID.to_string(),
            generation_id: 0,
            member_id: "1".to_string(),
            retention_time_ms: -1,
            topics: vec![OffsetCommitRequestTopic {
                name: topic.to_string(),
                partitions: vec![OffsetCommitRequestPartition {
                    partition_index: partition,
                    committed_offset: offset,
                    committed_metadata: None,
                }],
            }],
        };
        let response: OffsetCommitResponseV2 =
            self.call(api_key::OFFSET_COMMIT, 2, &request).await;
        response.topics[0].partitions[0].error_code
    }

    pub async fn list_offsets(
        &mut self,
        topic: &str,
        partition: i32,
        timestamp: i64,
    ) -> ListOffsetsResponsePartition {
        let request = ListOffsetsRequestV1 {
            replica_id: -1,
            topics: vec![ListOffsetsRequestTopic {
                name: topic.to_string(),
                partitions: vec![ListOffsetsRequestPartition {
                    partition_index: partition,
                    timestamp,
                }],
            }],
        };
        let response: ListOffsetsResponseV1 = self.call(api_key::LIST_OFFSETS, 1, &request).await;
        response.topics[0].partitions[0].clone()
    }

    pub async fn fetch(
        &mut self,
        topic: &str,
        partition: i32,
        offset: i64,
        max_wait_ms: i32,
        max_bytes: i32,
    ) -> FetchResponseV2 {
        let request = FetchRequestV2 {
            replica_id: -1,
            max_wait_ms,
            min_bytes: 1,
            topics: vec![FetchTopic {
                topic: topic.to_string(),
                partitions: vec![FetchPartition {
                    partition,
                    fetch_offset: offset,
                    partition_max_bytes: max_bytes,
                }],
            }],
        };
        self.call(api_key::FETCH, 2, &request).await
    }

    /// One fetch round: whatever records the server returns for the tuple.
    pub async fn fetch_messages(
        &mut self,
        topic: &str,
        partition: i32,
        offset: i64,
        max_wait_ms: i32,
    ) -> Vec<MessageV1> {
        let response = self.fetch(topic, partition, offset, max_wait_ms, 10 << 20).await;
        let records = &response.responses[0].partitions[0].records;
        records.messages().expect("message set parses and checksums hold")
    }

    /// Consumer-style blocking read: keep issuing fetches until a record
    /// shows up, like a client library's FetchMessage does.
    pub async fn fetch_message(&mut self, topic: &str, partition: i32, offset: i64) -> MessageV1 {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let messages = self.fetch_messages(topic, partition, offset, 300).await;
            if let Some(first) = messages.into_iter().next() {
                return first;
            }
            assert!(Instant::now() < deadline, "no record arrived in time");
            sleep(Duration::from_millis(10)).await;
        }
    }
}
