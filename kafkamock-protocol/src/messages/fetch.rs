//! Fetch v2 messages

use bytes::{BufMut, BytesMut};

use crate::codec::{peek_array, peek_i16, peek_i32, peek_i64, peek_string, put_array, put_string, Decode, Encode};
use crate::message_set::MessageSetV1;

/// Fetch request, version 2.
#[derive(Debug, Clone)]
pub struct FetchRequestV2 {
    pub replica_id: i32,
    pub max_wait_ms: i32,
    pub min_bytes: i32,
    pub topics: Vec<FetchTopic>,
}

#[derive(Debug, Clone)]
pub struct FetchTopic {
    pub topic: String,
    pub partitions: Vec<FetchPartition>,
}

#[derive(Debug, Clone)]
pub struct FetchPartition {
    pub partition: i32,
    pub fetch_offset: i64,
    pub partition_max_bytes: i32,
}

impl Encode for FetchRequestV2 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.replica_id);
        out.put_i32(self.max_wait_ms);
        out.put_i32(self.min_bytes);
        put_array(out, Some(&self.topics));
    }
}

impl Decode for FetchRequestV2 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, replica_id) = peek_i32(buf, at)?;
        let (next, max_wait_ms) = peek_i32(buf, next)?;
        let (next, min_bytes) = peek_i32(buf, next)?;
        let (next, topics) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                replica_id,
                max_wait_ms,
                min_bytes,
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for FetchTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.topic);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for FetchTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, topic) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                topic,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for FetchPartition {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.partition);
        out.put_i64(self.fetch_offset);
        out.put_i32(self.partition_max_bytes);
    }
}

impl Decode for FetchPartition {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, partition) = peek_i32(buf, at)?;
        let (next, fetch_offset) = peek_i64(buf, next)?;
        let (next, partition_max_bytes) = peek_i32(buf, next)?;
        Some((
            next,
            Self {
                partition,
                fetch_offset,
                partition_max_bytes,
            },
        ))
    }
}

/// Fetch response, version 2.
#[derive(Debug, Clone)]
pub struct FetchResponseV2 {
    pub throttle_time_ms: i32,
    pub responses: Vec<FetchResponseTopic>,
}

#[derive(Debug, Clone)]
pub struct FetchResponseTopic {
    pub topic: String,
    pub partitions: Vec<FetchResponsePartition>,
}

#[derive(Debug, Clone)]
pub struct FetchResponsePartition {
    pub partition_index: i32,
    pub error_code: i16,
    pub high_watermark: i64,
    pub records: MessageSetV1,
}

impl Encode for FetchResponseV2 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.throttle_time_ms);
        put_array(out, Some(&self.responses));
    }
}

impl Decode for FetchResponseV2 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, throttle_time_ms) = peek_i32(buf, at)?;
        let (next, responses) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                throttle_time_ms,
                responses: responses.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for FetchResponseTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.topic);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for FetchResponseTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, topic) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                topic,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for FetchResponsePartition {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.partition_index);
        out.put_i16(self.error_code);
        out.put_i64(self.high_watermark);
        self.records.encode(out);
    }
}

impl Decode for FetchResponsePartition {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, partition_index) = peek_i32(buf, at)?;
        let (next, error_code) = peek_i16(buf, next)?;
        let (next, high_watermark) = peek_i64(buf, next)?;
        let (next, records) = MessageSetV1::decode(buf, next)?;
        Some((
            next,
            Self {
                partition_index,
                error_code,
                high_watermark,
                records,
            },
        ))
    }
}
