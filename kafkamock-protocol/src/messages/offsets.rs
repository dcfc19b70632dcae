//! Offset management messages: OffsetCommit v2, OffsetFetch v1,
//! ListOffsets v1.

use bytes::{BufMut, BytesMut};

use crate::codec::{
    peek_array, peek_i16, peek_i32, peek_i64, peek_nullable_string, peek_string, put_array,
    put_nullable_string, put_string, Decode, Encode,
};

// ============================================================================
// OffsetCommit v2
// ============================================================================

#[derive(Debug, Clone)]
pub struct OffsetCommitRequestV2 {
    pub group_id: String,
    pub generation_id: i32,
    pub member_id: String,
    pub retention_time_ms: i64,
    pub topics: Vec<OffsetCommitRequestTopic>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitRequestTopic {
    pub name: String,
    pub partitions: Vec<OffsetCommitRequestPartition>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitRequestPartition {
    pub partition_index: i32,
    pub committed_offset: i64,
    pub committed_metadata: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitResponseV2 {
    pub topics: Vec<OffsetCommitResponseTopic>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitResponseTopic {
    pub name: String,
    pub partitions: Vec<OffsetCommitResponsePartition>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommitResponsePartition {
    pub partition_index: i32,
    pub error_code: i16,
}

impl Encode for OffsetCommitRequestV2 {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.group_id);
        out.put_i32(self.generation_id);
        put_string(out, &self.member_id);
        out.put_i64(self.retention_time_ms);
        put_array(out, Some(&self.topics));
    }
}

impl Decode for OffsetCommitRequestV2 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, group_id) = peek_string(buf, at)?;
        let (next, generation_id) = peek_i32(buf, next)?;
        let (next, member_id) = peek_string(buf, next)?;
        let (next, retention_time_ms) = peek_i64(buf, next)?;
        let (next, topics) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                group_id,
                generation_id,
                member_id,
                retention_time_ms,
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetCommitRequestTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.name);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for OffsetCommitRequestTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, name) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                name,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetCommitRequestPartition {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.partition_index);
        out.put_i64(self.committed_offset);
        put_nullable_string(out, self.committed_metadata.as_deref());
    }
}

impl Decode for OffsetCommitRequestPartition {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, partition_index) = peek_i32(buf, at)?;
        let (next, committed_offset) = peek_i64(buf, next)?;
        let (next, committed_metadata) = peek_nullable_string(buf, next)?;
        Some((
            next,
            Self {
                partition_index,
                committed_offset,
                committed_metadata,
            },
        ))
    }
}

impl Encode for OffsetCommitResponseV2 {
    fn encode(&self, out: &mut BytesMut) {
        put_array(out, Some(&self.topics));
    }
}

impl Decode for OffsetCommitResponseV2 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, topics) = peek_array(buf, at)?;
        Some((
            next,
            Self {
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetCommitResponseTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.name);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for OffsetCommitResponseTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, name) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                name,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetCommitResponsePartition {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.partition_index);
        out.put_i16(self.error_code);
    }
}

impl Decode for OffsetCommitResponsePartition {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, partition_index) = peek_i32(buf, at)?;
        let (next, error_code) = peek_i16(buf, next)?;
        Some((
            next,
            Self {
                partition_index,
                error_code,
            },
        ))
    }
}

// ============================================================================
// OffsetFetch v1
// ============================================================================

#[derive(Debug, Clone)]
pub struct OffsetFetchRequestV1 {
    pub group_id: String,
    pub topics: Vec<OffsetFetchRequestTopic>,
}

#[derive(Debug, Clone)]
pub struct OffsetFetchRequestTopic {
    pub name: String,
    pub partition_indexes: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct OffsetFetchResponseV1 {
    pub topics: Vec<OffsetFetchResponseTopic>,
}

#[derive(Debug, Clone)]
pub struct OffsetFetchResponseTopic {
    pub name: String,
    pub partitions: Vec<OffsetFetchResponsePartition>,
}

#[derive(Debug, Clone)]
pub struct OffsetFetchResponsePartition {
    pub partition_index: i32,
    pub committed_offset: i64,
    pub metadata: Option<String>,
    pub error_code: i16,
}

impl Encode for OffsetFetchRequestV1 {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.group_id);
        put_array(out, Some(&self.topics));
    }
}

impl Decode for OffsetFetchRequestV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, group_id) = peek_string(buf, at)?;
        let (next, topics) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                group_id,
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetFetchRequestTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.name);
        put_array(out, Some(&self.partition_indexes));
    }
}

impl Decode for OffsetFetchRequestTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, name) = peek_string(buf, at)?;
        let (next, partition_indexes) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                name,
                partition_indexes: partition_indexes.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetFetchResponseV1 {
    fn encode(&self, out: &mut BytesMut) {
        put_array(out, Some(&self.topics));
    }
}

impl Decode for OffsetFetchResponseV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, topics) = peek_array(buf, at)?;
        Some((
            next,
            Self {
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetFetchResponseTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.name);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for OffsetFetchResponseTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, name) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                name,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for OffsetFetchResponsePartition {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.partition_index);
        out.put_i64(self.committed_offset);
        put_nullable_string(out, self.metadata.as_deref());
        out.put_i16(self.error_code);
    }
}

impl Decode for OffsetFetchResponsePartition {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, partition_index) = peek_i32(buf, at)?;
        let (next, committed_offset) = peek_i64(buf, next)?;
        let (next, metadata) = peek_nullable_string(buf, next)?;
        let (next, error_code) = peek_i16(buf, next)?;
        Some((
            next,
            Self {
                partition_index,
                committed_offset,
                metadata,
                error_code,
            },
        ))
    }
}

// ============================================================================
// ListOffsets v1
// ============================================================================

#[derive(Debug, Clone)]
pub struct ListOffsetsRequestV1 {
    pub replica_id: i32,
    pub topics: Vec<ListOffsetsRequestTopic>,
}

#[derive(Debug, Clone)]
pub struct ListOffsetsRequestTopic {
    pub name: String,
    pub partitions: Vec<ListOffsetsRequestPartition>,
}

#[derive(Debug, Clone)]
pub struct ListOffsetsRequestPartition {
    pub partition_index: i32,
    /// -1 asks for the latest offset, -2 for the earliest; any other value
    /// asks for the offset right after the last record older than it.
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct ListOffsetsResponseV1 {
    pub topics: Vec<ListOffsetsResponseTopic>,
}

#[derive(Debug, Clone)]
pub struct ListOffsetsResponseTopic {
    pub name: String,
    pub partitions: Vec<ListOffsetsResponsePartition>,
}

#[derive(Debug, Clone)]
pub struct ListOffsetsResponsePartition {
    pub partition_index: i32,
    pub error_code: i16,
    pub timestamp: i64,
    pub offset: i64,
}

impl Encode for ListOffsetsRequestV1 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.replica_id);
        put_array(out, Some(&self.topics));
    }
}

impl Decode for ListOffsetsRequestV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, replica_id) = peek_i32(buf, at)?;
        let (next, topics) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                replica_id,
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for ListOffsetsRequestTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.name);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for ListOffsetsRequestTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, name) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                name,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for ListOffsetsRequestPartition {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.partition_index);
        out.put_i64(self.timestamp);
    }
}

impl Decode for ListOffsetsRequestPartition {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, partition_index) = peek_i32(buf, at)?;
        let (next, timestamp) = peek_i64(buf, next)?;
        Some((
            next,
            Self {
                partition_index,
                timestamp,
            },
        ))
    }
}

impl Encode for ListOffsetsResponseV1 {
    fn encode(&self, out: &mut BytesMut) {
        put_array(out, Some(&self.topics));
    }
}

impl Decode for ListOffsetsResponseV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, topics) = peek_array(buf, at)?;
        Some((
            next,
            Self {
                topics: topics.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for ListOffsetsResponseTopic {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.name);
        put_array(out, Some(&self.partitions));
    }
}

impl Decode for ListOffsetsResponseTopic {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, name) = peek_string(buf, at)?;
        let (next, partitions) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                name,
                partitions: partitions.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for ListOffsetsResponsePartition {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.partition_index);
        out.put_i16(self.error_code);
        out.put_i64(self.timestamp);
        out.put_i64(self.offset);
    }
}

impl Decode for ListOffsetsResponsePartition {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, partition_index) = peek_i32(buf, at)?;
        let (next, error_code) = peek_i16(buf, next)?;
        let (next, timestamp) = peek_i64(buf, next)?;
        let (next, offset) = peek_i64(buf, next)?;
        Some((
            next,
            Self {
                partition_index,
                error_code,
                timestamp,
                offset,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_commit_round_trip() {
        let request = OffsetCommitRequestV2 {
            group_id: "kafka-mock".to_string(),
            generation_id: 1,
            member_id: "1".to_string(),
            retention_time_ms: -1,
            topics: vec![OffsetCommitRequestTopic {
                name: "topic-a".to_string(),
                partitions: vec![OffsetCommitRequestPartition {
                    partition_index: 2,
                    committed_offset: 1,
                    committed_metadata: None,
                }],
            }],
        };

        let mut buf = BytesMut::new();
        request.encode(&mut buf);

        let (next, decoded) = OffsetCommitRequestV2::decode(&buf, 0).unwrap();
        assert_eq!(next, buf.len());
        assert_eq!(decoded.group_id, "kafka-mock");
        assert_eq!(decoded.topics[0].partitions[0].committed_offset, 1);
        assert_eq!(decoded.topics[0].partitions[0].committed_metadata, None);
    }

    #[test]
    fn list_offsets_response_round_trip() {
        let response = ListOffsetsResponseV1 {
            topics: vec![ListOffsetsResponseTopic {
                name: "topic-a".to_string(),
                partitions: vec![ListOffsetsResponsePartition {
                    partition_index: 2,
                    error_code: 0,
                    timestamp: 1234,
                    offset: 10,
                }],
            }],
        };

        let mut buf = BytesMut::new();
        response.encode(&mut buf);

        let (next, decoded) = ListOffsetsResponseV1::decode(&buf, 0).unwrap();
        assert_eq!(next, buf.len());
        assert_eq!(decoded.topics[0].partitions[0].offset, 10);
    }
}
