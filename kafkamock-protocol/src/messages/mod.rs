//! Typed request/response messages for the supported API versions.
//!
//! Every message implements [`Encode`] and [`Decode`] explicitly, walking
//! its fields in declaration order. The mock broker only decodes requests
//! and encodes responses; the inverse halves exist for the wire client the
//! integration tests use, and double as round-trip coverage for the codec.

use kafkamock_common::error::ProtocolError;
use kafkamock_common::Result;

use crate::codec::Decode;

pub mod api_versions;
pub mod coordinator;
pub mod fetch;
pub mod group;
pub mod metadata;
pub mod offsets;

pub use api_versions::{ApiVersionRange, ApiVersionsResponseV0};
pub use coordinator::{FindCoordinatorRequestV0, FindCoordinatorResponseV0};
pub use fetch::{
    FetchPartition, FetchRequestV2, FetchResponsePartition, FetchResponseTopic, FetchResponseV2,
    FetchTopic,
};
pub use group::{
    HeartbeatRequestV0, HeartbeatResponseV0, JoinGroupMember, JoinGroupProtocol,
    JoinGroupRequestV1, JoinGroupResponseV1, LeaveGroupRequestV0, LeaveGroupResponseV0,
    MemberAssignment, SyncGroupAssignment, SyncGroupRequestV0, SyncGroupResponseV0,
    TopicAssignment,
};
pub use metadata::{
    BrokerV1, MetadataRequestV1, MetadataResponseV1, PartitionMetadataV1, TopicMetadataV1,
};
pub use offsets::{
    ListOffsetsRequestPartition, ListOffsetsRequestTopic, ListOffsetsRequestV1,
    ListOffsetsResponsePartition, ListOffsetsResponseTopic, ListOffsetsResponseV1,
    OffsetCommitRequestPartition, OffsetCommitRequestTopic, OffsetCommitRequestV2,
    OffsetCommitResponsePartition, OffsetCommitResponseTopic, OffsetCommitResponseV2,
    OffsetFetchRequestTopic, OffsetFetchRequestV1, OffsetFetchResponsePartition,
    OffsetFetchResponseTopic, OffsetFetchResponseV1,
};

/// Decode a complete request payload, requiring every byte to be consumed.
///
/// A short read means the frame was truncated mid-request; leftover bytes
/// mean the client sent more than the schema accounts for. Both are
/// protocol errors that tear the connection down.
pub fn decode_request<T: Decode>(payload: &[u8], api: &'static str) -> Result<T> {
    match T::decode(payload, 0) {
        None => Err(ProtocolError::MalformedRequest(api).into()),
        Some((next, _)) if next != payload.len() => {
            Err(ProtocolError::TrailingBytes(payload.len() - next, api).into())
        }
        Some((_, request)) => Ok(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use kafkamock_common::Error;

    use crate::codec::Encode;

    #[test]
    fn decode_request_requires_full_consumption() {
        let mut buf = BytesMut::new();
        HeartbeatRequestV0 {
            group_id: "g".to_string(),
            generation_id: 0,
            member_id: "m".to_string(),
        }
        .encode(&mut buf);
        buf.extend_from_slice(&[0xAA]);

        let err = decode_request::<HeartbeatRequestV0>(&buf, "Heartbeat").unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::TrailingBytes(1, "Heartbeat"))
        ));
    }

    #[test]
    fn decode_request_rejects_truncated_payloads() {
        let mut buf = BytesMut::new();
        HeartbeatRequestV0 {
            group_id: "g".to_string(),
            generation_id: 0,
            member_id: "m".to_string(),
        }
        .encode(&mut buf);

        let err =
            decode_request::<HeartbeatRequestV0>(&buf[..buf.len() - 1], "Heartbeat").unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::MalformedRequest("Heartbeat"))
        ));
    }
}
