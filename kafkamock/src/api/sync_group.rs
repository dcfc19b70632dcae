//! SyncGroup v0: hand the caller an assignment covering every topic and
//! partition in the store.

use bytes::BytesMut;

use kafkamock_common::error::ProtocolError;
use kafkamock_common::Result;
use kafkamock_protocol::codec::Encode;
use kafkamock_protocol::messages::{
    decode_request, MemberAssignment, SyncGroupRequestV0, SyncGroupResponseV0, TopicAssignment,
};
use kafkamock_store::DataStore;

use crate::api::{respond, HandlerReply, RequestContext};

pub(crate) async fn sync_group_v0(ctx: RequestContext) -> Result<HandlerReply> {
    let request: SyncGroupRequestV0 = decode_request(&ctx.payload, "SyncGroup")?;

    if !request.assignments.is_empty() {
        return Err(ProtocolError::HandlerRejected(
            "mock server is the leader - assignments in sync_group request are not supported"
                .to_string(),
        )
        .into());
    }

    let blob = make_member_assignment(ctx.conn.store());
    respond(&SyncGroupResponseV0 {
        error_code: 0,
        assignment: Some(blob.freeze()),
    })
}

/// Assign all topics and all their partitions to the caller.
fn make_member_assignment(store: &DataStore) -> BytesMut {
    let assignments = store
        .topics()
        .into_iter()
        .map(|(name, topic)| TopicAssignment {
            topic: name,
            partitions: topic.partition_indexes(),
        })
        .collect();

    let assignment = MemberAssignment {
        version: 1,
        assignments,
        user_data: None,
    };

    let mut blob = BytesMut::new();
    assignment.encode(&mut blob);
    blob
}
