//! Metadata v1: one broker, one partition per requested topic.

use kafkamock_common::Result;
use kafkamock_protocol::messages::{
    decode_request, BrokerV1, MetadataRequestV1, MetadataResponseV1, PartitionMetadataV1,
    TopicMetadataV1,
};

use crate::api::{respond, HandlerReply, RequestContext};

/// The node id this mock advertises as leader everywhere.
pub(crate) const LEADER_NODE: i32 = 100;

const CONTROLLER_ID: i32 = 500;

/// The single partition index every topic is advertised with.
const ADVERTISED_PARTITION: i32 = 2;

pub(crate) async fn metadata_v1(ctx: RequestContext) -> Result<HandlerReply> {
    let request: MetadataRequestV1 = decode_request(&ctx.payload, "Metadata")?;

    let topics = request
        .topics
        .iter()
        .map(|name| TopicMetadataV1 {
            error_code: 0,
            name: name.clone(),
            is_internal: false,
            partitions: vec![PartitionMetadataV1 {
                error_code: 0,
                partition_index: ADVERTISED_PARTITION,
                leader_id: LEADER_NODE,
                replica_nodes: vec![1],
                isr_nodes: vec![1],
            }],
        })
        .collect();

    respond(&MetadataResponseV1 {
        brokers: vec![BrokerV1 {
            node_id: LEADER_NODE,
            host: "localhost".to_string(),
            port: i32::from(ctx.conn.server_port()),
            rack: None,
        }],
        controller_id: CONTROLLER_ID,
        topics,
    })
}
