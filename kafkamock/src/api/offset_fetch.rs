//! OffsetFetch v1: committed offsets for the partitions that exist.
//! Absent topics and partitions are omitted from the response.

use kafkamock_common::Result;
use kafkamock_protocol::messages::{
    decode_request, OffsetFetchRequestV1, OffsetFetchResponsePartition, OffsetFetchResponseTopic,
    OffsetFetchResponseV1,
};

use crate::api::{respond, HandlerReply, RequestContext};

pub(crate) async fn offset_fetch_v1(ctx: RequestContext) -> Result<HandlerReply> {
    let request: OffsetFetchRequestV1 = decode_request(&ctx.payload, "OffsetFetch")?;

    let mut topics = Vec::new();
    for topic in &request.topics {
        let Some(store_topic) = ctx.conn.store().get_topic(&topic.name) else {
            continue;
        };

        let mut partitions = Vec::new();
        for index in &topic.partition_indexes {
            let Some(partition) = store_topic.get_partition(*index) else {
                continue;
            };
            partitions.push(OffsetFetchResponsePartition {
                partition_index: partition.index(),
                committed_offset: partition.group_committed_offset(&request.group_id),
                metadata: partition.metadata(),
                error_code: partition.error_code(),
            });
        }

        if !partitions.is_empty() {
            topics.push(OffsetFetchResponseTopic {
                name: topic.name.clone(),
                partitions,
            });
        }
    }

    respond(&OffsetFetchResponseV1 { topics })
}
