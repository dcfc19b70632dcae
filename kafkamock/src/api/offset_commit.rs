//! OffsetCommit v2: offsets only ever move forward.

use tracing::trace;

use kafkamock_common::types::error_codes;
use kafkamock_common::Result;
use kafkamock_protocol::messages::{
    decode_request, OffsetCommitRequestV2, OffsetCommitResponsePartition,
    OffsetCommitResponseTopic, OffsetCommitResponseV2,
};

use crate::api::{respond, HandlerReply, RequestContext};

pub(crate) async fn offset_commit_v2(ctx: RequestContext) -> Result<HandlerReply> {
    let request: OffsetCommitRequestV2 = decode_request(&ctx.payload, "OffsetCommit")?;

    let mut topics = Vec::with_capacity(request.topics.len());
    for topic in &request.topics {
        let store_topic = ctx.conn.store().get_topic(&topic.name);

        let mut partitions = Vec::with_capacity(topic.partitions.len());
        for commit in &topic.partitions {
            let partition = store_topic
                .as_ref()
                .and_then(|t| t.get_partition(commit.partition_index));

            let error_code = match partition {
                Some(partition) => {
                    if partition
                        .commit_offset_if_greater(&request.group_id, commit.committed_offset)
                    {
                        trace!("kafka offset moved to {}", commit.committed_offset);
                    }
                    error_codes::NO_ERROR
                }
                None => error_codes::UNKNOWN_TOPIC_OR_PARTITION,
            };
            partitions.push(OffsetCommitResponsePartition {
                partition_index: commit.partition_index,
                error_code,
            });
        }

        topics.push(OffsetCommitResponseTopic {
            name: topic.name.clone(),
            partitions,
        });
    }

    respond(&OffsetCommitResponseV2 { topics })
}
