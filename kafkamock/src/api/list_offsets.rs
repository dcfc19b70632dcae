//! ListOffsets v1.
//!
//! Timestamp -1 asks for the latest offset, -2 for the earliest. Any other
//! value scans the log from the tail for the newest record older than the
//! requested timestamp and answers the offset right after it.

use chrono::Utc;

use kafkamock_common::types::error_codes;
use kafkamock_common::Result;
use kafkamock_protocol::messages::{
    decode_request, ListOffsetsRequestV1, ListOffsetsResponsePartition, ListOffsetsResponseTopic,
    ListOffsetsResponseV1,
};

use crate::api::{respond, HandlerReply, RequestContext};

const TIMESTAMP_LATEST: i64 = -1;
const TIMESTAMP_EARLIEST: i64 = -2;

pub(crate) async fn list_offsets_v1(ctx: RequestContext) -> Result<HandlerReply> {
    let request: ListOffsetsRequestV1 = decode_request(&ctx.payload, "ListOffsets")?;

    let mut topics = Vec::with_capacity(request.topics.len());
    for topic in &request.topics {
        let Some(store_topic) = ctx.conn.store().get_topic(&topic.name) else {
            continue;
        };

        let mut partitions = Vec::with_capacity(topic.partitions.len());
        for lookup in &topic.partitions {
            let response = match store_topic.get_partition(lookup.partition_index) {
                None => ListOffsetsResponsePartition {
                    partition_index: lookup.partition_index,
                    error_code: error_codes::UNKNOWN_TOPIC_OR_PARTITION,
                    timestamp: 0,
                    offset: 0,
                },
                Some(partition) => match lookup.timestamp {
                    TIMESTAMP_LATEST => ListOffsetsResponsePartition {
                        partition_index: lookup.partition_index,
                        error_code: 0,
                        timestamp: Utc::now().timestamp_millis(),
                        offset: partition.len() as i64,
                    },
                    TIMESTAMP_EARLIEST => {
                        // a non-empty log answers the first record's
                        // timestamp but leaves the offset at zero
                        let timestamp = partition
                            .with_records(|records| records.first().map(|r| r.timestamp))
                            .unwrap_or(0);
                        ListOffsetsResponsePartition {
                            partition_index: lookup.partition_index,
                            error_code: 0,
                            timestamp,
                            offset: 0,
                        }
                    }
                    requested => {
                        let (timestamp, offset) = partition.with_records(|records| {
                            let mut timestamp = 0;
                            let mut offset = 0;
                            for i in (0..records.len()).rev() {
                                timestamp = records[i].timestamp;
                                if records[i].timestamp < requested {
                                    offset = i as i64 + 1;
                                    break;
                                }
                            }
                            (timestamp, offset)
                        });
                        ListOffsetsResponsePartition {
                            partition_index: lookup.partition_index,
                            error_code: 0,
                            timestamp,
                            offset,
                        }
                    }
                },
            };
            partitions.push(response);
        }

        topics.push(ListOffsetsResponseTopic {
            name: topic.name.clone(),
            partitions,
        });
    }

    respond(&ListOffsetsResponseV1 { topics })
}
