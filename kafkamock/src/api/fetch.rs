//! Fetch v2: the long-poll engine.
//!
//! Each requested (topic, partition, offset) tuple gets a cursor that
//! drains new records into a V1 message-set, subject to the tuple's byte
//! cap. The poll loop keeps going until the MaxWait deadline, server
//! cancellation or client disconnect - except that the first record any
//! cursor produces collapses the deadline, so callers get at-least-one-
//! record latency instead of always waiting out MaxWait.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use kafkamock_common::Result;
use kafkamock_protocol::messages::{
    decode_request, FetchRequestV2, FetchResponsePartition, FetchResponseTopic, FetchResponseV2,
};
use kafkamock_protocol::MessageSetV1;
use kafkamock_store::Partition;

use crate::api::{respond, HandlerReply, RequestContext};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct FetchCursor {
    /// Cleared once the cursor is done: partition missing, log drained, or
    /// the byte cap hit.
    partition: Option<Arc<Partition>>,
    max_bytes: usize,
    set: MessageSetV1,
}

pub(crate) async fn fetch_v2(ctx: RequestContext) -> Result<HandlerReply> {
    let request: FetchRequestV2 = decode_request(&ctx.payload, "Fetch")?;

    // establish which topics/partitions to fetch
    let mut cursors = Vec::new();
    for topic in &request.topics {
        let store_topic = ctx.conn.store().get_topic(&topic.topic);
        for partition in &topic.partitions {
            let partition_ref = store_topic
                .as_ref()
                .and_then(|t| t.get_partition(partition.partition));
            cursors.push(FetchCursor {
                partition: partition_ref,
                max_bytes: usize::try_from(partition.partition_max_bytes).unwrap_or(0),
                set: MessageSetV1::new(partition.fetch_offset),
            });
        }
    }

    let max_wait = Duration::from_millis(u64::try_from(request.max_wait_ms).unwrap_or(0));
    let mut deadline = Instant::now() + max_wait;
    loop {
        let mut produced = false;
        for cursor in &mut cursors {
            let Some(partition) = &cursor.partition else {
                continue;
            };

            let offset = usize::try_from(cursor.set.next_offset()).unwrap_or(usize::MAX);
            let record = partition.record_at(offset);

            let appended = record.as_ref().is_some_and(|record| {
                cursor.set.append_message(
                    record.timestamp,
                    record.key.as_deref(),
                    record.value.as_deref(),
                    cursor.max_bytes,
                )
            });
            if appended {
                produced = true;
                // return promptly now that there is something to deliver
                deadline = Instant::now();
            } else {
                cursor.partition = None;
            }
        }

        if !produced {
            if Instant::now() >= deadline {
                break;
            }
            if ctx.conn.is_cancelled() {
                break;
            }
            if !ctx.conn.is_connected().await {
                break;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    let mut cursors = cursors.into_iter();
    let mut responses = Vec::with_capacity(request.topics.len());
    for topic in &request.topics {
        let mut partitions = Vec::with_capacity(topic.partitions.len());
        for partition in &topic.partitions {
            let cursor = cursors
                .next()
                .ok_or_else(|| kafkamock_common::Error::Internal("fetch cursor underrun".into()))?;
            partitions.push(FetchResponsePartition {
                partition_index: partition.partition,
                error_code: 0,
                high_watermark: cursor.set.next_offset(),
                records: cursor.set,
            });
        }
        responses.push(FetchResponseTopic {
            topic: topic.topic.clone(),
            partitions,
        });
    }

    respond(&FetchResponseV2 {
        throttle_time_ms: 0,
        responses,
    })
}
