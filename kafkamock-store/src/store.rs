//! Topic/partition store
//!
//! The store and topic maps are concurrent maps; each partition guards its
//! record log and committed-offset map with its own lock. Partition locks
//! are only ever held for short synchronous sections, never across an
//! await.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;

use kafkamock_common::{Offset, PartitionIndex, Timestamp};

use crate::record::{Record, RecordHeader};

/// Process-wide store: topic name -> topic. Shared by every connection and
/// retained across server restarts.
#[derive(Default)]
pub struct DataStore {
    topics: DashMap<String, Arc<Topic>>,
}

/// A topic: partition index -> partition.
#[derive(Default)]
pub struct Topic {
    partitions: DashMap<PartitionIndex, Arc<Partition>>,
}

/// A single partition: an append-only record log, an error code, optional
/// metadata, and the committed offset of each consumer group.
pub struct Partition {
    index: PartitionIndex,
    inner: Mutex<PartitionInner>,
}

struct PartitionInner {
    records: Vec<Arc<Record>>,
    group_committed_offsets: HashMap<String, Offset>,
    error_code: i16,
    metadata: Option<String>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a topic, or return the existing one.
    pub fn create_topic(&self, name: &str) -> Arc<Topic> {
        self.topics
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Topic::default()))
            .value()
            .clone()
    }

    pub fn get_topic(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.get(name).map(|entry| entry.value().clone())
    }

    /// Snapshot of every topic, for assignment building.
    pub fn topics(&self) -> Vec<(String, Arc<Topic>)> {
        self.topics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Topic {
    /// Create a partition, or return the existing one.
    pub fn create_partition(&self, index: PartitionIndex) -> Arc<Partition> {
        self.partitions
            .entry(index)
            .or_insert_with(|| {
                Arc::new(Partition {
                    index,
                    inner: Mutex::new(PartitionInner {
                        records: Vec::new(),
                        group_committed_offsets: HashMap::new(),
                        error_code: 0,
                        metadata: None,
                    }),
                })
            })
            .value()
            .clone()
    }

    pub fn get_partition(&self, index: PartitionIndex) -> Option<Arc<Partition>> {
        self.partitions.get(&index).map(|entry| entry.value().clone())
    }

    /// Snapshot of the partition indexes this topic holds.
    pub fn partition_indexes(&self) -> Vec<PartitionIndex> {
        self.partitions.iter().map(|entry| *entry.key()).collect()
    }
}

impl Partition {
    pub fn index(&self) -> PartitionIndex {
        self.index
    }

    pub fn error_code(&self) -> i16 {
        self.inner.lock().error_code
    }

    pub fn metadata(&self) -> Option<String> {
        self.inner.lock().metadata.clone()
    }

    /// Append a record; it takes the offset equal to the current length,
    /// so offsets stay dense and zero-based.
    pub fn append(
        &self,
        attributes: i8,
        timestamp: Timestamp,
        key: Option<Bytes>,
        value: Option<Bytes>,
        headers: Vec<RecordHeader>,
    ) {
        let record = Arc::new(Record {
            attributes,
            timestamp,
            key,
            value,
            headers,
        });
        self.inner.lock().records.push(record);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Snapshot the record at `offset`, if the log has reached it.
    pub fn record_at(&self, offset: usize) -> Option<Arc<Record>> {
        self.inner.lock().records.get(offset).cloned()
    }

    /// Run `f` against the record log under the partition lock.
    pub fn with_records<R>(&self, f: impl FnOnce(&[Arc<Record>]) -> R) -> R {
        let inner = self.inner.lock();
        f(&inner.records)
    }

    /// The committed offset of `group`, inserting 0 on first query.
    /// The side-effecting read is deliberate: a group becomes known to the
    /// partition the first time anything asks about it.
    pub fn group_committed_offset(&self, group: &str) -> Offset {
        let mut inner = self.inner.lock();
        match inner.group_committed_offsets.get(group) {
            Some(offset) => *offset,
            None => {
                inner.group_committed_offsets.insert(group.to_string(), 0);
                0
            }
        }
    }

    /// Unconditionally overwrite the committed offset of `group`.
    pub fn set_group_offset(&self, group: &str, offset: Offset) {
        self.inner
            .lock()
            .group_committed_offsets
            .insert(group.to_string(), offset);
    }

    /// Store `offset` for `group` only if it strictly exceeds the current
    /// value; returns whether the offset moved.
    pub fn commit_offset_if_greater(&self, group: &str, offset: Offset) -> bool {
        let mut inner = self.inner.lock();
        let current = inner.group_committed_offsets.get(group).copied().unwrap_or(0);
        if current < offset {
            inner.group_committed_offsets.insert(group.to_string(), offset);
            true
        } else {
            false
        }
    }
}
