//! Record types

use bytes::Bytes;

use kafkamock_common::Timestamp;

/// A record in a partition log. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Record {
    /// 8-bit attribute flags
    pub attributes: i8,
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Optional opaque key
    pub key: Option<Bytes>,
    /// Optional opaque value
    pub value: Option<Bytes>,
    /// Record headers, in insertion order
    pub headers: Vec<RecordHeader>,
}

/// A (key, value) record header.
#[derive(Debug, Clone)]
pub struct RecordHeader {
    pub key: String,
    pub value: Bytes,
}
