//! Common type definitions for kafkamock

/// Timestamp in milliseconds since Unix epoch
pub type Timestamp = i64;

/// Offset type for positions in a partition log
pub type Offset = i64;

/// Partition identifier
pub type PartitionIndex = i32;

/// 16-bit integer naming a Kafka RPC family (Fetch = 1, Metadata = 3, ...)
pub type ApiKey = i16;

/// Kafka wire error codes emitted by the mock.
///
/// Everything the mock answers is either a success or a missing
/// topic/partition; the rest of Kafka's taxonomy never comes up.
pub mod error_codes {
    /// No error
    pub const NO_ERROR: i16 = 0;

    /// The request is for a topic or partition that does not exist
    pub const UNKNOWN_TOPIC_OR_PARTITION: i16 = 3;
}
