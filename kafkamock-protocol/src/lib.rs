//! Kafka wire protocol codec
//!
//! Implements the subset of the Kafka wire format the mock broker speaks:
//! - Primitive peek/emit codec (fixed-width big-endian integers, zig-zag
//!   varints, length-prefixed and compact strings/bytes, UUIDs, arrays)
//! - Tagged fields sections
//! - The legacy V1 message-set emitted by Fetch
//! - Typed request/response messages for the supported API versions
//!
//! Decoding follows a peek-without-commit model: every decode reads from a
//! byte slice at a logical offset and returns `Option<(next_offset, value)>`.
//! `None` means the input is too short; nothing is consumed and the caller
//! can retry verbatim once more bytes have arrived.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod header;
pub mod message_set;
pub mod messages;
pub mod tags;

pub use codec::{Decode, Encode};
pub use header::RequestHeader;
pub use message_set::{MessageSetV1, MessageV1};
pub use tags::{TagSchema, TagValue, TagValueMap};
