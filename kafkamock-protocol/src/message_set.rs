//! Legacy V1 message-set
//!
//! The batch format Fetch responses carry: an int32 total byte size
//! followed by packed messages, each
//!
//! ```text
//! int64 offset
//! int32 messageSize
//! int32 crc          // Castagnoli CRC-32 over the bytes after this field
//! int8  magicByte = 1
//! int8  attributes
//! int64 timestamp
//! nullable bytes key
//! nullable bytes value
//! ```
//!
//! Messages are encoded eagerly on append; the CRC is patched in once the
//! message body is in place.

use bytes::{BufMut, Bytes, BytesMut};
use crc::{Crc, CRC_32_ISCSI};

use crate::codec::{peek_i32, peek_i64, peek_i8, peek_nullable_bytes, peek_raw, put_nullable_bytes, Decode, Encode};

const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

const MAGIC_V1: i8 = 1;

/// Encoded size of a V1 message record with empty key and value: the
/// offset and size fields, crc, magic byte, attributes, timestamp and the
/// two length prefixes.
const MESSAGE_V1_OVERHEAD: usize = 34;

/// A single decoded V1 message, as the test-side client sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageV1 {
    pub offset: i64,
    pub attributes: i8,
    pub timestamp: i64,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

/// A V1 message-set under construction (or received off the wire).
#[derive(Debug, Clone, Default)]
pub struct MessageSetV1 {
    packed: BytesMut,
    next_offset: i64,
}

impl MessageSetV1 {
    /// An empty set whose first appended message takes `base_offset`.
    pub fn new(base_offset: i64) -> Self {
        Self {
            packed: BytesMut::new(),
            next_offset: base_offset,
        }
    }

    /// Append a message carrying `key`/`value` at the set's running offset.
    ///
    /// The post-append total size is predicted first; if it would exceed
    /// `max_size` the append is refused, the set is left untouched and
    /// `false` is returned.
    pub fn append_message(
        &mut self,
        timestamp: i64,
        key: Option<&[u8]>,
        value: Option<&[u8]>,
        max_size: usize,
    ) -> bool {
        let message_size =
            MESSAGE_V1_OVERHEAD + key.map_or(0, <[u8]>::len) + value.map_or(0, <[u8]>::len);
        if self.packed.len() + message_size > max_size {
            return false;
        }

        let out = &mut self.packed;
        out.put_i64(self.next_offset);
        out.put_i32(message_size as i32);
        let crc_at = out.len();
        out.put_i32(0);
        out.put_i8(MAGIC_V1);
        out.put_i8(0);
        out.put_i64(timestamp);
        put_nullable_bytes(out, key);
        put_nullable_bytes(out, value);

        let crc = CASTAGNOLI.checksum(&out[crc_at + 4..]);
        out[crc_at..crc_at + 4].copy_from_slice(&crc.to_be_bytes());

        self.next_offset += 1;
        true
    }

    /// The offset the next appended message would take.
    pub fn next_offset(&self) -> i64 {
        self.next_offset
    }

    /// Total byte size of the packed messages (the outer int32 value).
    pub fn total_size(&self) -> usize {
        self.packed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    /// Parse the packed messages, verifying each magic byte and checksum.
    /// Returns `None` if the set is malformed or a CRC does not match.
    pub fn messages(&self) -> Option<Vec<MessageV1>> {
        let buf: &[u8] = &self.packed;
        let mut messages = Vec::new();
        let mut pos = 0;
        while pos < buf.len() {
            let (next, offset) = peek_i64(buf, pos)?;
            let (next, _message_size) = peek_i32(buf, next)?;
            let (next, crc) = peek_i32(buf, next)?;
            let body_at = next;
            let (next, magic) = peek_i8(buf, next)?;
            let (next, attributes) = peek_i8(buf, next)?;
            let (next, timestamp) = peek_i64(buf, next)?;
            let (next, key) = peek_nullable_bytes(buf, next)?;
            let (next, value) = peek_nullable_bytes(buf, next)?;

            if magic != MAGIC_V1 {
                return None;
            }
            if CASTAGNOLI.checksum(&buf[body_at..next]) != crc as u32 {
                return None;
            }

            messages.push(MessageV1 {
                offset,
                attributes,
                timestamp,
                key,
                value,
            });
            pos = next;
        }
        Some(messages)
    }
}

impl Encode for MessageSetV1 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.packed.len() as i32);
        out.extend_from_slice(&self.packed);
    }
}

impl Decode for MessageSetV1 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, total) = peek_i32(buf, at)?;
        let (next, packed) = peek_raw(buf, next, total.max(0) as usize)?;
        Some((
            next,
            Self {
                packed: BytesMut::from(packed),
                next_offset: 0,
            },
        ))
    }
}
