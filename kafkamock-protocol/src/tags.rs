//! Tagged fields sections
//!
//! The extensible trailing section of a frame: a varint entry count, then
//! `(varint tag, varint length, value bytes)` triples in ascending tag
//! order. Tags the schema knows about are decoded recursively; unknown tags
//! are preserved as their raw on-wire bytes so they survive a round trip
//! untouched.

use std::collections::BTreeMap;

use bytes::{Bytes, BytesMut};

use crate::codec::{
    peek_bool, peek_compact_nullable_bytes, peek_compact_string, peek_i16, peek_i32, peek_i64,
    peek_i8, peek_nullable_bytes, peek_raw, peek_string, peek_var_i32, peek_var_i64, peek_var_u32,
    put_bool, put_compact_nullable_bytes, put_compact_string, put_nullable_bytes, put_string,
    put_var_i32, put_var_i64, put_var_u32,
};

/// Wire type of a known tag, as declared by a message schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    VarInt,
    VarInt64,
    String,
    CompactString,
    Bytes,
    CompactBytes,
}

/// A decoded tag value, or the raw bytes of a tag the schema does not know.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    Raw(Bytes),
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    VarInt(i32),
    VarInt64(i64),
    String(String),
    CompactString(String),
    Bytes(Option<Bytes>),
    CompactBytes(Option<Bytes>),
}

/// Tag id to expected wire type, for the tags a schema declares.
pub type TagSchema = BTreeMap<u32, TagType>;

/// Decoded tagged fields section, keyed by tag id.
pub type TagValueMap = BTreeMap<u32, TagValue>;

impl TagValue {
    fn encode(&self, out: &mut BytesMut) {
        use bytes::BufMut;

        match self {
            TagValue::Raw(data) => out.put_slice(data),
            TagValue::Bool(v) => put_bool(out, *v),
            TagValue::Int8(v) => out.put_i8(*v),
            TagValue::Int16(v) => out.put_i16(*v),
            TagValue::Int32(v) => out.put_i32(*v),
            TagValue::Int64(v) => out.put_i64(*v),
            TagValue::VarInt(v) => put_var_i32(out, *v),
            TagValue::VarInt64(v) => put_var_i64(out, *v),
            TagValue::String(v) => put_string(out, v),
            TagValue::CompactString(v) => put_compact_string(out, v),
            TagValue::Bytes(v) => put_nullable_bytes(out, v.as_deref()),
            TagValue::CompactBytes(v) => put_compact_nullable_bytes(out, v.as_deref()),
        }
    }
}

fn peek_typed(buf: &[u8], at: usize, ty: TagType) -> Option<(usize, TagValue)> {
    match ty {
        TagType::Bool => peek_bool(buf, at).map(|(n, v)| (n, TagValue::Bool(v))),
        TagType::Int8 => peek_i8(buf, at).map(|(n, v)| (n, TagValue::Int8(v))),
        TagType::Int16 => peek_i16(buf, at).map(|(n, v)| (n, TagValue::Int16(v))),
        TagType::Int32 => peek_i32(buf, at).map(|(n, v)| (n, TagValue::Int32(v))),
        TagType::Int64 => peek_i64(buf, at).map(|(n, v)| (n, TagValue::Int64(v))),
        TagType::VarInt => peek_var_i32(buf, at).map(|(n, v)| (n, TagValue::VarInt(v))),
        TagType::VarInt64 => peek_var_i64(buf, at).map(|(n, v)| (n, TagValue::VarInt64(v))),
        TagType::String => peek_string(buf, at).map(|(n, v)| (n, TagValue::String(v))),
        TagType::CompactString => {
            peek_compact_string(buf, at).map(|(n, v)| (n, TagValue::CompactString(v)))
        }
        TagType::Bytes => peek_nullable_bytes(buf, at).map(|(n, v)| (n, TagValue::Bytes(v))),
        TagType::CompactBytes => {
            peek_compact_nullable_bytes(buf, at).map(|(n, v)| (n, TagValue::CompactBytes(v)))
        }
    }
}

/// Peek a tagged fields section. Tags present in `schema` decode to their
/// typed value; all others are captured as raw bytes.
pub fn peek_tags(buf: &[u8], at: usize, schema: &TagSchema) -> Option<(usize, TagValueMap)> {
    let (mut next, count) = peek_var_u32(buf, at)?;

    let mut tags = TagValueMap::new();
    for _ in 0..count {
        let (n, tag) = peek_var_u32(buf, next)?;
        let (n, tag_len) = peek_var_u32(buf, n)?;

        match schema.get(&tag) {
            None => {
                let (n, data) = peek_raw(buf, n, tag_len as usize)?;
                tags.insert(tag, TagValue::Raw(Bytes::copy_from_slice(data)));
                next = n;
            }
            Some(ty) => {
                let (n, value) = peek_typed(buf, n, *ty)?;
                tags.insert(tag, value);
                next = n;
            }
        }
    }

    Some((next, tags))
}

/// Emit a tagged fields section; entries go out in ascending tag order.
pub fn put_tags(out: &mut BytesMut, tags: &TagValueMap) {
    put_var_u32(out, tags.len() as u32);

    for (tag, value) in tags {
        put_var_u32(out, *tag);

        let mut scratch = BytesMut::new();
        value.encode(&mut scratch);

        put_var_u32(out, scratch.len() as u32);
        out.extend_from_slice(&scratch);
    }
}
