//! Primitive peek/emit codec
//!
//! All multi-byte integers are big-endian on the wire. Varints are Kafka's
//! little-endian base-128 encoding, with the signed forms zig-zag encoded.
//!
//! Every `peek_*` function takes the raw buffer and a logical offset and
//! returns `Option<(next_offset, value)>`; `None` signals insufficient
//! bytes and leaves no side effect, so a truncated frame can be retried
//! after more bytes arrive. Callers commit by discarding up to
//! `next_offset` only after a complete message decoded successfully.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

/// A value that can be written to the wire in Kafka's framing.
pub trait Encode {
    fn encode(&self, out: &mut BytesMut);
}

/// A value that can be peeked off the wire without consuming input.
pub trait Decode: Sized {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)>;
}

const MAX_VARINT32_BYTES: usize = 5;
const MAX_VARINT64_BYTES: usize = 10;

// ============================================================================
// Fixed-width peeks
// ============================================================================

/// Peek `len` raw bytes starting at `at`.
pub fn peek_raw(buf: &[u8], at: usize, len: usize) -> Option<(usize, &[u8])> {
    let next = at.checked_add(len)?;
    if buf.len() < next {
        return None;
    }
    Some((next, &buf[at..next]))
}

pub fn peek_bool(buf: &[u8], at: usize) -> Option<(usize, bool)> {
    let (next, data) = peek_raw(buf, at, 1)?;
    Some((next, data[0] != 0))
}

pub fn peek_i8(buf: &[u8], at: usize) -> Option<(usize, i8)> {
    let (next, data) = peek_raw(buf, at, 1)?;
    Some((next, data[0] as i8))
}

pub fn peek_u8(buf: &[u8], at: usize) -> Option<(usize, u8)> {
    let (next, data) = peek_raw(buf, at, 1)?;
    Some((next, data[0]))
}

pub fn peek_i16(buf: &[u8], at: usize) -> Option<(usize, i16)> {
    let (next, data) = peek_raw(buf, at, 2)?;
    Some((next, i16::from_be_bytes([data[0], data[1]])))
}

pub fn peek_u16(buf: &[u8], at: usize) -> Option<(usize, u16)> {
    let (next, data) = peek_raw(buf, at, 2)?;
    Some((next, u16::from_be_bytes([data[0], data[1]])))
}

pub fn peek_i32(buf: &[u8], at: usize) -> Option<(usize, i32)> {
    let (next, data) = peek_raw(buf, at, 4)?;
    Some((next, i32::from_be_bytes([data[0], data[1], data[2], data[3]])))
}

pub fn peek_u32(buf: &[u8], at: usize) -> Option<(usize, u32)> {
    let (next, data) = peek_raw(buf, at, 4)?;
    Some((next, u32::from_be_bytes([data[0], data[1], data[2], data[3]])))
}

pub fn peek_i64(buf: &[u8], at: usize) -> Option<(usize, i64)> {
    let (next, data) = peek_raw(buf, at, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(data);
    Some((next, i64::from_be_bytes(raw)))
}

pub fn peek_u64(buf: &[u8], at: usize) -> Option<(usize, u64)> {
    let (next, data) = peek_raw(buf, at, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(data);
    Some((next, u64::from_be_bytes(raw)))
}

pub fn peek_f64(buf: &[u8], at: usize) -> Option<(usize, f64)> {
    let (next, bits) = peek_u64(buf, at)?;
    Some((next, f64::from_bits(bits)))
}

pub fn peek_uuid(buf: &[u8], at: usize) -> Option<(usize, Uuid)> {
    let (next, data) = peek_raw(buf, at, 16)?;
    let mut raw = [0u8; 16];
    raw.copy_from_slice(data);
    Some((next, Uuid::from_bytes(raw)))
}

// ============================================================================
// Varint peeks
// ============================================================================

/// Peek an unsigned 32-bit varint (1-5 bytes). Over-long input past the
/// width limit is treated the same as a short read.
pub fn peek_var_u32(buf: &[u8], at: usize) -> Option<(usize, u32)> {
    let mut next = at;
    let limit = at.checked_add(MAX_VARINT32_BYTES)?;
    let mut value: u32 = 0;
    let mut shift: u32 = 0;
    loop {
        if next >= buf.len() || next >= limit {
            return None;
        }
        let by = buf[next];
        next += 1;

        value |= u32::from(by & 0x7F).checked_shl(shift).unwrap_or(0);
        if by & 0x80 == 0 {
            return Some((next, value));
        }
        shift += 7;
    }
}

/// Peek an unsigned 64-bit varint (1-10 bytes).
pub fn peek_var_u64(buf: &[u8], at: usize) -> Option<(usize, u64)> {
    let mut next = at;
    let limit = at.checked_add(MAX_VARINT64_BYTES)?;
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        if next >= buf.len() || next >= limit {
            return None;
        }
        let by = buf[next];
        next += 1;

        value |= u64::from(by & 0x7F).checked_shl(shift).unwrap_or(0);
        if by & 0x80 == 0 {
            return Some((next, value));
        }
        shift += 7;
    }
}

/// Peek a zig-zag encoded signed 32-bit varint.
pub fn peek_var_i32(buf: &[u8], at: usize) -> Option<(usize, i32)> {
    let (next, raw) = peek_var_u32(buf, at)?;
    Some((next, ((raw >> 1) as i32) ^ -((raw & 1) as i32)))
}

/// Peek a zig-zag encoded signed 64-bit varint.
pub fn peek_var_i64(buf: &[u8], at: usize) -> Option<(usize, i64)> {
    let (next, raw) = peek_var_u64(buf, at)?;
    Some((next, ((raw >> 1) as i64) ^ -((raw & 1) as i64)))
}

// ============================================================================
// Strings and bytes
// ============================================================================

/// Peek an int16-length-prefixed string; length -1 decodes to `None`.
pub fn peek_nullable_string(buf: &[u8], at: usize) -> Option<(usize, Option<String>)> {
    let (next, len) = peek_i16(buf, at)?;
    if len < 0 {
        return Some((next, None));
    }
    let (next, data) = peek_raw(buf, next, len as usize)?;
    Some((next, Some(String::from_utf8_lossy(data).into_owned())))
}

/// Peek an int16-length-prefixed string; a null encoding decodes to `""`.
pub fn peek_string(buf: &[u8], at: usize) -> Option<(usize, String)> {
    let (next, s) = peek_nullable_string(buf, at)?;
    Some((next, s.unwrap_or_default()))
}

/// Peek int32-length-prefixed bytes; length -1 decodes to `None`.
pub fn peek_nullable_bytes(buf: &[u8], at: usize) -> Option<(usize, Option<Bytes>)> {
    let (next, len) = peek_i32(buf, at)?;
    if len < 0 {
        return Some((next, None));
    }
    let (next, data) = peek_raw(buf, next, len as usize)?;
    Some((next, Some(Bytes::copy_from_slice(data))))
}

/// Peek varint-length-prefixed bytes; an encoded length of 0 means null,
/// otherwise the encoded length is the actual length plus one.
pub fn peek_compact_nullable_bytes(buf: &[u8], at: usize) -> Option<(usize, Option<Bytes>)> {
    let (next, len) = peek_var_u32(buf, at)?;
    if len == 0 {
        return Some((next, None));
    }
    let (next, data) = peek_raw(buf, next, len as usize - 1)?;
    Some((next, Some(Bytes::copy_from_slice(data))))
}

/// Peek a compact nullable string.
pub fn peek_compact_nullable_string(buf: &[u8], at: usize) -> Option<(usize, Option<String>)> {
    let (next, data) = peek_compact_nullable_bytes(buf, at)?;
    Some((next, data.map(|d| String::from_utf8_lossy(&d).into_owned())))
}

/// Peek a compact string; a null encoding decodes to `""`.
pub fn peek_compact_string(buf: &[u8], at: usize) -> Option<(usize, String)> {
    let (next, s) = peek_compact_nullable_string(buf, at)?;
    Some((next, s.unwrap_or_default()))
}

// ============================================================================
// Emit side
// ============================================================================

pub fn put_bool(out: &mut BytesMut, v: bool) {
    out.put_u8(u8::from(v));
}

/// Emit an unsigned 32-bit varint.
pub fn put_var_u32(out: &mut BytesMut, mut v: u32) {
    loop {
        let by = (v & 0x7F) as u8;
        if v > 0x7F {
            out.put_u8(by | 0x80);
            v >>= 7;
        } else {
            out.put_u8(by);
            break;
        }
    }
}

/// Emit an unsigned 64-bit varint.
pub fn put_var_u64(out: &mut BytesMut, mut v: u64) {
    loop {
        let by = (v & 0x7F) as u8;
        if v > 0x7F {
            out.put_u8(by | 0x80);
            v >>= 7;
        } else {
            out.put_u8(by);
            break;
        }
    }
}

/// Emit a zig-zag encoded signed 32-bit varint.
pub fn put_var_i32(out: &mut BytesMut, v: i32) {
    put_var_u32(out, (v.wrapping_shl(1) ^ (v >> 31)) as u32);
}

/// Emit a zig-zag encoded signed 64-bit varint.
pub fn put_var_i64(out: &mut BytesMut, v: i64) {
    put_var_u64(out, (v.wrapping_shl(1) ^ (v >> 63)) as u64);
}

pub fn put_uuid(out: &mut BytesMut, v: &Uuid) {
    out.put_slice(v.as_bytes());
}

pub fn put_string(out: &mut BytesMut, v: &str) {
    put_nullable_string(out, Some(v));
}

pub fn put_nullable_string(out: &mut BytesMut, v: Option<&str>) {
    match v {
        None => out.put_i16(-1),
        Some(s) => {
            out.put_i16(s.len() as i16);
            out.put_slice(s.as_bytes());
        }
    }
}

pub fn put_nullable_bytes(out: &mut BytesMut, v: Option<&[u8]>) {
    match v {
        None => out.put_i32(-1),
        Some(data) => {
            out.put_i32(data.len() as i32);
            out.put_slice(data);
        }
    }
}

pub fn put_compact_string(out: &mut BytesMut, v: &str) {
    put_compact_nullable_string(out, Some(v));
}

pub fn put_compact_nullable_string(out: &mut BytesMut, v: Option<&str>) {
    put_compact_nullable_bytes(out, v.map(str::as_bytes));
}

pub fn put_compact_nullable_bytes(out: &mut BytesMut, v: Option<&[u8]>) {
    match v {
        None => put_var_u32(out, 0),
        Some(data) => {
            put_var_u32(out, data.len() as u32 + 1);
            out.put_slice(data);
        }
    }
}

// ============================================================================
// Arrays
// ============================================================================

/// Emit a normal array: int32 count (-1 for null) followed by the elements.
pub fn put_array<T: Encode>(out: &mut BytesMut, items: Option<&[T]>) {
    match items {
        None => out.put_i32(-1),
        Some(v) => {
            out.put_i32(v.len() as i32);
            for item in v {
                item.encode(out);
            }
        }
    }
}

/// Emit a compact array: varint count (0 for null, length + 1 otherwise).
pub fn put_compact_array<T: Encode>(out: &mut BytesMut, items: Option<&[T]>) {
    match items {
        None => put_var_u32(out, 0),
        Some(v) => {
            put_var_u32(out, v.len() as u32 + 1);
            for item in v {
                item.encode(out);
            }
        }
    }
}

/// Peek a normal array; an int32 count of -1 decodes to `None`.
pub fn peek_array<T: Decode>(buf: &[u8], at: usize) -> Option<(usize, Option<Vec<T>>)> {
    let (mut next, len) = peek_i32(buf, at)?;
    if len < 0 {
        return Some((next, None));
    }
    let mut items = Vec::new();
    for _ in 0..len {
        let (n, item) = T::decode(buf, next)?;
        next = n;
        items.push(item);
    }
    Some((next, Some(items)))
}

/// Peek a compact array; a varint count of 0 decodes to `None`.
pub fn peek_compact_array<T: Decode>(buf: &[u8], at: usize) -> Option<(usize, Option<Vec<T>>)> {
    let (mut next, len) = peek_var_u32(buf, at)?;
    if len == 0 {
        return Some((next, None));
    }
    let mut items = Vec::new();
    for _ in 0..len - 1 {
        let (n, item) = T::decode(buf, next)?;
        next = n;
        items.push(item);
    }
    Some((next, Some(items)))
}

// ============================================================================
// Trait impls for primitives
// ============================================================================

macro_rules! fixed_width_impls {
    ($($ty:ty => $peek:ident, $put:ident;)*) => {
        $(
            impl Encode for $ty {
                fn encode(&self, out: &mut BytesMut) {
                    out.$put(*self);
                }
            }

            impl Decode for $ty {
                fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
                    $peek(buf, at)
                }
            }
        )*
    };
}

fixed_width_impls! {
    i8 => peek_i8, put_i8;
    u8 => peek_u8, put_u8;
    i16 => peek_i16, put_i16;
    u16 => peek_u16, put_u16;
    i32 => peek_i32, put_i32;
    u32 => peek_u32, put_u32;
    i64 => peek_i64, put_i64;
    u64 => peek_u64, put_u64;
}

impl Encode for bool {
    fn encode(&self, out: &mut BytesMut) {
        put_bool(out, *self);
    }
}

impl Decode for bool {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        peek_bool(buf, at)
    }
}

impl Encode for f64 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_f64(*self);
    }
}

impl Decode for f64 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        peek_f64(buf, at)
    }
}

impl Encode for String {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, self);
    }
}

impl Decode for String {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        peek_string(buf, at)
    }
}

impl Encode for Uuid {
    fn encode(&self, out: &mut BytesMut) {
        put_uuid(out, self);
    }
}

impl Decode for Uuid {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        peek_uuid(buf, at)
    }
}
