//! ApiVersions v0 messages. The v0 request has no body.

use bytes::{BufMut, BytesMut};

use crate::codec::{peek_array, peek_i16, put_array, Decode, Encode};

/// ApiVersions response, version 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsResponseV0 {
    pub error_code: i16,
    pub api_keys: Vec<ApiVersionRange>,
}

/// One advertised API: its key and the inclusive version range served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionRange {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

impl Encode for ApiVersionsResponseV0 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
        put_array(out, Some(&self.api_keys));
    }
}

impl Decode for ApiVersionsResponseV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        let (next, api_keys) = peek_array(buf, next)?;
        Some((
            next,
            Self {
                error_code,
                api_keys: api_keys.unwrap_or_default(),
            },
        ))
    }
}

impl Encode for ApiVersionRange {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.api_key);
        out.put_i16(self.min_version);
        out.put_i16(self.max_version);
    }
}

impl Decode for ApiVersionRange {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, api_key) = peek_i16(buf, at)?;
        let (next, min_version) = peek_i16(buf, next)?;
        let (next, max_version) = peek_i16(buf, next)?;
        Some((
            next,
            Self {
                api_key,
                min_version,
                max_version,
            },
        ))
    }
}
