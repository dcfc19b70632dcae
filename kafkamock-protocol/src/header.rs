//! Kafka request header (v1)
//!
//! The only header form the mock accepts: api key, api version,
//! correlation id, a length-prefixed client id, and a tagged fields
//! section only when the API's schema declares tagged fields at that
//! version.

use bytes::{BufMut, BytesMut};

use crate::codec::{peek_i16, peek_i32, peek_string, put_string};
use crate::tags::{peek_tags, put_tags, TagSchema, TagValueMap};

/// Parsed request header.
#[derive(Debug, Clone)]
pub struct RequestHeader {
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
    pub client_id: String,
    /// Header tags, present only for (api key, version) pairs whose schema
    /// carries them.
    pub tags: Option<TagValueMap>,
}

impl RequestHeader {
    /// Peek a header off `buf`. `has_header_tags` reports whether the
    /// (api key, version) pair carries a tagged fields section; it is
    /// consulted once the fixed header fields are known.
    pub fn peek(
        buf: &[u8],
        at: usize,
        has_header_tags: impl FnOnce(i16, i16) -> bool,
    ) -> Option<(usize, Self)> {
        let (next, api_key) = peek_i16(buf, at)?;
        let (next, api_version) = peek_i16(buf, next)?;
        let (next, correlation_id) = peek_i32(buf, next)?;
        let (next, client_id) = peek_string(buf, next)?;

        let (next, tags) = if has_header_tags(api_key, api_version) {
            let (next, tags) = peek_tags(buf, next, &TagSchema::new())?;
            (next, Some(tags))
        } else {
            (next, None)
        };

        Some((
            next,
            Self {
                api_key,
                api_version,
                correlation_id,
                client_id,
                tags,
            },
        ))
    }

    /// Emit the header (used by the test-side wire client).
    pub fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.api_key);
        out.put_i16(self.api_version);
        out.put_i32(self.correlation_id);
        put_string(out, &self.client_id);
        if let Some(tags) = &self.tags {
            put_tags(out, tags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RequestHeader {
        RequestHeader {
            api_key: 1,
            api_version: 2,
            correlation_id: 77,
            client_id: "kafkamock-test".to_string(),
            tags: None,
        }
    }

    #[test]
    fn round_trip_without_tags() {
        let mut buf = BytesMut::new();
        sample().encode(&mut buf);

        let (next, header) = RequestHeader::peek(&buf, 0, |_, _| false).unwrap();
        assert_eq!(next, buf.len());
        assert_eq!(header.api_key, 1);
        assert_eq!(header.api_version, 2);
        assert_eq!(header.correlation_id, 77);
        assert_eq!(header.client_id, "kafkamock-test");
        assert!(header.tags.is_none());
    }

    #[test]
    fn round_trip_with_empty_tag_section() {
        let mut header = sample();
        header.tags = Some(TagValueMap::new());

        let mut buf = BytesMut::new();
        header.encode(&mut buf);

        let (next, decoded) = RequestHeader::peek(&buf, 0, |key, ver| key == 1 && ver == 2).unwrap();
        assert_eq!(next, buf.len());
        assert_eq!(decoded.tags, Some(TagValueMap::new()));
    }

    #[test]
    fn truncated_header_is_short() {
        let mut buf = BytesMut::new();
        sample().encode(&mut buf);

        for cut in 0..buf.len() {
            assert!(RequestHeader::peek(&buf[..cut], 0, |_, _| false).is_none());
        }
    }
}
