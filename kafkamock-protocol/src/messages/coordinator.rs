//! FindCoordinator v0 messages

use bytes::{BufMut, BytesMut};

use crate::codec::{peek_i16, peek_i32, peek_string, put_string, Decode, Encode};

/// FindCoordinator request, version 0. `key` is the consumer group id.
#[derive(Debug, Clone)]
pub struct FindCoordinatorRequestV0 {
    pub key: String,
}

impl Encode for FindCoordinatorRequestV0 {
    fn encode(&self, out: &mut BytesMut) {
        put_string(out, &self.key);
    }
}

impl Decode for FindCoordinatorRequestV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, key) = peek_string(buf, at)?;
        Some((next, Self { key }))
    }
}

/// FindCoordinator response, version 0.
#[derive(Debug, Clone)]
pub struct FindCoordinatorResponseV0 {
    pub error_code: i16,
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

impl Encode for FindCoordinatorResponseV0 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i16(self.error_code);
        out.put_i32(self.node_id);
        put_string(out, &self.host);
        out.put_i32(self.port);
    }
}

impl Decode for FindCoordinatorResponseV0 {
    fn decode(buf: &[u8], at: usize) -> Option<(usize, Self)> {
        let (next, error_code) = peek_i16(buf, at)?;
        let (next, node_id) = peek_i32(buf, next)?;
        let (next, host) = peek_string(buf, next)?;
        let (next, port) = peek_i32(buf, next)?;
        Some((
            next,
            Self {
                error_code,
                node_id,
                host,
                port,
            },
        ))
    }
}
