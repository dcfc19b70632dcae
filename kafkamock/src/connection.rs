//! Per-connection frame assembly and dispatch
//!
//! Each accepted socket gets one task running [`run_connection`]. The task
//! grows an inbound buffer from socket reads under a short deadline (so
//! server cancellation is observed promptly), carves out length-prefixed
//! frames, parses the request header, routes to the registered handler and
//! writes back the framed response under the request's correlation id.
//!
//! Lifecycle: while the server's cancellation signal is clear the
//! connection is open. Once it fires, frames that were assembled but not
//! yet dispatched are discarded, the in-flight handler (if any) finishes
//! and its response is flushed, and the socket closes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use kafkamock_common::error::{NetworkError, ProtocolError};
use kafkamock_common::{Error, Result};
use kafkamock_protocol::tags::put_tags;
use kafkamock_protocol::RequestHeader;
use kafkamock_store::DataStore;

use crate::api::{self, RequestContext};

/// How long a socket read may block before the loop re-checks cancellation.
const READ_DEADLINE: Duration = Duration::from_millis(100);

/// How long the liveness probe waits for the peek to complete.
const PROBE_DEADLINE: Duration = Duration::from_millis(1);

const INBOUND_BUFFER_CAPACITY: usize = 8192;

/// Shared per-connection state, visible to API handlers.
pub(crate) struct ClientConnection {
    store: Arc<DataStore>,
    cancel: CancellationToken,
    server_port: u16,
    peer: SocketAddr,
    reader: tokio::sync::Mutex<OwnedReadHalf>,
}

impl ClientConnection {
    pub(crate) fn new(
        store: Arc<DataStore>,
        cancel: CancellationToken,
        server_port: u16,
        peer: SocketAddr,
        reader: OwnedReadHalf,
    ) -> Self {
        Self {
            store,
            cancel,
            server_port,
            peer,
            reader: tokio::sync::Mutex::new(reader),
        }
    }

    pub(crate) fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server_port
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Liveness check: a bounded peek on the read half. The read half is
    /// idle while a handler runs (there is no pipelining), so the probe
    /// does not race frame assembly, and peeking consumes nothing.
    pub(crate) async fn is_connected(&self) -> bool {
        let Ok(mut reader) = self.reader.try_lock() else {
            return true;
        };
        let mut probe = [0u8; 1];
        match timeout(PROBE_DEADLINE, reader.peek(&mut probe)).await {
            Ok(Ok(0)) | Ok(Err(_)) => false,
            Ok(Ok(_)) => true,
            // nothing to peek yet; the socket is still up
            Err(_) => true,
        }
    }
}

/// Carve the next complete frame out of `inbound`: an int32 payload size
/// (exclusive of itself) followed by that many bytes. Excess input stays
/// buffered for the next message.
fn next_frame(inbound: &mut BytesMut) -> Option<Bytes> {
    if inbound.len() < 4 {
        return None;
    }
    let size = i32::from_be_bytes([inbound[0], inbound[1], inbound[2], inbound[3]]);
    let size = usize::try_from(size).ok()?;
    if inbound.len() < 4 + size {
        return None;
    }
    inbound.advance(4);
    Some(inbound.split_to(size).freeze())
}

/// Classifies read/write failures that just mean the peer went away.
fn was_socket_closed(err: &std::io::Error) -> bool {
    use std::io::ErrorKind;

    matches!(
        err.kind(),
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
    )
}

/// Drive one client connection until the peer disconnects, the server
/// cancels, or a protocol error tears it down.
pub(crate) async fn run_connection(conn: Arc<ClientConnection>, mut writer: OwnedWriteHalf) {
    let mut inbound = BytesMut::with_capacity(INBOUND_BUFFER_CAPACITY);

    loop {
        while let Some(frame) = next_frame(&mut inbound) {
            if conn.is_cancelled() {
                // draining: the frame was assembled but never dispatched
                debug!("discarding inbound frame from {} during shutdown", conn.peer);
                return;
            }
            if let Err(err) = dispatch(&conn, frame, &mut writer).await {
                match err {
                    Error::Network(NetworkError::ConnectionClosed) => {}
                    Error::Protocol(err) => {
                        debug!("closing {} on protocol error: {err}", conn.peer);
                    }
                    err => error!("closing {} on error: {err}", conn.peer),
                }
                return;
            }
        }

        if conn.is_cancelled() {
            return;
        }

        let read = {
            let mut reader = conn.reader.lock().await;
            timeout(READ_DEADLINE, reader.read_buf(&mut inbound)).await
        };
        match read {
            // deadline elapsed without data; loop so cancellation is seen
            Err(_) => {}
            Ok(Ok(0)) => return,
            Ok(Ok(_)) => {}
            Ok(Err(err)) if was_socket_closed(&err) => return,
            Ok(Err(err)) => {
                error!("read error on {}: {err}", conn.peer);
                return;
            }
        }
    }
}

/// Parse the header of one frame, route it, and write the response.
async fn dispatch(
    conn: &Arc<ClientConnection>,
    frame: Bytes,
    writer: &mut OwnedWriteHalf,
) -> Result<()> {
    let registry = api::registry();

    let Some((header_end, header)) =
        RequestHeader::peek(&frame, 0, |key, version| registry.has_header_tags(key, version))
    else {
        return Err(ProtocolError::InvalidHeader.into());
    };

    trace!(
        "kafka request {}: {} v{}",
        header.correlation_id,
        api::api_name(header.api_key),
        header.api_version
    );
    if let Some(tags) = &header.tags {
        trace!("kafka request tags: {tags:?}");
    }

    let Some(handler) = registry.lookup(header.api_key, header.api_version) else {
        warn!(
            "kafka request for unsupported API {} {} v{}",
            header.api_key,
            api::api_name(header.api_key),
            header.api_version
        );
        return Err(ProtocolError::UnsupportedApi {
            api_key: header.api_key,
            api_version: header.api_version,
        }
        .into());
    };

    let correlation_id = header.correlation_id;
    let payload = frame.slice(header_end..);
    let reply = handler(RequestContext {
        payload,
        conn: conn.clone(),
        header,
    })
    .await?;

    let mut body = reply.body;
    if let Some(tags) = &reply.tags {
        put_tags(&mut body, tags);
    }

    let mut out = BytesMut::with_capacity(8 + body.len());
    out.put_i32(4 + body.len() as i32);
    out.put_i32(correlation_id);
    out.extend_from_slice(&body);

    match writer.write_all(&out).await {
        Ok(()) => {
            trace!("sent kafka response {}: {} bytes", correlation_id, out.len());
            Ok(())
        }
        // the client already went away; nobody is waiting for this response
        Err(err) if was_socket_closed(&err) => Err(NetworkError::ConnectionClosed.into()),
        Err(err) => {
            error!("error sending kafka response {correlation_id}: {err}");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_wait_for_the_full_payload() {
        let mut inbound = BytesMut::new();
        inbound.put_i32(6);
        inbound.put_slice(b"abc");

        assert!(next_frame(&mut inbound).is_none());
        assert_eq!(inbound.len(), 7);

        inbound.put_slice(b"def");
        let frame = next_frame(&mut inbound).unwrap();
        assert_eq!(&frame[..], b"abcdef");
        assert!(inbound.is_empty());
    }

    #[test]
    fn excess_bytes_stay_for_the_next_frame() {
        let mut inbound = BytesMut::new();
        inbound.put_i32(2);
        inbound.put_slice(b"hi");
        inbound.put_i32(3);
        inbound.put_slice(b"the rest");

        let frame = next_frame(&mut inbound).unwrap();
        assert_eq!(&frame[..], b"hi");

        let frame = next_frame(&mut inbound).unwrap();
        assert_eq!(&frame[..], b"the");
        assert_eq!(&inbound[..], b" rest");
    }

    #[test]
    fn closed_socket_predicate() {
        use std::io::{Error, ErrorKind};

        assert!(was_socket_closed(&Error::from(ErrorKind::UnexpectedEof)));
        assert!(was_socket_closed(&Error::from(ErrorKind::ConnectionReset)));
        assert!(was_socket_closed(&Error::from(ErrorKind::BrokenPipe)));
        assert!(!was_socket_closed(&Error::from(ErrorKind::PermissionDenied)));
    }
}
