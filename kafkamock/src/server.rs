//! Server orchestrator
//!
//! Owns the listener, the accept loop, the client registry and the shared
//! data store. The store survives restarts; only sockets and tasks are
//! torn down.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpSocket};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, trace};

use kafkamock_common::error::NetworkError;
use kafkamock_common::{Offset, PartitionIndex, Result, ServerConfig, Timestamp};
use kafkamock_store::{DataStore, RecordHeader};

use crate::api;
use crate::connection::{run_connection, ClientConnection};

/// The mock Kafka broker.
///
/// Cheap to clone; all clones share the same store and lifecycle state.
#[derive(Clone)]
pub struct KafkaMock {
    inner: Arc<MockInner>,
}

struct MockInner {
    config: ServerConfig,
    store: Arc<DataStore>,
    stopped: AtomicBool,
    state: Mutex<ServerState>,
}

struct ServerState {
    /// Cancels the accept loop; present while the server runs.
    shutdown: Option<CancellationToken>,
    /// Cancels in-flight requests. Replaced by [`KafkaMock::finish_requests`]
    /// so later connections start with a clear signal.
    requests: CancellationToken,
    tracker: Option<TaskTracker>,
    clients: HashMap<u64, SocketAddr>,
    next_connection_id: u64,
}

impl KafkaMock {
    /// Allocate the data store and API registry for a mock on `port`.
    /// No sockets are opened until [`KafkaMock::start`].
    pub fn new(port: u16) -> Self {
        api::init();
        Self {
            inner: Arc::new(MockInner {
                config: ServerConfig::new(port),
                store: Arc::new(DataStore::new()),
                stopped: AtomicBool::new(false),
                state: Mutex::new(ServerState {
                    shutdown: None,
                    requests: CancellationToken::new(),
                    tracker: None,
                    clients: HashMap::new(),
                    next_connection_id: 0,
                }),
            }),
        }
    }

    pub fn port(&self) -> u16 {
        self.inner.config.port
    }

    /// Open the TCP listener and spawn the accept loop.
    /// Starting twice without an intervening termination is an error.
    pub async fn start(&self) -> Result<()> {
        if self.inner.state.lock().shutdown.is_some() {
            return Err(NetworkError::AlreadyStarted.into());
        }

        let addr = self.inner.config.bind_addr();
        let listener = bind_listener(&addr)
            .map_err(|err| NetworkError::BindFailed(format!("{addr}: {err}")))?;
        info!("kafka mock server is listening on {addr}");

        let shutdown = CancellationToken::new();
        let tracker = TaskTracker::new();
        {
            let mut state = self.inner.state.lock();
            if state.shutdown.is_some() {
                return Err(NetworkError::AlreadyStarted.into());
            }
            state.shutdown = Some(shutdown.clone());
            state.requests = CancellationToken::new();
            state.tracker = Some(tracker.clone());
        }
        self.inner.stopped.store(false, Ordering::SeqCst);

        let inner = self.inner.clone();
        tracker
            .clone()
            .spawn(accept_loop(inner, listener, shutdown, tracker));
        Ok(())
    }

    /// Idempotent shutdown request: closes the listener and broadcasts the
    /// server-wide cancellation signal. Connections drain their in-flight
    /// request and close.
    pub fn request_stop(&self) {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = self.inner.state.lock();
        if let Some(shutdown) = &state.shutdown {
            shutdown.cancel();
            trace!("kafka mock server listener terminated");
        }
        state.requests.cancel();
        for (connection_id, peer) in &state.clients {
            trace!("kafka mock server closing client {connection_id} at {peer}");
        }
    }

    /// Block until every connection handler has exited and the accept loop
    /// has ended, then release resources even if [`KafkaMock::request_stop`]
    /// was never called.
    pub async fn wait_for_termination(&self) {
        let tracker = self.inner.state.lock().tracker.clone();
        if let Some(tracker) = tracker {
            tracker.close();
            tracker.wait().await;
        }

        self.request_stop();

        let mut state = self.inner.state.lock();
        state.shutdown = None;
        state.tracker = None;
        state.clients.clear();
        drop(state);
        self.inner.stopped.store(false, Ordering::SeqCst);
    }

    /// Stop, wait for termination and start again, retaining the store.
    pub async fn restart(&self) -> Result<()> {
        self.request_stop();
        self.wait_for_termination().await;
        self.start().await
    }

    /// Break in-flight long-polls without shutting the server down: the
    /// current request-cancellation signal fires and a fresh one takes its
    /// place for connections accepted afterwards.
    pub fn finish_requests(&self) {
        let mut state = self.inner.state.lock();
        state.requests.cancel();
        state.requests = CancellationToken::new();
    }

    /// Inject a record with the current wall-clock timestamp and no headers.
    pub fn simple_post(
        &self,
        topic: &str,
        partition: PartitionIndex,
        key: Option<&[u8]>,
        value: &[u8],
    ) {
        self.extended_post(
            topic,
            partition,
            key,
            value,
            Vec::new(),
            Utc::now().timestamp_millis(),
        );
    }

    /// Inject a record with an explicit timestamp and headers.
    pub fn extended_post(
        &self,
        topic: &str,
        partition: PartitionIndex,
        key: Option<&[u8]>,
        value: &[u8],
        headers: Vec<RecordHeader>,
        timestamp: Timestamp,
    ) {
        let topic = self.inner.store.create_topic(topic);
        let partition = topic.create_partition(partition);
        partition.append(
            0,
            timestamp,
            key.map(Bytes::copy_from_slice),
            Some(Bytes::copy_from_slice(value)),
            headers,
        );
    }

    /// Unconditionally overwrite a group's committed offset, creating the
    /// topic and partition if they do not exist yet.
    pub fn set_consumer_group_offset(
        &self,
        topic: &str,
        partition: PartitionIndex,
        group: &str,
        offset: Offset,
    ) {
        self.inner
            .store
            .create_topic(topic)
            .create_partition(partition)
            .set_group_offset(group, offset);
    }

    /// Pre-create a common partition in each listed topic so consumers see
    /// a non-empty Metadata response immediately.
    pub fn create_partition_topics(&self, topics: &[&str], partition: PartitionIndex) {
        for topic in topics {
            self.inner.store.create_topic(topic).create_partition(partition);
        }
    }
}

/// Bind with SO_REUSEADDR so a restart can take the port back while
/// connections from the previous run linger in TIME_WAIT.
fn bind_listener(addr: &str) -> std::io::Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1024)
}

async fn accept_loop(
    inner: Arc<MockInner>,
    listener: TcpListener,
    shutdown: CancellationToken,
    tracker: TaskTracker,
) {
    loop {
        let accepted = tokio::select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((socket, peer)) => {
                trace!("client connected: {peer}");

                let (connection_id, cancel) = {
                    let mut state = inner.state.lock();
                    state.next_connection_id += 1;
                    let connection_id = state.next_connection_id;
                    state.clients.insert(connection_id, peer);
                    (connection_id, state.requests.clone())
                };

                let (read_half, write_half) = socket.into_split();
                let conn = Arc::new(ClientConnection::new(
                    inner.store.clone(),
                    cancel,
                    inner.config.port,
                    peer,
                    read_half,
                ));

                let inner = inner.clone();
                tracker.spawn(async move {
                    run_connection(conn, write_half).await;
                    trace!("client disconnected: {peer}");
                    inner.state.lock().clients.remove(&connection_id);
                });
            }
            Err(err) => {
                if !shutdown.is_cancelled() {
                    error!("accept error: {err}");
                }
                break;
            }
        }
    }
}
