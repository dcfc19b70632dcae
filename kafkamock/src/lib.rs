//! kafkamock - an in-process mock of the Kafka broker wire protocol
//!
//! Test suites start a [`KafkaMock`] on a TCP port, point unmodified Kafka
//! consumers at it, and inject records directly into the in-memory store.
//! Connected consumers then receive those records through the regular
//! Fetch pipeline.
//!
//! ```no_run
//! # async fn demo() -> kafkamock_common::Result<()> {
//! use kafkamock::KafkaMock;
//!
//! let mock = KafkaMock::new(21001);
//! mock.start().await?;
//! mock.simple_post("topic-a", 2, None, b"test");
//! // ... run a consumer against localhost:21001 ...
//! mock.request_stop();
//! mock.wait_for_termination().await;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod api;
mod connection;
mod server;

pub use kafkamock_store::RecordHeader;
pub use server::KafkaMock;
