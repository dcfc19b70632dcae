//! In-memory data store for the kafkamock broker
//!
//! Topic -> Partition -> ordered record log, plus per-group committed
//! offsets. Everything lives for the process; a server restart keeps the
//! store.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod record;
mod store;

pub use record::{Record, RecordHeader};
pub use store::{DataStore, Partition, Topic};
