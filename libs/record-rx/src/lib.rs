//! Stream-based access to real-time records.
//!
//! [`RxClient`] wraps a shared [`record_api::RecordClient`]; every [`Record`]
//! built from it turns the client's callback API into lazy streams and
//! futures:
//!
//! - [`Record::get`] — live [`RecordStream`] of the record's content
//! - [`Record::set`] / [`Record::set_field`] — one write, one completion
//! - [`Record::snapshot`] — one point-in-time read
//! - [`Record::exists`] — one existence check
//!
//! A connection-level error terminates every live stream opened through the
//! same [`RxClient`].

pub mod client;
pub mod error;
mod live;
pub mod record;
pub mod stream;

pub use client::RxClient;
pub use error::RecordError;
pub use record::{Record, RecordFuture};
pub use stream::RecordStream;
