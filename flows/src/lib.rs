//! Async dispatcher and example flows for the CKAN action API.
//!
//! # Overview
//! `Dispatcher` drives the I/O-free `ckan-core` client over a `Transport`
//! (reqwest in production). On top of it sit the example flows: listing
//! organizations, creating then deleting a test organization, and a longer
//! tour through datasets. Each flow comes as awaited sequential steps
//! (`flows`, `tour`) and the listing and create-then-delete flows also in
//! silent continuation style (`legacy`).
//!
//! # Design
//! - Configuration is an explicit `Endpoint` held by the dispatcher.
//! - Work runs on a single-threaded runtime; nothing here spawns tasks.
//! - Flow output goes to an `ObservationSink`; diagnostics go to `tracing`.

pub mod dispatcher;
pub mod error;
pub mod flows;
pub mod legacy;
pub mod logging;
pub mod naming;
pub mod sink;
pub mod tour;
pub mod transport;

#[cfg(test)]
mod testing;

pub use dispatcher::Dispatcher;
pub use error::FlowError;
pub use sink::{ConsoleSink, MemorySink, ObservationSink, TracingSink};
pub use transport::{ReqwestTransport, Transport};
