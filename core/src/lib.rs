//! I/O-free request builder and response parser for the CKAN action API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, which keeps the core deterministic and lets the
//! same builder serve a blocking test harness and an async dispatcher.
//!
//! # Design
//! - `CkanClient` holds only an `Endpoint` (base URL and optional API key);
//!   there is no global configuration.
//! - Every remote operation is an action: `build_action` produces a POST to
//!   `{base}/data/api/3/action/{name}` and `parse_action` unwraps the CKAN
//!   `{"success": .., "result": ..}` envelope.
//! - Failures are surfaced as `ApiError`. Callers that want the old
//!   fire-and-forget behavior go through `legacy::deliver`, which drops them.

pub mod action;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod legacy;
pub mod types;

pub use action::{ActionEnvelope, ActionRequest};
pub use client::CkanClient;
pub use endpoint::Endpoint;
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{ApiVersion, Dataset, Extra, IdRef, NewDataset, NewOrganization, Organization, PackageListQuery};
