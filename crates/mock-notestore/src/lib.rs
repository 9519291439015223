//! # Mock note service
//!
//! In-memory account store and per-shard content stores speaking the same
//! operations as the real service.  Used two ways:
//!
//! * in-process, through [`MockTransportFactory`], by the SDK's integration
//!   tests;
//! * over HTTP, through [`router`], by the `mock-notestore` binary, for
//!   runs against [`notestore_sdk::HttpTransportFactory`].
//!
//! Only the operations the routing layer exercises are implemented: login,
//! second factor, business exchange, notebooks, notes, sharing and the share
//! key exchange.  Everything else answers `UNSUPPORTED_OPERATION`.

mod http;
mod notestore;
mod service;
mod transport;
mod userstore;

pub use http::router;
pub use service::{Account, MockService, DEFAULT_TOKEN_TTL};
pub use transport::{MockTransport, MockTransportFactory};
