//! Hawk request signing and response verification.
//!
//! Every outbound request carries an `Authorization` header whose MAC covers the timestamp, nonce,
//! method, resource, host, port, and a hash of the body keyed by its content type. A source that
//! opts into response verification must answer with a `Server-Authorization` header whose MAC is
//! bound to the same request context and the response body.
//!
//! [`Sender::sign`] and [`Sender::accept_response`] are the client half; [`authenticate_request`]
//! and [`Artifacts::response_header`] are the receiving half used by upstream fakes and tests.

mod artifacts;
mod header;
mod receiver;
mod sender;

pub use artifacts::*;
pub use header::*;
pub use receiver::*;
pub use sender::*;

/// Protocol version prefix of every normalized string.
pub const HAWK_VERSION: &str = "hawk.1";
/// Request header carrying the client MAC.
pub const AUTHORIZATION: &str = "authorization";
/// Response header carrying the server MAC.
pub const SERVER_AUTHORIZATION: &str = "server-authorization";
/// Length of generated nonces.
pub const NONCE_LEN: usize = 6;
