//! Upstream source descriptors (data) and query strategies (behavior).
//!
//! `descriptor` exposes validated per-source metadata ([`SourceDescriptor`]): the page endpoint,
//! Hawk credential, pagination bounds, timeout, and the quirks that differ between upstreams
//! (response verification, not-found tolerance, where paging parameters go, which field holds the
//! records). `strategy` defines [`QueryStrategy`], the hook that turns the caller's optional query
//! into a source-specific request body.

/// Validating builder for [`SourceDescriptor`].
pub mod builder;
pub mod descriptor;
pub mod strategy;

pub use builder::*;
pub use descriptor::*;
pub use strategy::*;
