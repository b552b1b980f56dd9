//! Credential model shared by the Hawk signer and source descriptors.

pub mod credential;
pub mod id;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use secret::*;
