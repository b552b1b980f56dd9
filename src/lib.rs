//! Hawk-signed, paginated fetch-and-join over two upstream record sources.
//!
//! The core is split in two: [`hawk`] implements the shared-secret request signing and response
//! verification scheme, while [`fetch`] and [`compose`] drive concurrent page requests against both
//! sources and inner-join the results on a foreign key. Everything that decides how the core is
//! invoked (configuration, logging setup, the inbound endpoint) lives behind the `server` feature.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod compose;
#[cfg(feature = "server")] pub mod config;
pub mod error;
pub mod fetch;
pub mod hawk;
pub mod http;
pub mod obs;
#[cfg(feature = "server")] pub mod server;
pub mod source;
#[cfg(feature = "server")] pub mod telemetry;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Algorithm, Credential, CredentialId, SourceId},
		http::{
			ExchangeFuture, SignedRequest, SourceHttpClient, SourceResponse,
			header::{CONTENT_TYPE, JSON_CONTENT_TYPE},
		},
		source::{SourceDescriptor, SourceDescriptorBuilder},
	};

	/// Shared Hawk id used by test fixtures.
	pub const TEST_CREDENTIAL_ID: &str = "test-client";
	/// Shared Hawk key used by test fixtures.
	pub const TEST_CREDENTIAL_KEY: &str = "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn";

	/// Builds the SHA-256 credential used across tests.
	pub fn test_credential() -> Credential {
		Credential::new(
			CredentialId::new(TEST_CREDENTIAL_ID).expect("Test credential id should be valid."),
			TEST_CREDENTIAL_KEY,
			Algorithm::Sha256,
		)
	}

	/// Starts a descriptor builder for `base_url` + `path` signed with [`test_credential`].
	pub fn test_source(id: &str, base_url: &str, path: &str) -> SourceDescriptorBuilder {
		SourceDescriptor::builder(SourceId::new(id).expect("Test source id should be valid."))
			.base_url(Url::parse(base_url).expect("Test base URL should parse."))
			.path(path)
			.credential(test_credential())
	}

	/// Builds a `200 OK` JSON response that wraps `records` under `field`.
	pub fn json_page(field: &str, records: serde_json::Value) -> SourceResponse {
		let body = serde_json::json!({ field: records });

		SourceResponse::new(200, serde_json::to_vec(&body).expect("Test page should serialize."))
			.with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
	}

	/// Boxed responder used by [`ScriptedHttpClient`].
	pub type Responder =
		Arc<dyn Fn(&SignedRequest) -> ExchangeFuture<'static> + Send + Sync + 'static>;

	/// In-process transport that records every request and answers through a closure.
	#[derive(Clone)]
	pub struct ScriptedHttpClient {
		requests: Arc<Mutex<Vec<SignedRequest>>>,
		responder: Responder,
	}
	impl ScriptedHttpClient {
		/// Creates a client that answers each request with `responder`.
		pub fn new<F>(responder: F) -> Self
		where
			F: 'static + Fn(&SignedRequest) -> ExchangeFuture<'static> + Send + Sync,
		{
			Self { requests: Default::default(), responder: Arc::new(responder) }
		}

		/// Returns every request observed so far, in dispatch order.
		pub fn requests(&self) -> Vec<SignedRequest> {
			self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
		}
	}
	impl Debug for ScriptedHttpClient {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("ScriptedHttpClient").finish_non_exhaustive()
		}
	}
	impl SourceHttpClient for ScriptedHttpClient {
		fn execute(&self, request: SignedRequest, _timeout: StdDuration) -> ExchangeFuture<'_> {
			let future = (self.responder)(&request);

			self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(request);

			future
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, Mutex},
		time::{Duration as StdDuration, Instant},
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "server")] use {clap as _, color_eyre as _, tokio as _};
#[cfg(test)] use {color_eyre as _, httpmock as _, tower as _};
