//! Crate-level error types shared by the signer, fetcher, and aggregator.

// self
use crate::{_prelude::*, auth::SourceId};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error surfaced by every public operation.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected while constructing components.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Network failure or timeout on an outbound request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response signature verification failed.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Upstream page body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Upstream answered with a status the fetcher does not tolerate.
	#[error("Source `{upstream}` responded with HTTP {status} for page {page}.")]
	UpstreamStatus {
		/// Source that produced the response.
		upstream: SourceId,
		/// HTTP status code.
		status: u16,
		/// Zero-based page index.
		page: usize,
	},
}
impl Error {
	/// Returns `true` when the failure originated upstream rather than in local configuration.
	pub fn is_upstream(&self) -> bool {
		!matches!(self, Error::Config(_))
	}
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Source descriptor failed validation.
	#[error(transparent)]
	InvalidSource(#[from] crate::source::SourceDescriptorError),
	/// Identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Credential names an unsupported algorithm.
	#[error(transparent)]
	UnsupportedAlgorithm(#[from] crate::auth::UnsupportedAlgorithm),
	/// A URL could not be parsed or joined.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Layered configuration could not be read or deserialized.
	#[error("Configuration could not be loaded.")]
	Load {
		/// Underlying loader failure.
		#[source]
		source: BoxError,
	},
	/// Free-form validation failure from the configuration loader.
	#[error("Invalid configuration: {0}.")]
	Message(String),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a configuration loader failure inside [`ConfigError`].
	pub fn load(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Load { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, timeout).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling an upstream source.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the configured timeout.
	#[error("Upstream request timed out after {timeout:?}.")]
	Timeout {
		/// Timeout that elapsed.
		timeout: StdDuration,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

/// Hawk verification failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthenticationError {
	/// Expected authentication header was absent.
	#[error("Missing `{header}` header.")]
	MissingHeader {
		/// Header name.
		header: &'static str,
	},
	/// Authentication header could not be parsed.
	#[error("Malformed Hawk header: {reason}.")]
	MalformedHeader {
		/// Parser diagnostic.
		reason: String,
	},
	/// Header names a credential other than the expected one.
	#[error("Unknown Hawk credential `{id}`.")]
	UnknownCredential {
		/// Identifier found in the header.
		id: String,
	},
	/// Recomputed MAC differs from the one in the header.
	#[error("Hawk MAC mismatch.")]
	MacMismatch,
	/// Recomputed payload hash differs from the one in the header.
	#[error("Hawk payload hash mismatch.")]
	PayloadMismatch,
	/// Request timestamp lies outside the accepted skew window.
	#[error("Hawk timestamp {ts} is outside the accepted window around {now}.")]
	StaleTimestamp {
		/// Timestamp found in the header.
		ts: i64,
		/// Local clock when the check ran.
		now: i64,
	},
}

/// Malformed upstream page bodies.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON of the expected shape.
	#[error("Source `{upstream}` returned malformed JSON for page {page}.")]
	Json {
		/// Source that produced the body.
		upstream: SourceId,
		/// Zero-based page index.
		page: usize,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body did not contain the records field.
	#[error("Source `{upstream}` page {page} is missing the `{field}` field.")]
	MissingRecords {
		/// Source that produced the body.
		upstream: SourceId,
		/// Zero-based page index.
		page: usize,
		/// Field the fetcher looked for.
		field: String,
	},
}
