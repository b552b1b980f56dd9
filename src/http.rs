//! Transport primitives for upstream page requests.
//!
//! [`SourceHttpClient`] is the crate's only dependency on an HTTP stack. Requests and responses use
//! crate-owned [`SignedRequest`] and [`SourceResponse`] values so the signing hooks in [`hook`]
//! never see a client-specific type. The reqwest-backed [`ReqwestHttpClient`] is the default
//! implementation; tests substitute in-process fakes.

pub mod hook;

pub use hook::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Well-known header names and values.
pub mod header {
	/// `Content-Type` header name (lowercase).
	pub const CONTENT_TYPE: &str = "content-type";
	/// Media type of every outbound page request.
	pub const JSON_CONTENT_TYPE: &str = "application/json";
}

/// Boxed future returned by [`SourceHttpClient::execute`].
pub type ExchangeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<SourceResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports able to execute one signed request.
///
/// Implementations must enforce `timeout` themselves and report its expiry as
/// [`TransportError::Timeout`]. Any HTTP status, including errors, is a successful exchange at this
/// layer; interpreting it is the fetcher's job.
pub trait SourceHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the full response.
	fn execute(&self, request: SignedRequest, timeout: StdDuration) -> ExchangeFuture<'_>;
}

/// Outbound request; the `Authorization` header is inserted by a hook before transmission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// Uppercase HTTP method.
	pub method: String,
	/// Absolute target URL, including any query parameters.
	pub url: Url,
	/// Header map keyed by lowercase name.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl SignedRequest {
	/// Creates an empty request.
	pub fn new(method: &str, url: Url) -> Self {
		Self {
			method: method.to_ascii_uppercase(),
			url,
			headers: BTreeMap::new(),
			body: Vec::new(),
		}
	}

	/// Sets a JSON body and its content type.
	pub fn with_json(mut self, body: &serde_json::Value) -> Self {
		self.body = body.to_string().into_bytes();

		self.with_header(header::CONTENT_TYPE, header::JSON_CONTENT_TYPE)
	}

	/// Sets or replaces a header.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.insert_header(name, value);

		self
	}

	/// Sets or replaces a header in place.
	pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
		self.headers.insert(name.to_ascii_lowercase(), value.into());
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the `Content-Type`, or the empty string when absent.
	pub fn content_type(&self) -> &str {
		self.header(header::CONTENT_TYPE).unwrap_or_default()
	}

	/// Parses the body as JSON, if it is JSON.
	pub fn json_body(&self) -> Option<serde_json::Value> {
		serde_json::from_slice(&self.body).ok()
	}
}

/// Buffered upstream response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceResponse {
	/// HTTP status code.
	pub status: u16,
	/// Header map keyed by lowercase name.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl SourceResponse {
	/// Creates a response without headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Sets or replaces a header.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name.to_ascii_lowercase(), value.into());

		self
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the `Content-Type`, or the empty string when absent.
	pub fn content_type(&self) -> &str {
		self.header(header::CONTENT_TYPE).unwrap_or_default()
	}

	/// `2xx`.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// `4xx` or `5xx`.
	pub fn is_error(&self) -> bool {
		(400..600).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SourceHttpClient for ReqwestHttpClient {
	fn execute(&self, request: SignedRequest, timeout: StdDuration) -> ExchangeFuture<'_> {
		Box::pin(async move {
			let method = reqwest::Method::from_bytes(request.method.as_bytes())
				.map_err(TransportError::network)?;
			let mut builder =
				self.0.request(method, request.url).timeout(timeout).body(request.body);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}

			let response = builder.send().await.map_err(|e| map_reqwest_error(e, timeout))?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await.map_err(|e| map_reqwest_error(e, timeout))?.to_vec();

			Ok(SourceResponse { status, headers, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(e: ReqwestError, timeout: StdDuration) -> TransportError {
	if e.is_timeout() { TransportError::Timeout { timeout } } else { TransportError::network(e) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn headers_are_case_insensitive() {
		let request = SignedRequest::new("post", Url::parse("https://a.example/x").expect("URL"))
			.with_header("X-Trace", "1")
			.with_json(&serde_json::json!({ "offset": 0 }));

		assert_eq!(request.method, "POST");
		assert_eq!(request.header("x-trace"), Some("1"));
		assert_eq!(request.content_type(), "application/json");
		assert_eq!(request.json_body(), Some(serde_json::json!({ "offset": 0 })));

		let response =
			SourceResponse::new(404, Vec::new()).with_header("Server-Authorization", "Hawk");

		assert_eq!(response.header("server-authorization"), Some("Hawk"));
		assert_eq!(response.content_type(), "");
		assert!(response.is_error());
		assert!(!response.is_success());
	}
}
