//! Receiving half: authenticate an incoming Hawk request.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::AuthenticationError,
	hawk::{AUTHORIZATION, Artifacts, HawkHeader, MacKind, payload_hash},
};

/// Default accepted clock skew, in seconds.
pub const DEFAULT_TIMESTAMP_SKEW: i64 = 60;

/// Request attributes a receiver authenticates against.
#[derive(Clone, Copy, Debug)]
pub struct IncomingRequest<'a> {
	/// Raw `Authorization` header value, if present.
	pub authorization: Option<&'a str>,
	/// HTTP method.
	pub method: &'a str,
	/// Full request URL as seen by the client.
	pub url: &'a Url,
	/// Raw body.
	pub content: &'a [u8],
	/// `Content-Type` header value (empty when absent).
	pub content_type: &'a str,
}

/// Authenticates `request` against `credential` and returns the artifacts to answer with.
///
/// Checks, in order: header presence and syntax, credential id, timestamp skew, MAC, and payload
/// hash. Nonce replay tracking is left to the caller.
pub fn authenticate_request(
	credential: &Credential,
	request: IncomingRequest<'_>,
	now: i64,
	skew: i64,
) -> Result<Artifacts, AuthenticationError> {
	let raw =
		request.authorization.ok_or(AuthenticationError::MissingHeader { header: AUTHORIZATION })?;
	let parsed = HawkHeader::parse(raw)?;
	let id = parsed.id.as_deref().ok_or_else(|| missing("id"))?;

	if id != credential.id.as_ref() {
		return Err(AuthenticationError::UnknownCredential { id: id.to_owned() });
	}

	let ts = parsed
		.ts
		.as_deref()
		.ok_or_else(|| missing("ts"))?
		.parse::<i64>()
		.map_err(|e| AuthenticationError::MalformedHeader {
			reason: format!("invalid `ts`: {e}"),
		})?;

	if now.abs_diff(ts) > skew.unsigned_abs() {
		return Err(AuthenticationError::StaleTimestamp { ts, now });
	}

	let nonce = parsed.nonce.as_deref().ok_or_else(|| missing("nonce"))?;
	let mac = parsed.require_mac()?;
	let mut artifacts = Artifacts::for_request(request.method, request.url, ts, nonce)
		.map_err(|e| AuthenticationError::MalformedHeader { reason: e.to_string() })?;

	artifacts.hash =
		Some(payload_hash(credential.algorithm, request.content, request.content_type));
	artifacts.ext = parsed.ext.clone();

	if !artifacts.verify_mac(credential, MacKind::Header, mac) {
		return Err(AuthenticationError::MacMismatch);
	}
	if parsed.hash.as_deref().is_some_and(|claimed| Some(claimed) != artifacts.hash.as_deref()) {
		return Err(AuthenticationError::PayloadMismatch);
	}

	Ok(artifacts)
}

fn missing(attribute: &str) -> AuthenticationError {
	AuthenticationError::MalformedHeader { reason: format!("missing `{attribute}` attribute") }
}
