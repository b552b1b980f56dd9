//! Client half: sign requests, verify `Server-Authorization` on responses.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::{AuthenticationError, ConfigError},
	hawk::{
		Artifacts, HawkHeader, MacKind, SERVER_AUTHORIZATION, generate_nonce, header, now_ts,
		payload_hash,
	},
};

/// Signing state for one outbound request.
///
/// Holds the artifacts the `Authorization` header was computed from so the response can later be
/// verified against the same timestamp, nonce, and resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
	artifacts: Artifacts,
	request_header: String,
}
impl Sender {
	/// Signs a request with a fresh timestamp and nonce.
	pub fn sign(
		credential: &Credential,
		method: &str,
		url: &Url,
		content: &[u8],
		content_type: &str,
	) -> Result<Self, ConfigError> {
		Self::sign_at(credential, method, url, content, content_type, now_ts(), generate_nonce())
	}

	/// Signs a request with a caller-supplied timestamp and nonce.
	///
	/// Identical inputs always yield an identical header.
	pub fn sign_at(
		credential: &Credential,
		method: &str,
		url: &Url,
		content: &[u8],
		content_type: &str,
		ts: i64,
		nonce: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let artifacts = Artifacts::for_request(method, url, ts, nonce)?.with_payload(
			credential.algorithm,
			content,
			content_type,
		);
		let mac = artifacts.mac(credential, MacKind::Header);
		let request_header = header::format_request(
			&credential.id,
			artifacts.ts,
			&artifacts.nonce,
			artifacts.hash.as_deref(),
			artifacts.ext.as_deref(),
			&mac,
		);

		Ok(Self { artifacts, request_header })
	}

	/// Value for the request's `Authorization` header.
	pub fn request_header(&self) -> &str {
		&self.request_header
	}

	/// Artifacts the request MAC was computed from.
	pub fn artifacts(&self) -> &Artifacts {
		&self.artifacts
	}

	/// Verifies a response's `Server-Authorization` header against the signed request.
	///
	/// The MAC is recomputed over the response body (hashed with its content type) bound to this
	/// request's timestamp, nonce, and resource, then compared in constant time.
	pub fn accept_response(
		&self,
		credential: &Credential,
		server_authorization: Option<&str>,
		content: &[u8],
		content_type: &str,
	) -> Result<(), AuthenticationError> {
		let raw = server_authorization
			.ok_or(AuthenticationError::MissingHeader { header: SERVER_AUTHORIZATION })?;
		let parsed = HawkHeader::parse(raw)?;
		let mac = parsed.require_mac()?;
		let hash = payload_hash(credential.algorithm, content, content_type);
		let expected =
			Artifacts { hash: Some(hash), ext: parsed.ext.clone(), ..self.artifacts.clone() };

		if !expected.verify_mac(credential, MacKind::Response, mac) {
			return Err(AuthenticationError::MacMismatch);
		}
		if parsed.hash.as_deref().is_some_and(|claimed| Some(claimed) != expected.hash.as_deref()) {
			return Err(AuthenticationError::PayloadMismatch);
		}

		Ok(())
	}
}
