//! Canonical MAC inputs and the normalized string built from them.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{Algorithm, Credential},
	error::ConfigError,
	hawk::{HAWK_VERSION, NONCE_LEN, header},
};

/// Which side of the exchange a MAC authenticates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacKind {
	/// Client request (`Authorization`).
	Header,
	/// Server response (`Server-Authorization`).
	Response,
}
impl MacKind {
	/// Returns the label embedded in the normalized string.
	pub const fn as_str(self) -> &'static str {
		match self {
			MacKind::Header => "header",
			MacKind::Response => "response",
		}
	}
}

/// Everything a MAC is computed over, retained between signing and verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifacts {
	/// Unix timestamp in seconds.
	pub ts: i64,
	/// Request-unique nonce.
	pub nonce: String,
	/// Uppercase HTTP method.
	pub method: String,
	/// Path plus `?query` when present.
	pub resource: String,
	/// Lowercase host.
	pub host: String,
	/// Explicit port or the scheme default.
	pub port: u16,
	/// Base64 payload hash, when the payload is covered.
	pub hash: Option<String>,
	/// Application-specific extension data.
	pub ext: Option<String>,
}
impl Artifacts {
	/// Derives the request context from `method` + `url` with the supplied timestamp and nonce.
	pub fn for_request(
		method: &str,
		url: &Url,
		ts: i64,
		nonce: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let host = url
			.host_str()
			.ok_or_else(|| ConfigError::Message(format!("URL `{url}` has no host")))?
			.to_ascii_lowercase();
		let port = url
			.port_or_known_default()
			.ok_or_else(|| ConfigError::Message(format!("URL `{url}` has no known port")))?;
		let resource = match url.query() {
			Some(query) => format!("{}?{query}", url.path()),
			None => url.path().to_owned(),
		};

		Ok(Self {
			ts,
			nonce: nonce.into(),
			method: method.to_ascii_uppercase(),
			resource,
			host,
			port,
			hash: None,
			ext: None,
		})
	}

	/// Covers `content` (typed as `content_type`) with the payload hash.
	pub fn with_payload(
		mut self,
		algorithm: Algorithm,
		content: &[u8],
		content_type: &str,
	) -> Self {
		self.hash = Some(payload_hash(algorithm, content, content_type));

		self
	}

	/// Attaches extension data.
	///
	/// Quotes and backslashes are rejected since the header carries `ext` unescaped.
	pub fn with_ext(mut self, ext: impl Into<String>) -> Result<Self, ConfigError> {
		let ext = ext.into();

		if !header::is_attribute_safe(&ext) {
			return Err(ConfigError::Message(format!(
				"Hawk `ext` `{ext}` contains a quote or backslash"
			)));
		}

		self.ext = Some(ext);

		Ok(self)
	}

	/// Serializes the artifacts into the newline-terminated normalized string.
	pub fn normalized(&self, kind: MacKind) -> String {
		format!(
			"{HAWK_VERSION}.{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
			kind.as_str(),
			self.ts,
			self.nonce,
			self.method,
			self.resource,
			self.host,
			self.port,
			self.hash.as_deref().unwrap_or_default(),
			escape_ext(self.ext.as_deref().unwrap_or_default()),
		)
	}

	/// Computes the base64 MAC of the normalized string under `credential`.
	pub fn mac(&self, credential: &Credential, kind: MacKind) -> String {
		let mac =
			credential.algorithm.mac(credential.key.expose(), self.normalized(kind).as_bytes());

		STANDARD.encode(mac)
	}

	/// Checks a base64 `mac` against the expected one in constant time.
	pub fn verify_mac(&self, credential: &Credential, kind: MacKind, mac: &str) -> bool {
		let Ok(raw) = STANDARD.decode(mac) else {
			return false;
		};

		credential.algorithm.verify_mac(
			credential.key.expose(),
			self.normalized(kind).as_bytes(),
			&raw,
		)
	}

	/// Builds the `Server-Authorization` value answering the request these artifacts describe.
	pub fn response_header(
		&self,
		credential: &Credential,
		content: &[u8],
		content_type: &str,
	) -> String {
		let response = Self {
			hash: Some(payload_hash(credential.algorithm, content, content_type)),
			ext: None,
			..self.clone()
		};
		let mac = response.mac(credential, MacKind::Response);

		header::format_response(&mac, response.hash.as_deref(), None)
	}
}

/// Hashes `content` the way Hawk binds a payload to its media type.
///
/// Parameters such as `charset` are stripped from `content_type`; a missing content type is the
/// empty string.
pub fn payload_hash(algorithm: Algorithm, content: &[u8], content_type: &str) -> String {
	let media_type = normalize_content_type(content_type);
	let prefix = format!("{HAWK_VERSION}.payload\n{media_type}\n");
	let digest = algorithm.digest(&[prefix.as_bytes(), content, b"\n"]);

	STANDARD.encode(digest)
}

/// Returns a fresh alphanumeric nonce.
pub fn generate_nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

/// Returns the current unix timestamp in seconds.
pub fn now_ts() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

fn normalize_content_type(content_type: &str) -> String {
	content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

fn escape_ext(ext: &str) -> String {
	ext.replace('\\', "\\\\").replace('\n', "\\n")
}
