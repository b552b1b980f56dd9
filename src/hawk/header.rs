//! `Hawk` authorization header syntax.

// self
use crate::{_prelude::*, error::AuthenticationError};

const SCHEME: &str = "Hawk";
const KNOWN_ATTRIBUTES: [&str; 8] = ["id", "ts", "nonce", "hash", "ext", "mac", "app", "dlg"];

/// Attributes carried by a parsed Hawk header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HawkHeader {
	/// Credential identifier.
	pub id: Option<String>,
	/// Unix timestamp in seconds, as sent.
	pub ts: Option<String>,
	/// Request nonce.
	pub nonce: Option<String>,
	/// Base64 payload hash.
	pub hash: Option<String>,
	/// Extension data.
	pub ext: Option<String>,
	/// Base64 MAC.
	pub mac: Option<String>,
}
impl HawkHeader {
	/// Parses `Hawk key="value", ...`.
	pub fn parse(value: &str) -> Result<Self, AuthenticationError> {
		let value = value.trim();
		let rest = match value.split_once(char::is_whitespace) {
			Some((scheme, rest)) if scheme.eq_ignore_ascii_case(SCHEME) => rest,
			_ => return Err(malformed("missing Hawk scheme")),
		};
		let mut attributes = BTreeMap::new();

		for pair in split_pairs(rest)? {
			let (key, value) = pair;

			if !KNOWN_ATTRIBUTES.contains(&key) {
				return Err(malformed(format!("unknown attribute `{key}`")));
			}
			if attributes.insert(key, value.to_owned()).is_some() {
				return Err(malformed(format!("duplicate attribute `{key}`")));
			}
		}

		Ok(Self {
			id: attributes.remove("id"),
			ts: attributes.remove("ts"),
			nonce: attributes.remove("nonce"),
			hash: attributes.remove("hash"),
			ext: attributes.remove("ext"),
			mac: attributes.remove("mac"),
		})
	}

	/// Returns the MAC or a malformed-header error.
	pub fn require_mac(&self) -> Result<&str, AuthenticationError> {
		self.mac.as_deref().ok_or_else(|| malformed("missing `mac` attribute"))
	}
}

/// Formats a request header: `Hawk id="…", ts="…", nonce="…", hash="…", ext="…", mac="…"`.
pub fn format_request(
	id: &str,
	ts: i64,
	nonce: &str,
	hash: Option<&str>,
	ext: Option<&str>,
	mac: &str,
) -> String {
	let mut header = format!("{SCHEME} id=\"{id}\", ts=\"{ts}\", nonce=\"{nonce}\"");

	if let Some(hash) = hash {
		header.push_str(&format!(", hash=\"{hash}\""));
	}
	if let Some(ext) = ext.filter(|ext| !ext.is_empty()) {
		header.push_str(&format!(", ext=\"{ext}\""));
	}

	header.push_str(&format!(", mac=\"{mac}\""));

	header
}

/// Formats a response header: `Hawk mac="…", hash="…", ext="…"`.
pub fn format_response(mac: &str, hash: Option<&str>, ext: Option<&str>) -> String {
	let mut header = format!("{SCHEME} mac=\"{mac}\"");

	if let Some(hash) = hash {
		header.push_str(&format!(", hash=\"{hash}\""));
	}
	if let Some(ext) = ext.filter(|ext| !ext.is_empty()) {
		header.push_str(&format!(", ext=\"{ext}\""));
	}

	header
}

fn split_pairs(input: &str) -> Result<Vec<(&str, &str)>, AuthenticationError> {
	let mut pairs = Vec::new();
	let mut rest = input.trim();

	while !rest.is_empty() {
		let (key, after_key) =
			rest.split_once('=').ok_or_else(|| malformed("attribute without value"))?;
		let key = key.trim();
		let after_key = after_key
			.trim_start()
			.strip_prefix('"')
			.ok_or_else(|| malformed(format!("unquoted value for `{key}`")))?;
		let end = after_key
			.find('"')
			.ok_or_else(|| malformed(format!("unterminated value for `{key}`")))?;

		let value = &after_key[..end];

		if !is_attribute_safe(value) {
			return Err(malformed(format!("backslash in `{key}`")));
		}

		pairs.push((key, value));

		rest = after_key[end + 1..].trim_start();

		if let Some(next) = rest.strip_prefix(',') {
			rest = next.trim_start();
		} else if !rest.is_empty() {
			return Err(malformed("attributes must be comma separated"));
		}
	}

	Ok(pairs)
}

/// Returns `true` when `value` can be carried verbatim inside a quoted attribute.
pub fn is_attribute_safe(value: &str) -> bool {
	!value.contains(['"', '\\'])
}

fn malformed(reason: impl Into<String>) -> AuthenticationError {
	AuthenticationError::MalformedHeader { reason: reason.into() }
}
