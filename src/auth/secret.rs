//! Redacting wrapper for shared Hawk keys.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Shared secret used as the HMAC key; redacted from every formatter and serializer.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);
impl SecretKey {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw key bytes. Callers must avoid logging them.
	pub fn expose(&self) -> &[u8] {
		self.0.as_bytes()
	}

	/// Returns `true` when no key material is present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<&str> for SecretKey {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for SecretKey {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for SecretKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecretKey").field(&REDACTED).finish()
	}
}
impl Display for SecretKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}
impl Serialize for SecretKey {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = SecretKey::new("super-secret");

		assert_eq!(format!("{secret:?}"), "SecretKey(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), b"super-secret");
	}

	#[test]
	fn secret_serializes_redacted_and_deserializes_raw() {
		let secret: SecretKey =
			serde_json::from_str("\"super-secret\"").expect("Secret should deserialize.");

		assert_eq!(secret.expose(), b"super-secret");
		assert_eq!(
			serde_json::to_string(&secret).expect("Secret should serialize."),
			"\"<redacted>\""
		);
	}
}
