//! Hawk credentials: identifier, shared key, and MAC algorithm.

// crates.io
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
// self
use crate::{
	_prelude::*,
	auth::{CredentialId, SecretKey},
};

/// Hash algorithm backing both the payload hash and the HMAC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
	/// SHA-256, the Hawk default.
	#[default]
	Sha256,
	/// SHA-512.
	Sha512,
}
impl Algorithm {
	/// Returns the lowercase algorithm label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Algorithm::Sha256 => "sha256",
			Algorithm::Sha512 => "sha512",
		}
	}

	/// Hashes the concatenation of `parts`.
	pub fn digest(self, parts: &[&[u8]]) -> Vec<u8> {
		match self {
			Algorithm::Sha256 => digest_parts::<Sha256>(parts),
			Algorithm::Sha512 => digest_parts::<Sha512>(parts),
		}
	}

	/// Computes `HMAC(key, message)`.
	pub fn mac(self, key: &[u8], message: &[u8]) -> Vec<u8> {
		match self {
			Algorithm::Sha256 => mac_bytes::<Hmac<Sha256>>(key, message),
			Algorithm::Sha512 => mac_bytes::<Hmac<Sha512>>(key, message),
		}
	}

	/// Checks `expected` against `HMAC(key, message)` in constant time.
	pub fn verify_mac(self, key: &[u8], message: &[u8], expected: &[u8]) -> bool {
		match self {
			Algorithm::Sha256 => verify_bytes::<Hmac<Sha256>>(key, message, expected),
			Algorithm::Sha512 => verify_bytes::<Hmac<Sha512>>(key, message, expected),
		}
	}
}
impl Display for Algorithm {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Algorithm {
	type Err = UnsupportedAlgorithm;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("sha256") {
			Ok(Algorithm::Sha256)
		} else if s.eq_ignore_ascii_case("sha512") {
			Ok(Algorithm::Sha512)
		} else {
			Err(UnsupportedAlgorithm(s.to_owned()))
		}
	}
}

/// Raised when an algorithm label is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported Hawk algorithm `{0}`.")]
pub struct UnsupportedAlgorithm(pub String);

/// Immutable Hawk credential, one per upstream source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Identifier sent in clear with every request.
	pub id: CredentialId,
	/// Shared secret used as the HMAC key.
	pub key: SecretKey,
	/// MAC algorithm.
	#[serde(default)]
	pub algorithm: Algorithm,
}
impl Credential {
	/// Creates a credential from its parts.
	pub fn new(id: CredentialId, key: impl Into<SecretKey>, algorithm: Algorithm) -> Self {
		Self { id, key: key.into(), algorithm }
	}
}

fn digest_parts<D>(parts: &[&[u8]]) -> Vec<u8>
where
	D: Digest,
{
	let mut hasher = D::new();

	for part in parts {
		hasher.update(part);
	}

	hasher.finalize().to_vec()
}

fn mac_bytes<M>(key: &[u8], message: &[u8]) -> Vec<u8>
where
	M: Mac + hmac::digest::KeyInit,
{
	let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(key)
		.unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));

	mac.update(message);

	mac.finalize().into_bytes().to_vec()
}

fn verify_bytes<M>(key: &[u8], message: &[u8], expected: &[u8]) -> bool
where
	M: Mac + hmac::digest::KeyInit,
{
	let Ok(mut mac) = <M as hmac::digest::KeyInit>::new_from_slice(key) else {
		return false;
	};

	mac.update(message);

	mac.verify_slice(expected).is_ok()
}
