//! Hooks that wrap each page exchange, used to attach and check Hawk signatures without
//! coupling the fetcher to a particular scheme.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	hawk::{AUTHORIZATION, SERVER_AUTHORIZATION, Sender},
	http::{SignedRequest, SourceResponse},
};

/// Runs around every outbound exchange.
///
/// `before_send` may mutate the request (typically to add an `Authorization` header) and returns
/// whatever state `after_receive` needs to validate the matching response.
pub trait ExchangeHook
where
	Self: Send + Sync,
{
	/// State carried from signing to verification.
	type State: Send;

	/// Prepares `request` for transmission.
	fn before_send(&self, request: &mut SignedRequest) -> Result<Self::State>;

	/// Inspects the response produced for the request prepared by `before_send`.
	fn after_receive(&self, state: Self::State, response: &SourceResponse) -> Result<()>;
}

/// Signs requests with a Hawk credential and optionally verifies `Server-Authorization` on replies.
#[derive(Clone, Debug)]
pub struct HawkAuth {
	credential: Credential,
	verify_response: bool,
}
impl HawkAuth {
	/// Creates a hook for `credential`.
	pub fn new(credential: Credential, verify_response: bool) -> Self {
		Self { credential, verify_response }
	}

	/// Credential used for signing.
	pub fn credential(&self) -> &Credential {
		&self.credential
	}

	/// Whether successful replies must carry a valid `Server-Authorization` header.
	pub fn verifies_response(&self) -> bool {
		self.verify_response
	}
}
impl ExchangeHook for HawkAuth {
	type State = Sender;

	fn before_send(&self, request: &mut SignedRequest) -> Result<Self::State> {
		let sender = Sender::sign(
			&self.credential,
			&request.method,
			&request.url,
			&request.body,
			request.content_type(),
		)?;

		request.insert_header(AUTHORIZATION, sender.request_header());

		Ok(sender)
	}

	fn after_receive(&self, state: Self::State, response: &SourceResponse) -> Result<()> {
		// Error replies are reported by status, never by signature.
		if !self.verify_response || response.is_error() {
			return Ok(());
		}

		state.accept_response(
			&self.credential,
			response.header(SERVER_AUTHORIZATION),
			&response.body,
			response.content_type(),
		)?;

		Ok(())
	}
}
