// self
use crate::{
	_prelude::*,
	auth::{Credential, SourceId},
	source::{
		DEFAULT_MAX_RESULTS, DEFAULT_PAGE_SIZE, DEFAULT_RECORDS_FIELD, DEFAULT_TIMEOUT,
		NotFoundPolicy, PagingPlacement, SourceDescriptor,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SourceDescriptorError {
	/// Base URL is mandatory.
	#[error("Missing base URL.")]
	MissingBaseUrl,
	/// Every source is signed, so a credential is mandatory.
	#[error("Missing credential.")]
	MissingCredential,
	/// Base URL and path did not form a valid URL.
	#[error("Endpoint `{url}` is invalid: {reason}.")]
	InvalidEndpoint {
		/// Concatenated endpoint.
		url: String,
		/// Parser diagnostic.
		reason: String,
	},
	/// Endpoints must use HTTP or HTTPS.
	#[error("Endpoint must use HTTP or HTTPS: {url}.")]
	UnsupportedScheme {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A zero page size would never make progress.
	#[error("Page size must be greater than zero.")]
	ZeroPageSize,
	/// A zero timeout would fail every request.
	#[error("Timeout must be greater than zero.")]
	ZeroTimeout,
	/// The records field name cannot be empty.
	#[error("Records field must not be empty.")]
	EmptyRecordsField,
}

/// Builder for [`SourceDescriptor`] values.
#[derive(Debug)]
pub struct SourceDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: SourceId,
	/// Scheme, host, and optional path prefix.
	pub base_url: Option<Url>,
	/// Path appended to the base URL.
	pub path: String,
	/// Hawk credential.
	pub credential: Option<Credential>,
	/// Records requested per page.
	pub page_size: usize,
	/// Upper bound on records fetched.
	pub max_results: usize,
	/// Per-request timeout.
	pub timeout: StdDuration,
	/// Whether successful responses are verified.
	pub verify_response: bool,
	/// Treatment of `404 Not Found` pages.
	pub not_found: NotFoundPolicy,
	/// Placement of the paging parameters.
	pub paging: PagingPlacement,
	/// Response field holding the record array.
	pub records_field: String,
}
impl SourceDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: SourceId) -> Self {
		Self {
			id,
			base_url: None,
			path: String::new(),
			credential: None,
			page_size: DEFAULT_PAGE_SIZE,
			max_results: DEFAULT_MAX_RESULTS,
			timeout: DEFAULT_TIMEOUT,
			verify_response: true,
			not_found: NotFoundPolicy::default(),
			paging: PagingPlacement::default(),
			records_field: DEFAULT_RECORDS_FIELD.into(),
		}
	}

	/// Sets the base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the path appended to the base URL.
	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();

		self
	}

	/// Sets the Hawk credential.
	pub fn credential(mut self, credential: Credential) -> Self {
		self.credential = Some(credential);

		self
	}

	/// Overrides the page size.
	pub fn page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size;

		self
	}

	/// Overrides the maximum number of records fetched.
	pub fn max_results(mut self, max_results: usize) -> Self {
		self.max_results = max_results;

		self
	}

	/// Overrides the per-request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Enables or disables response verification.
	pub fn verify_response(mut self, verify_response: bool) -> Self {
		self.verify_response = verify_response;

		self
	}

	/// Overrides the not-found policy.
	pub fn not_found(mut self, policy: NotFoundPolicy) -> Self {
		self.not_found = policy;

		self
	}

	/// Overrides where paging parameters are sent.
	pub fn paging(mut self, paging: PagingPlacement) -> Self {
		self.paging = paging;

		self
	}

	/// Overrides the response field holding the records.
	pub fn records_field(mut self, field: impl Into<String>) -> Self {
		self.records_field = field.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<SourceDescriptor, SourceDescriptorError> {
		let base_url = self.base_url.ok_or(SourceDescriptorError::MissingBaseUrl)?;
		let credential = self.credential.ok_or(SourceDescriptorError::MissingCredential)?;
		let endpoint = join_endpoint(&base_url, &self.path)?;
		let descriptor = SourceDescriptor {
			id: self.id,
			endpoint,
			credential,
			page_size: self.page_size,
			max_results: self.max_results,
			timeout: self.timeout,
			verify_response: self.verify_response,
			not_found: self.not_found,
			paging: self.paging,
			records_field: self.records_field,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl SourceDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), SourceDescriptorError> {
		if !matches!(self.endpoint.scheme(), "http" | "https") {
			return Err(SourceDescriptorError::UnsupportedScheme { url: self.endpoint.to_string() });
		}
		if self.page_size == 0 {
			return Err(SourceDescriptorError::ZeroPageSize);
		}
		if self.timeout.is_zero() {
			return Err(SourceDescriptorError::ZeroTimeout);
		}
		if self.records_field.is_empty() {
			return Err(SourceDescriptorError::EmptyRecordsField);
		}

		Ok(())
	}
}

// Appends rather than resolves, so a base URL path prefix survives.
fn join_endpoint(base_url: &Url, path: &str) -> Result<Url, SourceDescriptorError> {
	let base = base_url.as_str().trim_end_matches('/');
	let path = path.trim_start_matches('/');
	let raw = if path.is_empty() { base.to_owned() } else { format!("{base}/{path}") };

	Url::parse(&raw)
		.map_err(|e| SourceDescriptorError::InvalidEndpoint { url: raw, reason: e.to_string() })
}
