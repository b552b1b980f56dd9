//! Validated source metadata consumed by the fetcher.

// self
use crate::{
	_prelude::*,
	auth::{Credential, SourceId},
	http::HawkAuth,
	source::SourceDescriptorBuilder,
};

/// Records requested per page unless overridden.
pub const DEFAULT_PAGE_SIZE: usize = 1_000;
/// Upper bound on records fetched per source unless overridden.
pub const DEFAULT_MAX_RESULTS: usize = 10_000;
/// Per-request timeout unless overridden.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);
/// Field holding the page's records unless overridden.
pub const DEFAULT_RECORDS_FIELD: &str = "results";

/// How a `404 Not Found` page is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
	/// The page fails like any other non-2xx status.
	#[default]
	Fail,
	/// The page contributes zero records.
	EmptyPage,
}

/// Where `offset` and `limit` are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingPlacement {
	/// Top-level fields of the JSON body.
	#[default]
	Body,
	/// URL query parameters.
	Query,
}

/// Immutable source descriptor consumed by the fetcher.
#[derive(Clone, Debug)]
pub struct SourceDescriptor {
	/// Descriptor identifier, used in errors and logs.
	pub id: SourceId,
	/// Page endpoint (base URL joined with the path).
	pub endpoint: Url,
	/// Hawk credential for this source.
	pub credential: Credential,
	/// Records requested per page.
	pub page_size: usize,
	/// Upper bound on records fetched.
	pub max_results: usize,
	/// Per-request timeout.
	pub timeout: StdDuration,
	/// Whether successful responses must carry a valid `Server-Authorization` header.
	pub verify_response: bool,
	/// Treatment of `404 Not Found` pages.
	pub not_found: NotFoundPolicy,
	/// Placement of the paging parameters.
	pub paging: PagingPlacement,
	/// Response field holding the record array.
	pub records_field: String,
}
impl SourceDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: SourceId) -> SourceDescriptorBuilder {
		SourceDescriptorBuilder::new(id)
	}

	/// Number of pages requested: `ceil(max_results / page_size)`.
	pub fn page_count(&self) -> usize {
		self.max_results.div_ceil(self.page_size)
	}

	/// Offset of the page at `index`.
	pub fn offset(&self, index: usize) -> usize {
		self.page_size * index
	}

	/// Exchange hook signing (and optionally verifying) every request to this source.
	pub fn hawk_auth(&self) -> HawkAuth {
		HawkAuth::new(self.credential.clone(), self.verify_response)
	}
}
