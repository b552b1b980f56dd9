//! Concurrent paginated fetching from one upstream source.
//!
//! [`PaginatedFetcher::fetch_all`] computes a fixed page count from the source's bounds, issues
//! every page request at once on the calling task, and reassembles records in page order. Each
//! request passes through an [`ExchangeHook`] so signing and response verification stay outside
//! the paging logic.
//!
//! Failure is fail-fast: the first page that errors resolves the whole fetch and the remaining
//! in-flight requests are dropped.

/// Page envelope decoding.
pub mod page;

pub use page::*;

// crates.io
use futures::future;
// self
use crate::{
	_prelude::*,
	http::{ExchangeHook, SignedRequest, SourceHttpClient},
	obs::{self, OperationKind},
	source::{NotFoundPolicy, PagingPlacement, QueryStrategy, SourceDescriptor},
};

/// Opaque upstream record, passed through unchanged.
pub type SourceRecord = serde_json::Value;

/// HTTP status treated specially by [`NotFoundPolicy::EmptyPage`].
const NOT_FOUND: u16 = 404;

/// Fetches every page of a source through a shared transport.
pub struct PaginatedFetcher<C>
where
	C: ?Sized + SourceHttpClient,
{
	http_client: Arc<C>,
}
impl<C> PaginatedFetcher<C>
where
	C: ?Sized + SourceHttpClient,
{
	/// Creates a fetcher backed by `http_client`.
	pub fn new(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into() }
	}

	/// Transport used for page requests.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Fetches all pages of `source`, signing each request with the source's credential.
	pub async fn fetch_all(
		&self,
		source: &SourceDescriptor,
		strategy: &dyn QueryStrategy,
		query: Option<&str>,
	) -> Result<Vec<SourceRecord>> {
		self.fetch_all_with(source, &source.hawk_auth(), strategy, query).await
	}

	/// Fetches all pages of `source`, wrapping each exchange with `hook`.
	pub async fn fetch_all_with<H>(
		&self,
		source: &SourceDescriptor,
		hook: &H,
		strategy: &dyn QueryStrategy,
		query: Option<&str>,
	) -> Result<Vec<SourceRecord>>
	where
		H: ExchangeHook,
	{
		obs::timed(OperationKind::FetchSource, &source.id, async {
			let pages = (0..source.page_count())
				.map(|index| self.fetch_page(source, hook, strategy, query, index));
			// `try_join_all` yields results in input order, whatever the completion order.
			let pages = future::try_join_all(pages).await?;

			Ok(pages.into_iter().flat_map(Page::into_records).collect())
		})
		.await
	}

	async fn fetch_page<H>(
		&self,
		source: &SourceDescriptor,
		hook: &H,
		strategy: &dyn QueryStrategy,
		query: Option<&str>,
		index: usize,
	) -> Result<Page>
	where
		H: ExchangeHook,
	{
		obs::timed(OperationKind::FetchPage, &source.id, async {
			let mut request = page_request(source, strategy, query, index);
			let state = hook.before_send(&mut request)?;
			let response = self.http_client.execute(request, source.timeout).await?;

			if response.status == NOT_FOUND && source.not_found == NotFoundPolicy::EmptyPage {
				return Ok(Page::empty(index));
			}

			hook.after_receive(state, &response)?;

			if !response.is_success() {
				return Err(Error::UpstreamStatus {
					upstream: source.id.clone(),
					status: response.status,
					page: index,
				});
			}

			Ok(Page::decode(source, index, &response.body)?)
		})
		.await
	}
}
impl<C> Clone for PaginatedFetcher<C>
where
	C: ?Sized + SourceHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone() }
	}
}
impl<C> Debug for PaginatedFetcher<C>
where
	C: ?Sized + SourceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PaginatedFetcher").finish_non_exhaustive()
	}
}

/// Builds the unsigned request for page `index`.
pub fn page_request(
	source: &SourceDescriptor,
	strategy: &dyn QueryStrategy,
	query: Option<&str>,
	index: usize,
) -> SignedRequest {
	let offset = source.offset(index);
	let mut url = source.endpoint.clone();
	let mut body = strategy.body_fields(query);

	match source.paging {
		PagingPlacement::Body => {
			body.insert("offset".into(), offset.into());
			body.insert("limit".into(), source.page_size.into());
		},
		PagingPlacement::Query => {
			url.query_pairs_mut()
				.append_pair("offset", &offset.to_string())
				.append_pair("limit", &source.page_size.to_string());
		},
	}

	SignedRequest::new("POST", url).with_json(&serde_json::Value::Object(body))
}
