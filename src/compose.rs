//! Two-source fetch-and-join.
//!
//! [`Composer::aggregate`] fetches the primary and secondary sources concurrently through a shared
//! [`PaginatedFetcher`], then inner-joins them with a [`JoinContract`]. The join only runs once
//! both fetches have succeeded; the first failure on either side aborts the other.

pub mod join;

pub use join::*;

// self
use crate::{
	_prelude::*,
	fetch::PaginatedFetcher,
	http::SourceHttpClient,
	obs::{self, OperationKind},
	source::{QueryStrategy, SourceDescriptor},
};

/// A source together with the strategy that builds its page bodies.
#[derive(Clone)]
pub struct SourcePlan {
	/// Validated source metadata.
	pub source: SourceDescriptor,
	/// Body builder for the caller's query.
	pub strategy: Arc<dyn QueryStrategy>,
}
impl SourcePlan {
	/// Pairs `source` with `strategy`.
	pub fn new(source: SourceDescriptor, strategy: impl 'static + QueryStrategy) -> Self {
		Self { source, strategy: Arc::new(strategy) }
	}
}
impl Debug for SourcePlan {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SourcePlan").field("source", &self.source).finish_non_exhaustive()
	}
}

/// Aggregates a primary and a secondary source.
pub struct Composer<C>
where
	C: ?Sized + SourceHttpClient,
{
	fetcher: PaginatedFetcher<C>,
	primary: SourcePlan,
	secondary: SourcePlan,
	contract: Arc<dyn JoinContract>,
}
impl<C> Composer<C>
where
	C: ?Sized + SourceHttpClient,
{
	/// Creates a composer joining `secondary` into `primary` with `contract`.
	pub fn new(
		http_client: impl Into<Arc<C>>,
		primary: SourcePlan,
		secondary: SourcePlan,
		contract: impl 'static + JoinContract,
	) -> Self {
		Self {
			fetcher: PaginatedFetcher::new(http_client),
			primary,
			secondary,
			contract: Arc::new(contract),
		}
	}

	/// Primary source plan.
	pub fn primary(&self) -> &SourcePlan {
		&self.primary
	}

	/// Secondary source plan.
	pub fn secondary(&self) -> &SourcePlan {
		&self.secondary
	}

	/// Fetches both sources for `query` and joins them.
	pub async fn aggregate(&self, query: Option<&str>) -> Result<AggregationResult> {
		obs::timed(OperationKind::Aggregate, "aggregate", async {
			let (primary, secondary) = futures::try_join!(
				self.fetcher.fetch_all(&self.primary.source, self.primary.strategy.as_ref(), query),
				self.fetcher.fetch_all(
					&self.secondary.source,
					self.secondary.strategy.as_ref(),
					query
				),
			)?;

			Ok(join(&primary, &secondary, self.contract.as_ref()))
		})
		.await
	}
}
impl<C> Debug for Composer<C>
where
	C: ?Sized + SourceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Composer")
			.field("primary", &self.primary)
			.field("secondary", &self.secondary)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use futures::FutureExt;
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		_preludet::*,
		error::TransportError,
		http::{SignedRequest, SourceResponse},
		source::{FieldFilter, NotFoundPolicy, PagingPlacement, StaticFields},
	};

	fn composer(client: ScriptedHttpClient) -> Composer<ScriptedHttpClient> {
		let hub = test_source("hub", "https://hub.example", "/v4/public/search/company")
			.page_size(2)
			.max_results(4)
			.verify_response(false)
			.build()
			.expect("Descriptor should build.");
		let science = test_source("science", "https://science.example", "/api/v1/company/search/")
			.page_size(2)
			.max_results(4)
			.verify_response(false)
			.not_found(NotFoundPolicy::EmptyPage)
			.paging(PagingPlacement::Query)
			.records_field("result")
			.build()
			.expect("Descriptor should build.");

		Composer::new(
			client,
			SourcePlan::new(hub, StaticFields::default().with("original_query", "")),
			SourcePlan::new(science, FieldFilter::new("market_of_interest")),
			FieldJoin::new("id", "datahub_company_id"),
		)
	}

	fn is_hub(request: &SignedRequest) -> bool {
		request.url.host_str() == Some("hub.example")
	}

	fn page_of(request: &SignedRequest) -> usize {
		let offset = if is_hub(request) {
			request.json_body().and_then(|body| body["offset"].as_u64()).unwrap_or_default()
		} else {
			request
				.url
				.query_pairs()
				.find(|(name, _)| name == "offset")
				.and_then(|(_, value)| value.parse().ok())
				.unwrap_or_default()
		};

		offset as usize / 2
	}

	#[tokio::test]
	async fn aggregate_joins_both_sources() {
		let client = ScriptedHttpClient::new(|request| {
			let response = match (is_hub(request), page_of(request)) {
				(true, 0) => json_page("results", json!([{ "id": 1 }, { "id": 2 }])),
				(true, _) => json_page("results", json!([{ "id": 3 }])),
				(false, 0) => json_page(
					"result",
					json!([{ "datahub_company_id": 2 }, { "datahub_company_id": 3 }]),
				),
				(false, _) => SourceResponse::new(404, Vec::new()),
			};

			async move { Ok(response) }.boxed()
		});
		let result = composer(client.clone())
			.aggregate(Some("fintech"))
			.await
			.expect("Aggregation should succeed.");
		let ids =
			result.results.iter().map(|joined| joined.primary["id"].clone()).collect::<Vec<_>>();

		assert_eq!(ids, [json!(2), json!(3)]);
		assert_eq!(result.counts, AggregationCounts { fetched_a: 3, fetched_b: 2, matched: 2 });
		assert_eq!(client.requests().len(), 4);
	}

	#[tokio::test]
	async fn primary_not_found_is_fatal() {
		let client = ScriptedHttpClient::new(|request| {
			let response = if is_hub(request) {
				SourceResponse::new(404, Vec::new())
			} else {
				json_page("result", json!([]))
			};

			async move { Ok(response) }.boxed()
		});
		let err = composer(client)
			.aggregate(None)
			.await
			.expect_err("Primary 404 should fail the aggregation.");

		assert!(matches!(err, Error::UpstreamStatus { status: 404, .. }));
	}

	#[tokio::test]
	async fn failing_source_abandons_the_other() {
		let client = ScriptedHttpClient::new(|request| {
			if is_hub(request) {
				std::future::pending().boxed()
			} else {
				async { Err(TransportError::Timeout { timeout: StdDuration::from_secs(10) }) }
					.boxed()
			}
		});
		let result =
			tokio::time::timeout(StdDuration::from_secs(5), composer(client).aggregate(None))
				.await
				.expect("Aggregation should resolve without waiting for the other source.");

		assert!(matches!(result, Err(Error::Transport(TransportError::Timeout { .. }))));
	}
}
