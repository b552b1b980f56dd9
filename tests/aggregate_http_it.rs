// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use api_composer::{
	_preludet::*,
	compose::{AggregationCounts, Composer, FieldJoin, SourcePlan},
	error::{Error, TransportError},
	http::ReqwestHttpClient,
	source::{FieldFilter, NotFoundPolicy, PagingPlacement, StaticFields},
};

const HUB_PATH: &str = "/v4/public/search/company";
const SCIENCE_PATH: &str = "/api/v1/company/search/";
const TIMEOUT: StdDuration = StdDuration::from_secs(10);

fn build_composer(
	hub_url: &str,
	science_url: &str,
	timeout: StdDuration,
) -> Composer<ReqwestHttpClient> {
	let hub = test_source("data-hub", hub_url, HUB_PATH)
		.page_size(2)
		.max_results(2)
		.timeout(timeout)
		.verify_response(false)
		.build()
		.expect("Hub descriptor should build.");
	let science = test_source("data-science", science_url, SCIENCE_PATH)
		.page_size(2)
		.max_results(4)
		.timeout(timeout)
		.verify_response(false)
		.not_found(NotFoundPolicy::EmptyPage)
		.paging(PagingPlacement::Query)
		.records_field("result")
		.build()
		.expect("Science descriptor should build.");

	Composer::new(
		ReqwestHttpClient::default(),
		SourcePlan::new(hub, StaticFields::default().with("original_query", "")),
		SourcePlan::new(science, FieldFilter::new("market_of_interest")),
		FieldJoin::new("id", "datahub_company_id"),
	)
}

fn body(value: serde_json::Value) -> String {
	serde_json::to_string(&value).expect("Mock body should serialize.")
}

#[tokio::test]
async fn aggregate_over_http_joins_and_tolerates_missing_pages() -> Result<()> {
	let hub_server = MockServer::start_async().await;
	let science_server = MockServer::start_async().await;
	let hub = hub_server
		.mock_async(|when, then| {
			when.method(POST)
				.path(HUB_PATH)
				.header("content-type", "application/json")
				.header_exists("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body(body(json!({
					"results": [{ "id": 1, "name": "one" }, { "id": 2, "name": "two" }]
				})));
		})
		.await;
	let science_first = science_server
		.mock_async(|when, then| {
			when.method(POST)
				.path(SCIENCE_PATH)
				.query_param("offset", "0")
				.query_param("limit", "2")
				.header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(body(json!({
				"result": [
					{ "datahub_company_id": 2, "score": 0.9 },
					{ "datahub_company_id": null, "score": 0.1 }
				]
			})));
		})
		.await;
	let science_missing = science_server
		.mock_async(|when, then| {
			when.method(POST).path(SCIENCE_PATH).query_param("offset", "2");
			then.status(404);
		})
		.await;
	let result = build_composer(&hub_server.base_url(), &science_server.base_url(), TIMEOUT)
		.aggregate(Some("fintech"))
		.await?;

	assert_eq!(result.counts, AggregationCounts { fetched_a: 2, fetched_b: 2, matched: 1 });
	assert_eq!(result.results.len(), 1);
	assert_eq!(result.results[0].primary["name"], "two");
	assert_eq!(result.results[0].secondary["score"], 0.9);

	hub.assert_calls_async(1).await;
	science_first.assert_calls_async(1).await;
	science_missing.assert_calls_async(1).await;

	Ok(())
}

#[tokio::test]
async fn primary_server_error_fails_the_aggregation() {
	let hub_server = MockServer::start_async().await;
	let science_server = MockServer::start_async().await;

	hub_server
		.mock_async(|when, then| {
			when.method(POST).path(HUB_PATH);
			then.status(500).body("upstream exploded");
		})
		.await;
	science_server
		.mock_async(|when, then| {
			when.method(POST).path(SCIENCE_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(body(json!({ "result": [] })));
		})
		.await;

	let err = build_composer(&hub_server.base_url(), &science_server.base_url(), TIMEOUT)
		.aggregate(None)
		.await
		.expect_err("A 500 page should fail the aggregation.");

	assert!(matches!(
		err,
		Error::UpstreamStatus { ref upstream, status: 500, page: 0 }
			if upstream.to_string() == "data-hub"
	));
}

#[tokio::test]
async fn slow_source_times_out() {
	let hub_server = MockServer::start_async().await;
	let science_server = MockServer::start_async().await;

	hub_server
		.mock_async(|when, then| {
			when.method(POST).path(HUB_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(body(json!({ "results": [] })));
		})
		.await;
	science_server
		.mock_async(|when, then| {
			when.method(POST).path(SCIENCE_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(body(json!({ "result": [] })))
				.delay(StdDuration::from_secs(3));
		})
		.await;

	let err = build_composer(
		&hub_server.base_url(),
		&science_server.base_url(),
		StdDuration::from_millis(300),
	)
		.aggregate(None)
		.await
		.expect_err("A slow page should time out.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
}

#[tokio::test]
async fn unreachable_source_is_a_network_error() {
	let science_server = MockServer::start_async().await;

	science_server
		.mock_async(|when, then| {
			when.method(POST).path(SCIENCE_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(body(json!({ "result": [] })));
		})
		.await;

	let err = build_composer("http://127.0.0.1:9", &science_server.base_url(), TIMEOUT)
		.aggregate(None)
		.await
		.expect_err("An unreachable source should fail.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}
