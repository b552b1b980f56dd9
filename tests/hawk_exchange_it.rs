// crates.io
use color_eyre::Result;
use futures::FutureExt;
use serde_json::json;
// self
use api_composer::{
	_preludet::*,
	auth::{Algorithm, Credential, CredentialId},
	compose::{AggregationCounts, Composer, FieldJoin, SourcePlan},
	error::{AuthenticationError, Error},
	hawk::{
		AUTHORIZATION, DEFAULT_TIMESTAMP_SKEW, IncomingRequest, SERVER_AUTHORIZATION,
		authenticate_request, now_ts,
	},
	http::{SignedRequest, SourceResponse, header::CONTENT_TYPE},
	source::{FieldFilter, NotFoundPolicy, PagingPlacement, StaticFields},
};

/// How the fake upstream answers an authenticated request.
#[derive(Clone, Copy)]
enum Reply {
	Signed,
	Tampered,
	Unsigned,
}

/// Authenticates `request` like a Hawk-protected upstream and answers with `records`.
fn answer(
	credential: &Credential,
	request: &SignedRequest,
	field: &str,
	records: serde_json::Value,
	reply: Reply,
) -> SourceResponse {
	let incoming = IncomingRequest {
		authorization: request.header(AUTHORIZATION),
		method: &request.method,
		url: &request.url,
		content: &request.body,
		content_type: request.content_type(),
	};
	let Ok(artifacts) =
		authenticate_request(credential, incoming, now_ts(), DEFAULT_TIMESTAMP_SKEW)
	else {
		return SourceResponse::new(401, br#"{"error":"unauthorized"}"#.to_vec());
	};
	let page = json_page(field, records);
	let content_type = page.content_type().to_owned();
	let server_authorization = artifacts.response_header(credential, &page.body, &content_type);

	match reply {
		Reply::Signed => page.with_header(SERVER_AUTHORIZATION, server_authorization),
		Reply::Tampered => {
			let tampered = br#"{"result":[{"datahub_company_id":9}]}"#;

			SourceResponse::new(200, tampered.to_vec())
				.with_header(CONTENT_TYPE, content_type)
				.with_header(SERVER_AUTHORIZATION, server_authorization)
		},
		Reply::Unsigned => page,
	}
}

fn is_hub(request: &SignedRequest) -> bool {
	request.url.host_str() == Some("hub.example")
}

fn upstream(upstream_credential: Credential, reply: Reply) -> ScriptedHttpClient {
	ScriptedHttpClient::new(move |request| {
		let response = if is_hub(request) {
			answer(
				&upstream_credential,
				request,
				"results",
				json!([{ "id": "a" }, { "id": "b" }]),
				Reply::Unsigned,
			)
		} else {
			answer(
				&upstream_credential,
				request,
				"result",
				json!([{ "datahub_company_id": "b", "market": "fintech" }]),
				reply,
			)
		};

		async move { Ok(response) }.boxed()
	})
}

fn composer(client: ScriptedHttpClient) -> Composer<ScriptedHttpClient> {
	let hub = test_source("hub", "https://hub.example", "/v4/public/search/company")
		.max_results(1_000)
		.verify_response(false)
		.build()
		.expect("Hub descriptor should build.");
	let science = test_source("science", "https://science.example", "/api/v1/company/search/")
		.max_results(1_000)
		.not_found(NotFoundPolicy::EmptyPage)
		.paging(PagingPlacement::Query)
		.records_field("result")
		.build()
		.expect("Science descriptor should build.");

	Composer::new(
		client,
		SourcePlan::new(hub, StaticFields::default().with("original_query", "")),
		SourcePlan::new(science, FieldFilter::new("market_of_interest")),
		FieldJoin::new("id", "datahub_company_id"),
	)
}

#[tokio::test]
async fn mutual_authentication_round_trip() -> Result<()> {
	let client = upstream(test_credential(), Reply::Signed);
	let result = composer(client.clone()).aggregate(Some("fintech")).await?;

	assert_eq!(result.counts, AggregationCounts { fetched_a: 2, fetched_b: 1, matched: 1 });
	assert_eq!(result.results[0].primary, json!({ "id": "b" }));
	assert_eq!(result.results[0].secondary["market"], "fintech");

	for request in client.requests() {
		let header = request.header(AUTHORIZATION).expect("Every request should be signed.");

		assert!(header.starts_with("Hawk "));
	}

	Ok(())
}

#[tokio::test]
async fn tampered_response_is_rejected() {
	let err = composer(upstream(test_credential(), Reply::Tampered))
		.aggregate(None)
		.await
		.expect_err("Tampered body should fail verification.");

	assert!(matches!(err, Error::Authentication(AuthenticationError::MacMismatch)));
}

#[tokio::test]
async fn missing_server_authorization_is_rejected_when_verifying() {
	let err = composer(upstream(test_credential(), Reply::Unsigned))
		.aggregate(None)
		.await
		.expect_err("Unsigned body should fail verification.");

	assert!(matches!(
		err,
		Error::Authentication(AuthenticationError::MissingHeader { header: SERVER_AUTHORIZATION })
	));
}

#[tokio::test]
async fn rejected_signature_surfaces_as_status_not_verification_failure() {
	let other = Credential::new(
		CredentialId::new(TEST_CREDENTIAL_ID).expect("Credential id should be valid."),
		"a-different-key",
		Algorithm::Sha256,
	);
	let err = composer(upstream(other, Reply::Signed))
		.aggregate(None)
		.await
		.expect_err("Upstream should reject the signature.");

	assert!(matches!(err, Error::UpstreamStatus { status: 401, .. }));
}
