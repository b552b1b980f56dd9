//! Inbound HTTP endpoint.
//!
//! `GET /?market_of_interest=<value>` runs one aggregation and answers with the composed JSON.
//! Failures map to `502 Bad Gateway` when an upstream misbehaved and `500 Internal Server Error`
//! for local configuration problems, both with an `{"error": "..."}` body.

// crates.io
use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
// self
use crate::{
	_prelude::*,
	compose::{AggregationResult, Composer},
	http::SourceHttpClient,
};

/// Query parameters of the composed endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ComposeParams {
	/// Optional filter forwarded to the sources' query strategies.
	pub market_of_interest: Option<String>,
}

/// Error body wrapper mapping [`Error`] onto an HTTP status.
#[derive(Debug)]
pub struct AppError(pub Error);
impl AppError {
	/// Status reported for the wrapped error.
	pub fn status(&self) -> StatusCode {
		if self.0.is_upstream() {
			StatusCode::BAD_GATEWAY
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		}
	}
}
impl From<Error> for AppError {
	fn from(e: Error) -> Self {
		Self(e)
	}
}
impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let status = self.status();

		tracing::error!(status = status.as_u16(), error = %self.0, "aggregation failed");

		(status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
	}
}

/// Builds the router serving the composed endpoint.
pub fn router<C>(composer: Arc<Composer<C>>) -> Router
where
	C: ?Sized + SourceHttpClient,
{
	Router::new().route("/", get(compose::<C>)).with_state(composer)
}

async fn compose<C>(
	State(composer): State<Arc<Composer<C>>>,
	Query(params): Query<ComposeParams>,
) -> Result<Json<AggregationResult>, AppError>
where
	C: ?Sized + SourceHttpClient,
{
	let result = composer.aggregate(params.market_of_interest.as_deref()).await?;

	Ok(Json(result))
}
