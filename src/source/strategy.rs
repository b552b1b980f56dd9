//! Query strategy hooks that build source-specific page bodies.
//!
//! The fetcher owns paging; a strategy only contributes the fields that depend on the caller's
//! query. Bodies are plain `serde_json` maps so strategies stay independent of any HTTP client.

// self
use crate::_prelude::*;

/// JSON object used as the base of every page body.
pub type BodyFields = serde_json::Map<String, serde_json::Value>;

/// Strategy hook that builds the query-dependent part of each page body.
///
/// Blanket-implemented for closures with the same signature.
pub trait QueryStrategy: Send + Sync {
	/// Returns the body fields for `query`; paging fields are added by the fetcher afterwards.
	fn body_fields(&self, query: Option<&str>) -> BodyFields;
}
impl<F> QueryStrategy for F
where
	F: Fn(Option<&str>) -> BodyFields + Send + Sync,
{
	fn body_fields(&self, query: Option<&str>) -> BodyFields {
		self(query)
	}
}

/// Sends the same fields regardless of the query.
#[derive(Clone, Debug, Default)]
pub struct StaticFields(pub BodyFields);
impl StaticFields {
	/// Adds a field.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.0.insert(name.into(), value.into());

		self
	}
}
impl QueryStrategy for StaticFields {
	fn body_fields(&self, _query: Option<&str>) -> BodyFields {
		self.0.clone()
	}
}

/// Filters on a single field: `{"filters": {<field>: [<query>]}}`, or `{}` without a query.
#[derive(Clone, Debug)]
pub struct FieldFilter {
	field: String,
}
impl FieldFilter {
	/// Creates a filter on `field`.
	pub fn new(field: impl Into<String>) -> Self {
		Self { field: field.into() }
	}
}
impl Display for FieldFilter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "field-filter({})", self.field)
	}
}
impl QueryStrategy for FieldFilter {
	fn body_fields(&self, query: Option<&str>) -> BodyFields {
		let mut fields = BodyFields::new();

		if let Some(query) = query.filter(|query| !query.is_empty()) {
			fields.insert(
				"filters".into(),
				serde_json::json!({ self.field.as_str(): [query] }),
			);
		}

		fields
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn field_filter_wraps_query() {
		let strategy = FieldFilter::new("market_of_interest");

		assert_eq!(
			serde_json::Value::Object(strategy.body_fields(Some("fintech"))),
			serde_json::json!({ "filters": { "market_of_interest": ["fintech"] } })
		);
		assert!(strategy.body_fields(None).is_empty());
		assert!(strategy.body_fields(Some("")).is_empty());
	}

	#[test]
	fn static_fields_ignore_query() {
		let strategy = StaticFields::default().with("original_query", "");

		assert_eq!(strategy.body_fields(Some("fintech")), strategy.body_fields(None));
		assert_eq!(
			serde_json::Value::Object(strategy.body_fields(None)),
			serde_json::json!({ "original_query": "" })
		);
	}

	#[test]
	fn closures_are_strategies() {
		let strategy = |query: Option<&str>| {
			let mut fields = BodyFields::new();

			fields.insert("q".into(), query.unwrap_or("*").into());

			fields
		};

		assert_eq!(strategy.body_fields(None).get("q"), Some(&serde_json::json!("*")));
	}
}
