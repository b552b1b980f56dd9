//! Foreign-key inner join over two fetched record sets.

// self
use crate::{_prelude::*, fetch::SourceRecord};

/// Normalized join key.
///
/// Text and integer keys never match each other: `"2"` and `2` are distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum JoinKey {
	/// Non-empty string value.
	Text(String),
	/// Non-zero integral value; covers the full `i64` and `u64` ranges and integral floats.
	Integer(i128),
}
impl JoinKey {
	/// Normalizes a JSON value; null, empty, zero, boolean, fractional, and composite values yield
	/// `None` and never participate in a join.
	///
	/// `2`, `2.0`, and `2e0` normalize to the same key.
	pub fn from_value(value: &serde_json::Value) -> Option<Self> {
		match value {
			serde_json::Value::String(text) if !text.is_empty() => Some(Self::Text(text.clone())),
			serde_json::Value::Number(number) => number
				.as_i64()
				.map(i128::from)
				.or_else(|| number.as_u64().map(i128::from))
				.or_else(|| number.as_f64().and_then(integral))
				.filter(|integer| *integer != 0)
				.map(Self::Integer),
			_ => None,
		}
	}
}
impl Display for JoinKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Text(text) => f.write_str(text),
			Self::Integer(integer) => write!(f, "{integer}"),
		}
	}
}

fn integral(float: f64) -> Option<i128> {
	// Beyond 2^64 a float no longer identifies a single id.
	(float.fract() == 0. && float.abs() < 2_f64.powi(64)).then_some(float as i128)
}

/// Names the two fields a join inspects.
pub trait JoinContract: Send + Sync {
	/// Key of a primary-source record.
	fn identifier(&self, record: &SourceRecord) -> Option<JoinKey>;

	/// Key a secondary-source record points at.
	fn foreign_key(&self, record: &SourceRecord) -> Option<JoinKey>;
}

/// Joins on two top-level fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldJoin {
	/// Identifier field on primary records.
	pub identifier: String,
	/// Foreign-key field on secondary records.
	pub foreign_key: String,
}
impl FieldJoin {
	/// Creates a contract over the given field names.
	pub fn new(identifier: impl Into<String>, foreign_key: impl Into<String>) -> Self {
		Self { identifier: identifier.into(), foreign_key: foreign_key.into() }
	}
}
impl JoinContract for FieldJoin {
	fn identifier(&self, record: &SourceRecord) -> Option<JoinKey> {
		record.get(&self.identifier).and_then(JoinKey::from_value)
	}

	fn foreign_key(&self, record: &SourceRecord) -> Option<JoinKey> {
		record.get(&self.foreign_key).and_then(JoinKey::from_value)
	}
}

/// A primary record paired with the secondary record pointing at it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
	/// Record from the primary source.
	pub primary: SourceRecord,
	/// Record from the secondary source.
	pub secondary: SourceRecord,
}

/// Independent fetch and match counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationCounts {
	/// Primary records fetched.
	pub fetched_a: usize,
	/// Secondary records fetched.
	pub fetched_b: usize,
	/// Distinct foreign keys among secondary records.
	pub matched: usize,
}

/// Joined records plus counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
	/// Joined records in primary order.
	pub results: Vec<JoinedRecord>,
	/// Fetch and match counters.
	pub counts: AggregationCounts,
}

/// Inner-joins `primary` with `secondary`.
///
/// Secondary records are indexed by foreign key in scan order, so a repeated key keeps the last
/// record. Every primary record whose identifier is indexed yields one [`JoinedRecord`].
pub fn join(
	primary: &[SourceRecord],
	secondary: &[SourceRecord],
	contract: &dyn JoinContract,
) -> AggregationResult {
	let mut index = HashMap::with_capacity(secondary.len());

	for record in secondary {
		if let Some(key) = contract.foreign_key(record) {
			index.insert(key, record);
		}
	}

	let results = primary
		.iter()
		.filter_map(|record| {
			let secondary = index.get(&contract.identifier(record)?)?;

			Some(JoinedRecord { primary: record.clone(), secondary: (*secondary).clone() })
		})
		.collect();

	AggregationResult {
		results,
		counts: AggregationCounts {
			fetched_a: primary.len(),
			fetched_b: secondary.len(),
			matched: index.len(),
		},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn contract() -> FieldJoin {
		FieldJoin::new("id", "fk")
	}

	#[test]
	fn joins_on_foreign_key_and_skips_null() {
		let primary = [json!({ "id": 1 }), json!({ "id": 2 }), json!({ "id": 3 })];
		let secondary = [json!({ "fk": 2 }), json!({ "fk": 3 }), json!({ "fk": null })];
		let result = join(&primary, &secondary, &contract());
		let ids =
			result.results.iter().map(|joined| joined.primary["id"].clone()).collect::<Vec<_>>();

		assert_eq!(ids, [json!(2), json!(3)]);
		assert_eq!(result.results[0].secondary, json!({ "fk": 2 }));
		assert_eq!(result.counts, AggregationCounts { fetched_a: 3, fetched_b: 3, matched: 2 });
	}

	#[test]
	fn later_duplicate_wins() {
		let primary = [json!({ "id": 2 })];
		let secondary = [json!({ "fk": 2, "v": "first" }), json!({ "fk": 2, "v": "second" })];
		let result = join(&primary, &secondary, &contract());

		assert_eq!(result.results.len(), 1);
		assert_eq!(result.results[0].secondary["v"], "second");
		assert_eq!(result.counts.matched, 1);
	}

	#[test]
	fn falsy_and_composite_keys_never_match() {
		let values = [
			json!(null),
			json!(""),
			json!(0),
			json!(0.0),
			json!(1.5),
			json!(false),
			json!([1]),
			json!({ "a": 1 }),
		];

		for value in values {
			assert_eq!(JoinKey::from_value(&value), None, "{value} should not be a key");
		}

		let primary = [json!({ "id": "" }), json!({ "id": 0 }), json!({})];
		let secondary = [json!({ "fk": "" }), json!({ "fk": 0 }), json!({})];
		let result = join(&primary, &secondary, &contract());

		assert!(result.results.is_empty());
		assert_eq!(result.counts, AggregationCounts { fetched_a: 3, fetched_b: 3, matched: 0 });
	}

	#[test]
	fn wide_and_float_integers_match() {
		let primary = [json!({ "id": u64::MAX }), json!({ "id": 2 })];
		let secondary = [json!({ "fk": u64::MAX, "v": "wide" }), json!({ "fk": 2.0, "v": "float" })];
		let result = join(&primary, &secondary, &contract());

		assert_eq!(result.counts.matched, 2);
		assert_eq!(result.results[0].secondary["v"], "wide");
		assert_eq!(result.results[1].secondary["v"], "float");
		assert_eq!(JoinKey::from_value(&json!(u64::MAX)), Some(JoinKey::Integer(u64::MAX.into())));
	}

	#[test]
	fn text_and_integer_keys_are_distinct() {
		let primary = [json!({ "id": "2" }), json!({ "id": 2 })];
		let secondary = [json!({ "fk": 2 })];
		let result = join(&primary, &secondary, &contract());

		assert_eq!(result.results.len(), 1);
		assert_eq!(result.results[0].primary, json!({ "id": 2 }));
		assert_eq!(JoinKey::Text("abc".into()).to_string(), "abc");
	}

	#[test]
	fn serializes_to_documented_shape() {
		let result = join(&[json!({ "id": 1 })], &[json!({ "fk": 1 })], &contract());

		assert_eq!(
			serde_json::to_value(&result).expect("Result should serialize."),
			json!({
				"results": [{ "primary": { "id": 1 }, "secondary": { "fk": 1 } }],
				"counts": { "fetched_a": 1, "fetched_b": 1, "matched": 1 }
			})
		);
	}
}
