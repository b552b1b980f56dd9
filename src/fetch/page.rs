// self
use crate::{_prelude::*, error::DecodeError, fetch::SourceRecord, source::SourceDescriptor};

/// One decoded page of a source.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
	/// Zero-based page index.
	pub index: usize,
	/// Records in upstream order.
	pub records: Vec<SourceRecord>,
}
impl Page {
	/// A page that contributes no records.
	pub fn empty(index: usize) -> Self {
		Self { index, records: Vec::new() }
	}

	/// Decodes a page body, extracting the array under the source's records field.
	///
	/// Each record must be a JSON object; anything else is reported with its JSON path.
	pub fn decode(
		source: &SourceDescriptor,
		index: usize,
		body: &[u8],
	) -> Result<Self, DecodeError> {
		let json_error = |source_error| DecodeError::Json {
			upstream: source.id.clone(),
			page: index,
			source: source_error,
		};
		let mut de = serde_json::Deserializer::from_slice(body);
		let mut envelope: serde_json::Map<String, serde_json::Value> =
			serde_path_to_error::deserialize(&mut de).map_err(json_error)?;
		let raw = envelope.remove(&source.records_field).ok_or_else(|| {
			DecodeError::MissingRecords {
				upstream: source.id.clone(),
				page: index,
				field: source.records_field.clone(),
			}
		})?;
		let objects: Vec<serde_json::Map<String, serde_json::Value>> =
			serde_path_to_error::deserialize(raw).map_err(json_error)?;

		Ok(Self { index, records: objects.into_iter().map(serde_json::Value::Object).collect() })
	}

	/// Consumes the page, yielding its records.
	pub fn into_records(self) -> Vec<SourceRecord> {
		self.records
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::test_source;

	fn source() -> SourceDescriptor {
		test_source("hub", "https://hub.example", "/search")
			.build()
			.expect("Descriptor should build.")
	}

	#[test]
	fn decode_extracts_records_field() {
		let page = Page::decode(&source(), 2, br#"{"count":2,"results":[{"id":1},{"id":2}]}"#)
			.expect("Page should decode.");

		assert_eq!(page.index, 2);
		assert_eq!(page.records, [serde_json::json!({ "id": 1 }), serde_json::json!({ "id": 2 })]);
	}

	#[test]
	fn decode_reports_missing_field() {
		let err = Page::decode(&source(), 0, br#"{"result":[]}"#)
			.expect_err("Missing records field should fail.");

		assert!(matches!(
			err,
			DecodeError::MissingRecords { ref field, page: 0, .. } if field == "results"
		));
	}

	#[test]
	fn decode_reports_json_path() {
		let err = Page::decode(&source(), 1, br#"{"results":[{"id":1},7]}"#)
			.expect_err("Non-object record should fail.");
		match err {
			DecodeError::Json { source: path_error, page, .. } => {
				assert_eq!(page, 1);
				assert!(matches!(
					path_error.path().iter().next(),
					Some(serde_path_to_error::Segment::Seq { index: 1 })
				));
			},
			other => panic!("Expected a JSON decode error, got {other:?}."),
		}

		assert!(matches!(
			Page::decode(&source(), 0, b"not json"),
			Err(DecodeError::Json { .. })
		));
	}
}
