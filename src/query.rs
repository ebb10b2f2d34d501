//! Batch query data model: call specs, results, and the request/response envelope.
//!
//! A batch is one or more [`CallSpec`] values encoded as a JSON array and sent as the single
//! form field `request`. The service answers with a JSON object keyed by call name, each value
//! holding a `context` object and an optional `items` object. Results are keyed by name, so a
//! batch may not contain the same call twice.

// self
use crate::{_prelude::*, error::ProtocolError};

/// Results of one batch, keyed by call name.
pub type QueryResults = BTreeMap<String, QueryResult>;

/// Reasons a batch is rejected before anything is sent.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum BatchError {
	/// A batch must contain at least one call.
	#[error("A batch must contain at least one call.")]
	Empty,
	/// Results are keyed by call name, so names must be unique.
	#[error("Call `{call}` appears more than once in the batch.")]
	DuplicateCall {
		/// Repeated call name.
		call: String,
	},
	/// Call names must be non-empty and free of whitespace.
	#[error("Call name `{call}` is invalid.")]
	InvalidCallName {
		/// Rejected name.
		call: String,
	},
}

/// One logical remote call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CallSpec {
	/// Dotted call name such as `group.method`.
	#[serde(rename = "call")]
	pub name: String,
	/// Call parameters; the schema is defined by the remote call.
	pub params: JsonMap<String, JsonValue>,
	/// Allow-list of context fields; empty returns every field.
	#[serde(rename = "contextFilter", skip_serializing_if = "BTreeSet::is_empty")]
	pub context_filter: BTreeSet<String>,
	/// Allow-list of item fields; empty returns every field.
	#[serde(rename = "itemsFilter", skip_serializing_if = "BTreeSet::is_empty")]
	pub items_filter: BTreeSet<String>,
}
impl CallSpec {
	/// Creates a call without parameters or filters.
	pub fn new(name: impl Into<String>) -> Result<Self, BatchError> {
		let name = name.into();

		validate_call_name(&name)?;

		Ok(Self {
			name,
			params: JsonMap::new(),
			context_filter: BTreeSet::new(),
			items_filter: BTreeSet::new(),
		})
	}

	/// Adds or replaces a single parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}

	/// Replaces every parameter.
	pub fn with_params(mut self, params: JsonMap<String, JsonValue>) -> Self {
		self.params = params;

		self
	}

	/// Restricts the returned context fields.
	pub fn context_filter<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.context_filter.extend(fields.into_iter().map(Into::into));

		self
	}

	/// Restricts the returned item fields.
	pub fn items_filter<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.items_filter.extend(fields.into_iter().map(Into::into));

		self
	}
}

/// Result of one call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
	/// Call-level metadata.
	#[serde(default)]
	pub context: JsonMap<String, JsonValue>,
	/// Returned items; absent for calls that return nothing (pure actions).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub items: Option<JsonMap<String, JsonValue>>,
}

/// Ordered, non-empty batch of calls with distinct names.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchEnvelope {
	calls: Vec<CallSpec>,
}
impl BatchEnvelope {
	/// Validates `calls` and keeps their order.
	pub fn new<I>(calls: I) -> Result<Self, BatchError>
	where
		I: IntoIterator<Item = CallSpec>,
	{
		let calls = calls.into_iter().collect::<Vec<_>>();

		if calls.is_empty() {
			return Err(BatchError::Empty);
		}

		let mut seen = BTreeSet::new();

		for call in &calls {
			validate_call_name(&call.name)?;

			if !seen.insert(call.name.as_str()) {
				return Err(BatchError::DuplicateCall { call: call.name.clone() });
			}
		}

		Ok(Self { calls })
	}

	/// Calls in request order.
	pub fn calls(&self) -> &[CallSpec] {
		&self.calls
	}

	/// Number of calls.
	pub fn len(&self) -> usize {
		self.calls.len()
	}

	/// Always false for a validated envelope.
	pub fn is_empty(&self) -> bool {
		self.calls.is_empty()
	}

	/// Serializes the calls as the JSON array carried by the `request` field.
	pub fn encode(&self) -> Result<String, ProtocolError> {
		serde_json::to_string(&self.calls).map_err(|source| ProtocolError::Encode { source })
	}
}

/// Parses a batch response body into per-call results.
pub fn decode_response(body: &[u8]) -> Result<QueryResults, ProtocolError> {
	let value = serde_json::from_slice::<JsonValue>(body)
		.map_err(|source| ProtocolError::InvalidJson { source })?;

	if !value.is_object() {
		return Err(ProtocolError::NotAnObject { found: json_kind(&value) });
	}

	serde_path_to_error::deserialize(value).map_err(|source| ProtocolError::InvalidResult {
		path: source.path().to_string(),
		source,
	})
}

pub(crate) fn validate_call_name(name: &str) -> Result<(), BatchError> {
	if name.is_empty() || name.chars().any(char::is_whitespace) {
		Err(BatchError::InvalidCallName { call: name.to_owned() })
	} else {
		Ok(())
	}
}

fn json_kind(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "boolean",
		JsonValue::Number(_) => "number",
		JsonValue::String(_) => "string",
		JsonValue::Array(_) => "array",
		JsonValue::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn call(name: &str) -> CallSpec {
		CallSpec::new(name).expect("Call fixture should be valid.")
	}

	#[test]
	fn envelope_encodes_calls_in_order_with_optional_filters() {
		let envelope = BatchEnvelope::new([
			call("urc.getClans").param("limit", 10).items_filter(["name", "tag"]),
			call("urc.getProfile").context_filter(["ok"]),
		])
		.expect("Envelope should accept distinct calls.");
		let encoded = envelope.encode().expect("Envelope should encode.");

		assert_eq!(
			encoded,
			"[{\"call\":\"urc.getClans\",\"params\":{\"limit\":10},\"itemsFilter\":[\"name\",\"tag\"]},{\"call\":\"urc.getProfile\",\"params\":{},\"contextFilter\":[\"ok\"]}]"
		);
		assert_eq!(envelope.len(), 2);
	}

	#[test]
	fn envelope_rejects_empty_and_duplicate_batches() {
		assert_eq!(BatchEnvelope::new(Vec::new()), Err(BatchError::Empty));
		assert_eq!(
			BatchEnvelope::new([call("a.b"), call("c.d"), call("a.b")]),
			Err(BatchError::DuplicateCall { call: "a.b".into() })
		);
	}

	#[test]
	fn call_names_must_be_non_blank() {
		assert_eq!(CallSpec::new(""), Err(BatchError::InvalidCallName { call: String::new() }));
		assert_eq!(
			CallSpec::new("urc get"),
			Err(BatchError::InvalidCallName { call: "urc get".into() })
		);
	}

	#[test]
	fn response_decodes_into_results_with_optional_items() {
		let body = json!({
			"urc.getClans": { "context": { "ok": true }, "items": { "1": "Clan A" } },
			"urc.leave": { "context": { "ok": true } },
		})
		.to_string();
		let results = decode_response(body.as_bytes()).expect("Well-formed response should decode.");

		assert_eq!(results.len(), 2);

		let clans = &results["urc.getClans"];

		assert_eq!(clans.context.get("ok"), Some(&json!(true)));
		assert_eq!(
			clans.items.as_ref().and_then(|items| items.get("1")),
			Some(&json!("Clan A"))
		);
		assert_eq!(results["urc.leave"].items, None);
	}

	#[test]
	fn malformed_responses_map_to_protocol_errors() {
		assert!(matches!(decode_response(b"<html>"), Err(ProtocolError::InvalidJson { .. })));
		assert!(matches!(
			decode_response(b"[1, 2]"),
			Err(ProtocolError::NotAnObject { found: "array" })
		));

		let err = decode_response(b"{\"urc.getClans\": {\"context\": 5}}")
			.expect_err("Non-object context should be rejected.");

		match err {
			ProtocolError::InvalidResult { path, .. } => assert_eq!(path, "urc.getClans.context"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
