//! Inbound request envelope.
//!
//! An event carries a `body` (JSON text or an object) whose
//! `security_detail_json` field holds the case record. Preparing a case
//! yields the case id, a UTC timestamp, the storage key for the generated
//! narrative and the safe payload. Nothing from the raw record except the
//! case id leaves this module unscrubbed.

use chrono::{DateTime, Utc};
use sar_redact::{RawInput, RedactionEngine, SafePayload};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Body field holding the case record.
pub const DETAIL_FIELD: &str = "security_detail_json";

/// Prefix of every output key.
pub const OUTPUT_PREFIX: &str = "sar-output";

/// Timestamp layout used in output keys.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Case id used when the record does not carry a usable one.
pub const UNKNOWN_CASE_ID: &str = "NA";

/// Errors raised while reading an event.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Extract the event body as an object.
///
/// A string body is parsed as JSON; anything that does not yield an object
/// becomes an empty body.
pub fn parse_body(event: &Value) -> Map<String, Value> {
    match event.get("body") {
        Some(Value::String(text)) => match serde_json::from_str(text) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// A case submitted for narrative generation.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRequest {
    detail: Value,
}

impl CaseRequest {
    /// Read the case record out of an event.
    pub fn from_event(event: &Value) -> Result<Self, EnvelopeError> {
        let mut body = parse_body(event);
        let detail = body
            .remove(DETAIL_FIELD)
            .ok_or(EnvelopeError::MissingField(DETAIL_FIELD))?;
        Ok(Self { detail })
    }

    /// Wrap a case record directly.
    pub fn new(detail: Value) -> Self {
        Self { detail }
    }

    /// The record as submitted: JSON text (as a string value) or inline JSON.
    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// Builder input for the record. String details are treated as raw JSON text.
    pub fn raw_input(&self) -> RawInput<'_> {
        match &self.detail {
            Value::String(text) => RawInput::Text(text),
            other => RawInput::from(other),
        }
    }

    /// The case id, or `NA`.
    pub fn case_id(&self) -> String {
        extract_case_id(&self.detail)
    }
}

/// Read `case_id` from a record given inline or as JSON text.
///
/// Missing, null, empty, zero or false ids, and unparseable text, yield `NA`.
pub fn extract_case_id(detail: &Value) -> String {
    let parsed;
    let record = match detail {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(_) => return UNKNOWN_CASE_ID.to_string(),
        },
        other => other,
    };

    // Only strings and numbers name a case; `true`, arrays and objects give NA.
    match record.get("case_id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => UNKNOWN_CASE_ID.to_string(),
    }
}

/// Storage key for a generated narrative.
///
/// Path separators in the case id are replaced so the id stays one segment.
pub fn output_key(case_id: &str, timestamp: &str) -> String {
    let segment: String = case_id
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}/{}/{}.json", OUTPUT_PREFIX, segment, timestamp)
}

/// Everything the narrative and persistence steps need for one case.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedCase {
    pub case_id: String,
    pub timestamp: String,
    pub output_key: String,
    pub safe_payload: SafePayload,
}

/// Prepare a case at time `now`.
pub fn prepare(
    engine: &RedactionEngine,
    request: &CaseRequest,
    now: DateTime<Utc>,
) -> PreparedCase {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let case_id = request.case_id();
    let output_key = output_key(&case_id, &timestamp);
    let (safe_payload, summary) = engine.build_with_summary(request.raw_input());

    tracing::info!(
        target: "sar_core::prepare",
        has_case_id = case_id != UNKNOWN_CASE_ID,
        kept_fields = summary.kept_fields,
        dropped_fields = summary.dropped_fields(),
        matches = summary.matches.total(),
        "case prepared"
    );

    PreparedCase {
        case_id,
        timestamp,
        output_key,
        safe_payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sar_redact::{KeyMaterial, RedactionPolicy};
    use serde_json::json;

    fn engine() -> RedactionEngine {
        let key = KeyMaterial::from_bytes(b"project-secret".to_vec()).unwrap();
        RedactionEngine::new(&key, &RedactionPolicy::new(["case_id", "summary"])).unwrap()
    }

    #[test]
    fn test_parse_body_variants() {
        let body = parse_body(&json!({"body": "{\"a\": 1}"}));
        assert_eq!(body["a"], 1);

        let body = parse_body(&json!({"body": {"a": 2}}));
        assert_eq!(body["a"], 2);

        assert!(parse_body(&json!({"body": "not json"})).is_empty());
        assert!(parse_body(&json!({"body": "[1, 2]"})).is_empty());
        assert!(parse_body(&json!({"body": 7})).is_empty());
        assert!(parse_body(&json!({})).is_empty());
    }

    #[test]
    fn test_missing_detail() {
        let err = CaseRequest::from_event(&json!({"body": {"other": 1}})).unwrap_err();
        assert!(matches!(err, EnvelopeError::MissingField(DETAIL_FIELD)));
        assert_eq!(err.to_string(), "missing field: security_detail_json");
    }

    #[test]
    fn test_null_detail_is_accepted() {
        let request = CaseRequest::from_event(&json!({"body": {"security_detail_json": null}})).unwrap();
        assert_eq!(request.case_id(), "NA");
    }

    #[test]
    fn test_extract_case_id() {
        assert_eq!(extract_case_id(&json!({"case_id": "C-1"})), "C-1");
        assert_eq!(extract_case_id(&json!("{\"case_id\": \"C-2\"}")), "C-2");
        assert_eq!(extract_case_id(&json!({"case_id": 42})), "42");
        assert_eq!(extract_case_id(&json!({"case_id": ""})), "NA");
        assert_eq!(extract_case_id(&json!({"case_id": null})), "NA");
        assert_eq!(extract_case_id(&json!({"case_id": 0})), "NA");
        assert_eq!(extract_case_id(&json!({"case_id": false})), "NA");
        assert_eq!(extract_case_id(&json!({})), "NA");
        assert_eq!(extract_case_id(&json!("not json")), "NA");
        assert_eq!(extract_case_id(&json!(["case_id"])), "NA");
    }

    #[test]
    fn test_structured_case_id_is_unknown() {
        assert_eq!(extract_case_id(&json!({"case_id": true})), "NA");
        assert_eq!(extract_case_id(&json!({"case_id": ["C-1"]})), "NA");
        assert_eq!(extract_case_id(&json!({"case_id": {"id": "C-1"}})), "NA");
        assert_eq!(extract_case_id(&json!("{\"case_id\": [1]}")), "NA");
    }

    #[test]
    fn test_output_key() {
        assert_eq!(
            output_key("C-1", "20240514T101500Z"),
            "sar-output/C-1/20240514T101500Z.json"
        );
        assert_eq!(
            output_key("a/../b", "20240514T101500Z"),
            "sar-output/a_.._b/20240514T101500Z.json"
        );
    }

    #[test]
    fn test_prepare_from_string_detail() {
        let event = json!({
            "body": {
                "security_detail_json": "{\"case_id\": \"C-1\", \"summary\": \"Contact john.doe@example.com, card 4111111111111111\", \"ip\": \"should be dropped\"}"
            }
        });
        let request = CaseRequest::from_event(&event).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 14, 10, 15, 0).unwrap();
        let prepared = prepare(&engine(), &request, now);

        assert_eq!(prepared.case_id, "C-1");
        assert_eq!(prepared.timestamp, "20240514T101500Z");
        assert_eq!(prepared.output_key, "sar-output/C-1/20240514T101500Z.json");
        assert_eq!(
            prepared.safe_payload.as_str(),
            r#"{"case_id":"C-1","summary":"Contact [EMAIL:28ddad], card [CARD:1e7d1b]"}"#
        );
    }

    #[test]
    fn test_prepare_from_inline_detail_and_text_body() {
        let body = json!({"security_detail_json": {"case_id": "C-9", "summary": "ip 10.0.0.1"}});
        let event = json!({"body": body.to_string()});
        let request = CaseRequest::from_event(&event).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let prepared = prepare(&engine(), &request, now);

        assert_eq!(prepared.output_key, "sar-output/C-9/20240102T030405Z.json");
        assert!(!prepared.safe_payload.as_str().contains("10.0.0.1"));
    }

    #[test]
    fn test_prepared_case_serializes_payload_as_text() {
        let request = CaseRequest::new(json!({"case_id": "C-3"}));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let value = serde_json::to_value(prepare(&engine(), &request, now)).unwrap();
        assert_eq!(value["safe_payload"], r#"{"case_id":"C-3"}"#);
    }
}
