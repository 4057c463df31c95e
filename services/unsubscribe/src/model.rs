//! Persisted unsubscribe document types.
//!
//! # Purpose
//! Defines the JSON shape of the unsubscribe log shared by the store backends
//! and the listing endpoint.
//!
//! # Notes
//! Decoding is lenient so that any document an older writer produced survives
//! a load/save cycle untouched:
//! - `timestamp` may be missing, `null`, or of any JSON type.
//! - Unknown keys on records and on the document are kept in `extra`.
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use utoipa::openapi::schema::AdditionalProperties;
use utoipa::openapi::{ArrayBuilder, ObjectBuilder, Ref, RefOr, Schema, SchemaType};

/// One opted-out address and the time it was recorded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UnsubscribeRecord {
    /// Address as submitted; compared case-insensitively.
    pub email: String,
    /// ISO-8601 UTC creation time for records written by this service.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UnsubscribeRecord {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            timestamp: Some(Value::String(now_iso8601())),
            extra: Map::new(),
        }
    }

    pub fn matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// The timestamp when it is stored as a string.
    pub fn timestamp_str(&self) -> Option<&str> {
        self.timestamp.as_ref().and_then(Value::as_str)
    }
}

/// The full persisted document, in insertion order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UnsubscribeLog {
    #[serde(default)]
    pub unsubscribed: Vec<UnsubscribeRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UnsubscribeLog {
    pub fn find(&self, email: &str) -> Option<&UnsubscribeRecord> {
        self.unsubscribed.iter().find(|record| record.matches(email))
    }

    pub fn len(&self) -> usize {
        self.unsubscribed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unsubscribed.is_empty()
    }
}

// An explicit `null` stays `Some(Value::Null)` so it is written back.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl<'s> ToSchema<'s> for UnsubscribeRecord {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let schema = ObjectBuilder::new()
            .property("email", ObjectBuilder::new().schema_type(SchemaType::String))
            .required("email")
            .property(
                "timestamp",
                ObjectBuilder::new()
                    .schema_type(SchemaType::String)
                    .description(Some("ISO-8601 UTC creation time")),
            )
            .additional_properties(Some(AdditionalProperties::FreeForm(true)))
            .into();
        ("UnsubscribeRecord", schema)
    }
}

impl<'s> ToSchema<'s> for UnsubscribeLog {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let schema = ObjectBuilder::new()
            .property(
                "unsubscribed",
                ArrayBuilder::new().items(Ref::from_schema_name("UnsubscribeRecord")),
            )
            .required("unsubscribed")
            .additional_properties(Some(AdditionalProperties::FreeForm(true)))
            .into();
        ("UnsubscribeLog", schema)
    }
}

/// Current time in the `2026-01-01T00:00:00.000Z` form.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
