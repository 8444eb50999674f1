//! Row types: raw export documents, per-message rows, and enriched output records.

use crate::config::Platform;
use crate::intent::Intent;
use crate::json_utils::{field_as_string, field_passthrough, non_null};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One raw export document. Unknown fields are ignored; a `messages` value that
/// is not an array counts as absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawExportRecord {
    pub messages: Option<Vec<Value>>,
    pub fetched_at: Option<Value>,
}

impl RawExportRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            messages: v.get("messages").and_then(|m| m.as_array()).cloned(),
            fetched_at: non_null(v, "fetched_at").cloned(),
        }
    }

    /// `ts` of the first message when present and non-null.
    pub fn first_message_ts(&self) -> Option<&Value> {
        self.messages.as_ref()?.first().and_then(|m| non_null(m, "ts"))
    }
}

/// Message fields projected out of one `messages` element. Non-object
/// elements project to all-`None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMessage {
    pub id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub text: Option<String>,
    pub ts: Option<String>,
    pub meta: Option<Value>,
}

impl RawMessage {
    pub fn from_value(v: &Value) -> Self {
        if !v.is_object() {
            return Self::default();
        }
        Self {
            id: field_as_string(v.get("id")),
            from: field_as_string(v.get("from")),
            to: field_as_string(v.get("to")),
            text: field_as_string(v.get("text")),
            ts: field_as_string(v.get("ts")),
            meta: field_passthrough(v.get("meta")),
        }
    }
}

/// Flattened row before enrichment.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageRow {
    pub platform: Platform,
    pub dt: Option<String>,
    pub message_id: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub text: Option<String>,
    pub message_ts: Option<String>,
    pub meta: Option<Value>,
}

impl MessageRow {
    pub fn new(platform: Platform, dt: Option<String>, msg: RawMessage) -> Self {
        Self {
            platform,
            dt,
            message_id: msg.id,
            sender: msg.from,
            recipient: msg.to,
            text: msg.text,
            message_ts: msg.ts,
            meta: msg.meta,
        }
    }
}

/// Placeholder sentiment; no sentiment analysis is performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    #[default]
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

/// Enriched output row. `None` fields are omitted when serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    pub intent: Intent,
    pub sentiment: Sentiment,
    pub ingested_at: String,
    pub platform_part: String,
}

/// Line printed to stdout after a successful write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub ok: bool,
    pub source: String,
    pub target: String,
    pub count: u64,
}
