use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::warn;
use uuid::Uuid;

use crate::errors::NotificationError;

pub const DEFAULT_TITLE: &str = "Notification";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Info => "info",
            NotificationType::Success => "success",
            NotificationType::Warning => "warning",
            NotificationType::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "info" => Some(NotificationType::Info),
            "success" => Some(NotificationType::Success),
            "warning" => Some(NotificationType::Warning),
            "error" => Some(NotificationType::Error),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller provides when sending; the service fills in id, timestamp and read state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NotificationInput {
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
}

impl NotificationInput {
    pub fn new(
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            action_url: None,
            metadata: None,
        }
    }

    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
}

impl Notification {
    pub fn new(input: NotificationInput, id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: input.kind,
            title: input.title,
            message: input.message,
            timestamp,
            read: false,
            action_url: input.action_url,
            metadata: input.metadata,
        }
    }

    /// Returns `true` if the notification was unread before the call.
    pub fn mark_as_read(&mut self) -> bool {
        let changed = !self.read;
        self.read = true;
        changed
    }

    /// `metadata.category`, if the sender set one.
    pub fn category(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("category")?.as_str()
    }
}

impl From<NotificationInput> for Notification {
    fn from(input: NotificationInput) -> Self {
        Notification::new(input, generate_id(), Utc::now())
    }
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Raw server → client payload. Every field is optional and loosely typed;
/// see [`InboundPayload::into_notification`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundPayload {
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(rename = "type", default)]
    pub kind: Option<JsonValue>,
    #[serde(default)]
    pub title: Option<JsonValue>,
    #[serde(default)]
    pub message: Option<JsonValue>,
    #[serde(default)]
    pub timestamp: Option<JsonValue>,
    #[serde(default)]
    pub action_url: Option<JsonValue>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

impl InboundPayload {
    /// Parses a text frame. Anything that is not a JSON object is rejected.
    pub fn parse(raw: &str) -> Result<Self, NotificationError> {
        let value: JsonValue =
            serde_json::from_str(raw).map_err(|e| NotificationError::Parse(e.to_string()))?;
        if !value.is_object() {
            return Err(NotificationError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| NotificationError::Parse(e.to_string()))
    }

    /// Applies the defaulting rules: generated id, `info` type, default
    /// title, empty message, receipt time, and always unread.
    pub fn into_notification(self, received_at: DateTime<Utc>) -> Notification {
        let id = match self.id {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => s,
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => generate_id(),
        };
        let kind = match coerce_text(self.kind) {
            None => NotificationType::default(),
            Some(raw) => NotificationType::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown notification type '{}' for id {}, using info", raw, id);
                NotificationType::Info
            }),
        };
        let timestamp = self
            .timestamp
            .as_ref()
            .and_then(parse_timestamp)
            .unwrap_or(received_at);

        Notification {
            id,
            kind,
            title: coerce_text(self.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            message: coerce_text(self.message).unwrap_or_default(),
            timestamp,
            read: false,
            action_url: coerce_text(self.action_url),
            metadata: self.metadata,
        }
    }
}

/// Strings pass through, numbers and booleans are stringified, anything else is absent.
fn coerce_text(value: Option<JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) => Some(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// RFC 3339 strings or epoch milliseconds.
fn parse_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        JsonValue::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Reconnect budget exhausted; only an explicit connect resumes.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Published by the store after every effective mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Saved(Notification),
    Read { notification_id: String },
    AllRead { count: usize },
    Deleted { notification_id: String },
    Cleared,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn notification_type_default_is_info() {
        assert_eq!(NotificationType::default(), NotificationType::Info);
    }

    #[test]
    fn notification_from_input() {
        let input =
            NotificationInput::new(NotificationType::Warning, "Maintenance", "Tonight at 22:00")
                .with_action_url("/admin/updates")
                .with_metadata(json!({"category": "system"}));
        let notification = Notification::from(input.clone());

        assert_eq!(notification.kind, NotificationType::Warning);
        assert_eq!(notification.title, input.title);
        assert_eq!(notification.action_url.as_deref(), Some("/admin/updates"));
        assert_eq!(notification.category(), Some("system"));
        assert!(Uuid::parse_str(&notification.id).is_ok());
        assert!(!notification.read);
        assert!(notification.timestamp <= Utc::now());
    }

    #[test]
    fn mark_as_read_reports_transition_once() {
        let mut notification =
            Notification::from(NotificationInput::new(NotificationType::Info, "a", "b"));
        assert!(notification.mark_as_read());
        assert!(!notification.mark_as_read());
        assert!(notification.read);
    }

    #[test]
    fn serialization_uses_wire_field_names() {
        let mut notification =
            Notification::from(NotificationInput::new(NotificationType::Error, "X", "Y"));
        notification.id = "n-1".to_string();
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["id"], "n-1");
        assert_eq!(value["read"], false);
        assert!(value.get("action_url").is_none());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn inbound_minimal_payload_gets_defaults() {
        let now = Utc::now();
        let n = InboundPayload::parse("{}").unwrap().into_notification(now);
        assert!(Uuid::parse_str(&n.id).is_ok());
        assert_eq!(n.kind, NotificationType::Info);
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.message, "");
        assert_eq!(n.timestamp, now);
        assert!(!n.read);
    }

    #[test]
    fn inbound_read_flag_is_ignored() {
        let n = InboundPayload::parse(r#"{"id":"a","read":true,"type":"success"}"#)
            .unwrap()
            .into_notification(Utc::now());
        assert_eq!(n.id, "a");
        assert_eq!(n.kind, NotificationType::Success);
        assert!(!n.read);
    }

    #[test]
    fn inbound_numeric_id_is_stringified_and_empty_id_regenerated() {
        let n = InboundPayload::parse(r#"{"id": 42}"#).unwrap().into_notification(Utc::now());
        assert_eq!(n.id, "42");
        let n = InboundPayload::parse(r#"{"id": "  "}"#).unwrap().into_notification(Utc::now());
        assert!(Uuid::parse_str(&n.id).is_ok());
    }

    #[test]
    fn inbound_unknown_type_falls_back_to_info() {
        let n = InboundPayload::parse(r#"{"type": "critical"}"#)
            .unwrap()
            .into_notification(Utc::now());
        assert_eq!(n.kind, NotificationType::Info);
    }

    fn may_day_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(json!("2024-05-01T12:00:00Z"), Some(may_day_noon()))]
    #[case(json!(1714564800000i64), Some(may_day_noon()))]
    #[case(json!("yesterday"), None)]
    #[case(json!(true), None)]
    fn timestamps(#[case] raw: JsonValue, #[case] expected: Option<DateTime<Utc>>) {
        assert_eq!(parse_timestamp(&raw), expected);
    }

    #[rstest]
    #[case("not json")]
    #[case("[1, 2, 3]")]
    #[case("null")]
    #[case("\"text\"")]
    fn malformed_payloads_are_rejected(#[case] raw: &str) {
        assert!(matches!(InboundPayload::parse(raw), Err(NotificationError::Parse(_))));
    }

    #[test]
    fn inbound_loosely_typed_fields_are_coerced() {
        let n = InboundPayload::parse(
            r#"{"type":"info","title":12,"message":true,"action_url":5,"id":"x"}"#,
        )
        .unwrap()
        .into_notification(Utc::now());
        assert_eq!(n.id, "x");
        assert_eq!(n.title, "12");
        assert_eq!(n.message, "true");
        assert_eq!(n.action_url.as_deref(), Some("5"));
    }

    #[test]
    fn inbound_structured_fields_fall_back_to_defaults() {
        let n = InboundPayload::parse(
            r#"{"type":["warning"],"title":{"text":"x"},"message":null,"action_url":[]}"#,
        )
        .unwrap()
        .into_notification(Utc::now());
        assert_eq!(n.kind, NotificationType::Info);
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.message, "");
        assert_eq!(n.action_url, None);
    }
}
