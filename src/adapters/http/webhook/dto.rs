//! Wire types for the webhook endpoint.
//!
//! Only the fields the processor acts on are captured; everything else in
//! the provider payload is ignored.

use serde::Deserialize;

/// Webhook notification body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookBody {
    /// Declared event kind (e.g. "payment").
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub data: Option<WebhookData>,
}

/// Event payload container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookData {
    /// Provider event id; arrives as a number or a string depending on
    /// the notification variant.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl WebhookBody {
    /// Event id from the body, normalized to a string.
    pub fn data_id(&self) -> Option<String> {
        match self.data.as_ref()?.id.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Query-string fallback for the event id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "data.id", default)]
    pub data_id: Option<String>,

    #[serde(default)]
    pub id: Option<String>,
}

impl WebhookQuery {
    /// Event id from the query string, preferring `data.id` over `id`.
    pub fn event_id(&self) -> Option<String> {
        self.data_id
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.clone().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_with_string_id_decodes() {
        let body: WebhookBody =
            serde_json::from_str(r#"{"type": "payment", "data": {"id": "12345"}}"#).unwrap();

        assert_eq!(body.kind.as_deref(), Some("payment"));
        assert_eq!(body.data_id().as_deref(), Some("12345"));
    }

    #[test]
    fn body_with_numeric_id_decodes() {
        let body: WebhookBody =
            serde_json::from_str(r#"{"type": "payment", "data": {"id": 12345678901}}"#).unwrap();

        assert_eq!(body.data_id().as_deref(), Some("12345678901"));
    }

    #[test]
    fn body_without_data_yields_no_id() {
        let body: WebhookBody = serde_json::from_str(r#"{"type": "test"}"#).unwrap();
        assert!(body.data_id().is_none());
    }

    #[test]
    fn body_with_empty_string_id_yields_no_id() {
        let body: WebhookBody =
            serde_json::from_str(r#"{"type": "payment", "data": {"id": ""}}"#).unwrap();
        assert!(body.data_id().is_none());
    }

    #[test]
    fn query_prefers_data_id_over_id() {
        let query = WebhookQuery {
            data_id: Some("111".to_string()),
            id: Some("222".to_string()),
        };
        assert_eq!(query.event_id().as_deref(), Some("111"));
    }

    #[test]
    fn query_falls_back_to_id() {
        let query = WebhookQuery {
            data_id: None,
            id: Some("222".to_string()),
        };
        assert_eq!(query.event_id().as_deref(), Some("222"));
    }
}
