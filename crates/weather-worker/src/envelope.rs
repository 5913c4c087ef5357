//! NLIP-style message envelope
//!
//! ```json
//! {"format": "text", "subformat": "english", "content": "alerts for CA",
//!  "submessages": [{"format": "text", "subformat": "english", "content": "thanks"}]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message part carried alongside the main content
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubMessage {
    pub format: String,
    pub subformat: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messagetype: Option<String>,
    pub format: String,
    pub subformat: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submessages: Vec<SubMessage>,
}

fn text_part<'a>(format: &str, content: &'a Value) -> Option<&'a str> {
    if format.eq_ignore_ascii_case("text") {
        content.as_str()
    } else {
        None
    }
}

impl Envelope {
    /// Plain English text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            messagetype: None,
            format: "text".into(),
            subformat: "english".into(),
            content: Value::String(content.into()),
            label: None,
            submessages: Vec::new(),
        }
    }

    pub fn parse(raw: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(raw)
    }

    /// Every text part (main message first, then submessages) joined by a space
    pub fn extract_text(&self) -> String {
        std::iter::once(text_part(&self.format, &self.content))
            .chain(
                self.submessages
                    .iter()
                    .map(|sub| text_part(&sub.format, &sub.content)),
            )
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_reply_shape() {
        let value = serde_json::to_value(Envelope::text("Sunny and 72°F")).unwrap();
        assert_eq!(
            value,
            json!({"format": "text", "subformat": "english", "content": "Sunny and 72°F"})
        );
    }

    #[test]
    fn test_extract_joins_text_parts() {
        let envelope = Envelope::parse(
            json!({
                "messagetype": "request",
                "format": "text",
                "subformat": "english",
                "content": "What are the alerts",
                "submessages": [
                    {"format": "structured", "subformat": "json", "content": {"state": "CA"}},
                    {"format": "Text", "subformat": "english", "content": "for California?"}
                ]
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(envelope.extract_text(), "What are the alerts for California?");
    }

    #[test]
    fn test_extract_without_text_is_empty() {
        let envelope = Envelope::parse(
            br#"{"format": "binary", "subformat": "png", "content": "iVBORw0KGgo="}"#,
        )
        .unwrap();
        assert_eq!(envelope.extract_text(), "");
    }

    #[test]
    fn test_malformed() {
        assert!(Envelope::parse(b"not json").is_err());
        assert!(Envelope::parse(br#"{"content": "missing format"}"#).is_err());
    }
}
