use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Value of `message.text` that marks a successful send. Matched exactly.
pub const SUCCESS_TEXT: &str = "Success";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// Decoded Zenziva XML reply as a nested field mapping.
///
/// The root element is dropped; its children are the top-level keys.
pub struct ProviderResponse(Value);

impl ProviderResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a field by dotted path, e.g. `"message.text"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.0, |node, key| node.as_object()?.get(key))
    }

    /// `message.text`, when present and textual.
    pub fn message_text(&self) -> Option<&str> {
        self.get("message.text").and_then(Value::as_str)
    }

    /// Typed view of the `message` element.
    pub fn message(&self) -> Option<MessageStatus> {
        let message = self.get("message")?;
        MessageStatus::deserialize(message).ok()
    }

    pub fn is_success(&self) -> bool {
        self.message_text() == Some(SUCCESS_TEXT)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
/// The `message` element of a Zenziva reply.
///
/// Fields missing from the reply, or sent as empty elements, are `None`.
pub struct MessageStatus {
    #[serde(default, deserialize_with = "text_field")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub balance: Option<String>,
}

fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq)]
/// Result of a single send.
pub enum SendOutcome {
    /// Zenziva accepted the message (`message.text == "Success"`).
    Success { response: ProviderResponse },
    /// The transport failed or Zenziva rejected the message.
    ///
    /// `response` is present when a reply was received and decoded.
    Failure {
        error: String,
        response: Option<ProviderResponse>,
    },
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn response(&self) -> Option<&ProviderResponse> {
        match self {
            Self::Success { response } => Some(response),
            Self::Failure { response, .. } => response.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Append-only record of the errors and replies seen by one client.
pub struct History {
    errors: Vec<String>,
    responses: Vec<ProviderResponse>,
}

impl History {
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }

    pub fn responses(&self) -> &[ProviderResponse] {
        &self.responses
    }

    pub fn last_response(&self) -> Option<&ProviderResponse> {
        self.responses.last()
    }

    pub(crate) fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub(crate) fn record_response(&mut self, response: ProviderResponse) {
        self.responses.push(response);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn reply(text: Value) -> ProviderResponse {
        ProviderResponse::new(json!({
            "message": {
                "to": "081234567890",
                "status": "0",
                "text": text,
                "balance": {}
            }
        }))
    }

    #[test]
    fn success_requires_exact_text() {
        assert!(reply(json!("Success")).is_success());
        assert!(!reply(json!("success")).is_success());
        assert!(!reply(json!("Success ")).is_success());
        assert!(!reply(json!({})).is_success());
    }

    #[test]
    fn get_walks_dotted_paths() {
        let response = reply(json!("Success"));
        assert_eq!(response.get("message.to"), Some(&json!("081234567890")));
        assert_eq!(response.get("message.missing"), None);
        assert_eq!(response.get("message.to.deeper"), None);
    }

    #[test]
    fn message_view_treats_empty_elements_as_none() {
        let status = reply(json!("Invalid Sender ID")).message().unwrap();
        assert_eq!(
            status,
            MessageStatus {
                to: Some("081234567890".to_owned()),
                status: Some("0".to_owned()),
                text: Some("Invalid Sender ID".to_owned()),
                balance: None,
            }
        );
    }

    #[test]
    fn history_tracks_last_entries() {
        let mut history = History::default();
        assert_eq!(history.last_error(), None);
        assert!(history.last_response().is_none());

        history.record_error("first");
        history.record_error("second");
        history.record_response(reply(json!("Success")));

        assert_eq!(history.errors(), ["first", "second"]);
        assert_eq!(history.last_error(), Some("second"));
        assert_eq!(history.responses().len(), 1);
        assert!(history.last_response().unwrap().is_success());
    }
}
