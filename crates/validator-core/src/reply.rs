//! Reply extraction from the different response shapes providers return.
//!
//! The lookup order is fixed: a top-level `reply`, then the chat-completion
//! `choices[0].message.content`, then the responses-API
//! `output[0].content[0].text`, and finally the whole body serialized as
//! text so the user always sees something.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Reply,
    Choices,
    Output,
    /// No known shape matched; the raw body is surfaced instead.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub fn extract_reply(body: &Value) -> Reply {
    let candidates = [
        (ReplySource::Reply, body.get("reply")),
        (ReplySource::Choices, body.pointer("/choices/0/message/content")),
        (ReplySource::Output, body.pointer("/output/0/content/0/text")),
    ];

    for (source, candidate) in candidates {
        if let Some(text) = non_empty_str(candidate) {
            return Reply {
                text: text.to_string(),
                source,
            };
        }
    }

    Reply {
        text: body.to_string(),
        source: ReplySource::Raw,
    }
}

/// Message carried by an error body, if it has one.
///
/// Providers nest it as `error.message`; the proxy's own failures use a
/// flat `error` string.
pub fn error_message(body: &Value) -> Option<String> {
    non_empty_str(body.pointer("/error/message"))
        .or_else(|| non_empty_str(body.get("error")))
        .or_else(|| non_empty_str(body.get("message")))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_field_wins_over_choices() {
        let body = json!({
            "reply": "direct",
            "choices": [{ "message": { "content": "from choices" } }]
        });
        let reply = extract_reply(&body);
        assert_eq!(reply.text, "direct");
        assert_eq!(reply.source, ReplySource::Reply);
    }

    #[test]
    fn test_choices_content() {
        let body = json!({ "choices": [{ "message": { "content": "Essa ideia é hilária" } }] });
        let reply = extract_reply(&body);
        assert_eq!(reply.text, "Essa ideia é hilária");
        assert_eq!(reply.source, ReplySource::Choices);
    }

    #[test]
    fn test_output_content_text() {
        let body = json!({
            "output": [{ "content": [{ "type": "output_text", "text": "resposta" }] }]
        });
        let reply = extract_reply(&body);
        assert_eq!(reply.text, "resposta");
        assert_eq!(reply.source, ReplySource::Output);
    }

    #[test]
    fn test_unknown_shape_surfaces_raw_body() {
        let body = json!({ "id": "cmpl-1", "choices": [] });
        let reply = extract_reply(&body);
        assert_eq!(reply.source, ReplySource::Raw);
        assert_eq!(reply.text, body.to_string());
    }

    #[test]
    fn test_empty_reply_falls_through() {
        let body = json!({ "reply": "", "choices": [{ "message": { "content": "fallback" } }] });
        assert_eq!(extract_reply(&body).source, ReplySource::Choices);
    }

    #[test]
    fn test_error_message_shapes() {
        let provider = json!({ "error": { "message": "Incorrect API key", "type": "invalid_request_error" } });
        assert_eq!(error_message(&provider).as_deref(), Some("Incorrect API key"));

        let proxy = json!({ "error": "method not allowed" });
        assert_eq!(error_message(&proxy).as_deref(), Some("method not allowed"));

        assert_eq!(error_message(&json!({ "detail": 1 })), None);
    }
}
