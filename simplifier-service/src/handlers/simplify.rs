use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::{metrics, SimplifyError};
use crate::startup::AppState;

pub const NO_TEXT_MESSAGE: &str = "No text provided.";
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "AI Service Unavailable (Check API Key).";

#[derive(Debug, Default, Deserialize)]
pub struct SimplifyRequest {
    #[serde(default)]
    pub text: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimplifyResponse {
    pub simplified: String,
}

/// What the caller put in `text`.
enum RequestText {
    Text(String),
    Unsupported(&'static str),
}

impl SimplifyRequest {
    /// Falsy JSON values (`null`, `false`, `0`, `""`, `[]`, `{}`) count as no
    /// text; any other non-string value cannot be sliced into a prompt.
    fn into_text(self) -> RequestText {
        match self.text {
            None | Some(Value::Null) | Some(Value::Bool(false)) => RequestText::Text(String::new()),
            Some(Value::String(s)) => RequestText::Text(s),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => RequestText::Text(String::new()),
            Some(Value::Array(a)) if a.is_empty() => RequestText::Text(String::new()),
            Some(Value::Object(o)) if o.is_empty() => RequestText::Text(String::new()),
            Some(Value::Bool(true)) => RequestText::Unsupported("boolean"),
            Some(Value::Number(_)) => RequestText::Unsupported("number"),
            Some(Value::Array(_)) => RequestText::Unsupported("array"),
            Some(Value::Object(_)) => RequestText::Unsupported("object"),
        }
    }
}

/// `POST /simplify`
///
/// Always answers 200 with a `simplified` string. Unreadable bodies count
/// as "no text"; a non-string `text` and every provider failure collapse
/// into one fixed notice and are only detailed in logs.
#[tracing::instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn simplify(State(state): State<AppState>, body: Bytes) -> Json<SimplifyResponse> {
    let request = serde_json::from_slice::<SimplifyRequest>(&body).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Unreadable simplify request body, treating as empty");
        SimplifyRequest::default()
    });

    let text = match request.into_text() {
        RequestText::Text(text) => text,
        RequestText::Unsupported(kind) => {
            metrics::record_simplify_request("invalid_input");
            tracing::error!(kind, "Simplify text is not a string");
            return Json(SimplifyResponse {
                simplified: SERVICE_UNAVAILABLE_MESSAGE.to_string(),
            });
        }
    };

    let simplified = match state.simplifier.simplify(&text).await {
        Ok(simplified) => {
            metrics::record_simplify_request("success");
            simplified
        }
        Err(SimplifyError::EmptyInput) => {
            metrics::record_simplify_request("empty_input");
            NO_TEXT_MESSAGE.to_string()
        }
        Err(SimplifyError::Provider(e)) => {
            metrics::record_simplify_request("provider_error");
            tracing::error!(error = %e, kind = e.kind(), "AI provider call failed");
            SERVICE_UNAVAILABLE_MESSAGE.to_string()
        }
    };

    Json(SimplifyResponse { simplified })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_of(body: Value) -> RequestText {
        serde_json::from_value::<SimplifyRequest>(body)
            .unwrap()
            .into_text()
    }

    #[test]
    fn falsy_values_mean_no_text() {
        for body in [
            json!({}),
            json!({"text": null}),
            json!({"text": false}),
            json!({"text": 0}),
            json!({"text": ""}),
            json!({"text": []}),
            json!({"text": {}}),
        ] {
            assert!(
                matches!(text_of(body.clone()), RequestText::Text(ref t) if t.is_empty()),
                "body: {body}"
            );
        }
    }

    #[test]
    fn non_string_values_are_unsupported() {
        assert!(matches!(text_of(json!({"text": 42})), RequestText::Unsupported("number")));
        assert!(matches!(text_of(json!({"text": true})), RequestText::Unsupported("boolean")));
        assert!(matches!(text_of(json!({"text": [1]})), RequestText::Unsupported("array")));
    }
}
