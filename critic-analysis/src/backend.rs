//! Vendor API plumbing: request shapes in, raw reply text out.
//!
//! The vendor is inferred from the API key (`sk-ant-` keys are Anthropic,
//! everything else OpenAI), each vendor gets its own request envelope and
//! reply extraction, and actual I/O lives behind [`Transport`] so callers in
//! an extension, a server, or a test all share the same request builder.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::AnalysisError;

pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
const OPENAI_DEFAULT_MODEL: &str = "o4-mini";
const ANTHROPIC_MAX_TOKENS: u32 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Anthropic,
    OpenAi,
}

impl Vendor {
    /// Which vendor a key belongs to, by its prefix.
    pub fn from_api_key(api_key: &str) -> Vendor {
        if api_key.starts_with("sk-ant-") {
            Vendor::Anthropic
        } else {
            Vendor::OpenAi
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Vendor::Anthropic => ANTHROPIC_DEFAULT_MODEL,
            Vendor::OpenAi => OPENAI_DEFAULT_MODEL,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Vendor::Anthropic => "anthropic",
            Vendor::OpenAi => "openai",
        }
    }
}

/// A ready-to-send HTTP request; the caller supplies the HTTP stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Knobs that vary per call but not per vendor.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub model: Option<String>,
    /// Ask for a strict JSON object reply (translation calls).
    pub json_reply: bool,
}

/// Build the vendor-specific request for a single user prompt.
pub fn build_request(api_key: &str, prompt: &str, options: &RequestOptions) -> ApiRequest {
    let vendor = Vendor::from_api_key(api_key);
    let model = options
        .model
        .clone()
        .unwrap_or_else(|| vendor.default_model().to_string());
    debug!(vendor = vendor.name(), %model, "building request");
    match vendor {
        Vendor::Anthropic => ApiRequest {
            url: ANTHROPIC_URL,
            headers: vec![
                ("content-type", "application/json".to_string()),
                ("x-api-key", api_key.to_string()),
                ("anthropic-version", "2023-06-01".to_string()),
            ],
            body: json!({
                "model": model,
                "max_tokens": ANTHROPIC_MAX_TOKENS,
                "messages": [{"role": "user", "content": prompt}],
            }),
        },
        Vendor::OpenAi => {
            let mut body = json!({
                "model": model,
                "messages": [{"role": "user", "content": prompt}],
            });
            if options.json_reply {
                body["response_format"] = json!({"type": "json_object"});
                body["messages"] = json!([
                    {
                        "role": "system",
                        "content": "You are a translator. You MUST return a valid JSON object of translations. Do not include any other text in your response.",
                    },
                    {"role": "user", "content": prompt},
                ]);
            }
            ApiRequest {
                url: OPENAI_URL,
                headers: vec![
                    ("content-type", "application/json".to_string()),
                    ("authorization", format!("Bearer {}", api_key)),
                ],
                body,
            }
        }
    }
}

/// Pull the reply text out of a vendor response envelope.
pub fn extract_reply(vendor: Vendor, response: &Value) -> Result<String, AnalysisError> {
    let path: &[&str] = match vendor {
        Vendor::Anthropic => &["content", "0", "text"],
        Vendor::OpenAi => &["choices", "0", "message", "content"],
    };
    let mut cursor = response;
    for &field in path {
        cursor = match field.parse::<usize>() {
            Ok(index) => cursor.get(index),
            Err(_) => cursor.get(field),
        }
        .ok_or(AnalysisError::UnexpectedEnvelope {
            vendor: vendor.name(),
            field,
        })?;
    }
    cursor
        .as_str()
        .map(str::to_string)
        .ok_or(AnalysisError::UnexpectedEnvelope {
            vendor: vendor.name(),
            field: "text content",
        })
}

/// The I/O seam: send a built request, return the vendor's JSON reply.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<Value, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_follows_key_prefix() {
        assert_eq!(Vendor::from_api_key("sk-ant-abc123"), Vendor::Anthropic);
        assert_eq!(Vendor::from_api_key("sk-proj-abc123"), Vendor::OpenAi);
    }

    #[test]
    fn anthropic_request_carries_key_and_version_headers() {
        let req = build_request("sk-ant-key", "hello", &RequestOptions::default());
        assert_eq!(req.url, ANTHROPIC_URL);
        assert!(req
            .headers
            .contains(&("x-api-key", "sk-ant-key".to_string())));
        assert!(req
            .headers
            .contains(&("anthropic-version", "2023-06-01".to_string())));
        assert_eq!(req.body["messages"][0]["content"], "hello");
        assert_eq!(req.body["model"], ANTHROPIC_DEFAULT_MODEL);
    }

    #[test]
    fn openai_translation_request_forces_json_mode() {
        let options = RequestOptions {
            model: None,
            json_reply: true,
        };
        let req = build_request("sk-proj-key", "translate this", &options);
        assert_eq!(req.url, OPENAI_URL);
        assert_eq!(req.body["response_format"]["type"], "json_object");
        assert_eq!(req.body["messages"][0]["role"], "system");
        assert!(req
            .headers
            .contains(&("authorization", "Bearer sk-proj-key".to_string())));
    }

    #[test]
    fn reply_extraction_matches_each_envelope() {
        let anthropic = json!({"content": [{"type": "text", "text": "the reply"}]});
        assert_eq!(
            extract_reply(Vendor::Anthropic, &anthropic).unwrap(),
            "the reply"
        );

        let openai = json!({"choices": [{"message": {"role": "assistant", "content": "the reply"}}]});
        assert_eq!(extract_reply(Vendor::OpenAi, &openai).unwrap(), "the reply");

        assert!(matches!(
            extract_reply(Vendor::Anthropic, &openai),
            Err(AnalysisError::UnexpectedEnvelope { .. })
        ));
    }
}
