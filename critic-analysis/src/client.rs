//! One type gluing prompts, vendor plumbing, and a transport together.

use std::collections::HashMap;

use content_critic::Category;

use crate::backend::{build_request, extract_reply, RequestOptions, Transport, Vendor};
use crate::error::AnalysisError;
use crate::prompt::{
    CriticPrompt, Critique, PromptOptions, SuggestionPrompt, TranslationPrompt,
};

pub struct AnalysisClient<T: Transport> {
    api_key: String,
    options: PromptOptions,
    transport: T,
}

impl<T: Transport> AnalysisClient<T> {
    pub fn new(api_key: impl Into<String>, options: PromptOptions, transport: T) -> Self {
        Self {
            api_key: api_key.into(),
            options,
            transport,
        }
    }

    pub fn vendor(&self) -> Vendor {
        Vendor::from_api_key(&self.api_key)
    }

    fn call(&self, prompt: &str, request: &RequestOptions) -> Result<String, AnalysisError> {
        let req = build_request(&self.api_key, prompt, request);
        let reply = self.transport.send(&req)?;
        extract_reply(self.vendor(), &reply)
    }

    /// Run the critique task over `content`.
    pub fn critique(&self, content: &str) -> Result<Critique, AnalysisError> {
        let prompt = CriticPrompt::new(self.options.clone());
        let raw = self.call(&prompt.render(content), &RequestOptions::default())?;
        prompt.parse(&raw)
    }

    /// Translate keyed texts (as produced by a translation session).
    pub fn translate<'a>(
        &self,
        entries: impl IntoIterator<Item = (String, &'a str)>,
    ) -> Result<HashMap<String, String>, AnalysisError> {
        let prompt = TranslationPrompt::new(self.options.clone());
        let request = RequestOptions {
            model: None,
            json_reply: true,
        };
        let raw = self.call(&prompt.render(entries), &request)?;
        prompt.parse(&raw)
    }

    /// Ask for a rewrite of one highlighted passage.
    pub fn suggest(
        &self,
        category: Category,
        text: &str,
        explanation: &str,
        context_before: &str,
        context_after: &str,
    ) -> Result<String, AnalysisError> {
        let prompt = SuggestionPrompt::new(self.options.clone());
        let raw = self.call(
            &prompt.render(category, text, explanation, context_before, context_after),
            &RequestOptions::default(),
        )?;
        Ok(prompt.parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ApiRequest;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    /// Canned-reply transport that records what was sent.
    struct Canned {
        reply: Value,
        sent: RefCell<Vec<ApiRequest>>,
    }

    impl Canned {
        fn anthropic(text: &str) -> Self {
            Self {
                reply: json!({"content": [{"type": "text", "text": text}]}),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn send(&self, request: &ApiRequest) -> Result<Value, AnalysisError> {
            self.sent.borrow_mut().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn critique_round_trip_through_the_transport() {
        let reply = r####"{
  "analysis": {"summary": "| premise | shaky |", "critique": "## Notes"},
  "highlights": [
    {"text": "obviously correct", "type": "assumption", "explanation": "asserted, not shown"}
  ]
}"####;
        let transport = Canned::anthropic(reply);
        let client = AnalysisClient::new("sk-ant-test", PromptOptions::default(), transport);
        let critique = client.critique("Some page text. obviously correct.").unwrap();
        assert_eq!(critique.highlights.len(), 1);
        assert_eq!(critique.highlights[0].category, Category::Assumption);

        let sent = client.transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("Some page text"));
    }

    #[test]
    fn translate_requests_json_mode_for_openai_keys() {
        let transport = Canned {
            reply: json!({"choices": [{"message": {"content": "{\"t0\": \"Bonjour\"}"}}]}),
            sent: RefCell::new(Vec::new()),
        };
        let client = AnalysisClient::new("sk-proj-test", PromptOptions::default(), transport);
        let out = client
            .translate(vec![("t0".to_string(), "Hello")])
            .unwrap();
        assert_eq!(out["t0"], "Bonjour");
        let sent = client.transport.sent.borrow();
        assert_eq!(sent[0].body["response_format"]["type"], "json_object");
    }
}
