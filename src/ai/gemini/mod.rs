pub mod chat;
pub mod client;
pub mod content;
pub mod speech;
pub mod types;

pub use chat::{GeminiChatClient, GeminiChatSession};
pub use content::GeminiContentClient;
pub use speech::GeminiSpeechClient;

/// Adds a test-only `with_base_url` to a client wrapping `http: GeminiHttpClient`.
#[cfg(test)]
macro_rules! impl_with_gemini_base_url {
    ($client:ty) => {
        impl $client {
            fn with_base_url(mut self, base_url: String) -> Self {
                self.http = self.http.with_base_url(base_url);
                self
            }
        }
    };
}

#[cfg(test)]
pub(crate) use impl_with_gemini_base_url;

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path_regex};
    use wiremock::{MockBuilder, ResponseTemplate};

    pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";

    pub fn post_path_regex(pattern: &str) -> MockBuilder {
        wiremock::Mock::given(method("POST")).and(path_regex(pattern))
    }

    pub fn text_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }]
                }
            }]
        })
    }

    pub fn text_template(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(text_response(text))
    }
}
