//! Chat-completions request body for HTTP analyzer implementations

use serde_json::{json, Value};

use super::PageImage;
use crate::config::AnalyzerSettings;
use crate::prompt::AnalysisRequest;

/// JSON body for an OpenAI-style vision chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPayload(Value);

impl ChatPayload {
    pub fn build(settings: &AnalyzerSettings, request: &AnalysisRequest, image: &PageImage) -> Self {
        Self(json!({
            "model": settings.model,
            "max_tokens": settings.max_tokens,
            "messages": [
                {
                    "role": "system",
                    "content": request.system_prompt(),
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": request.instruction_text() },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": image.data_url(),
                                "detail": settings.detail.as_str(),
                            },
                        },
                    ],
                },
            ],
        }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Text of the first choice in a chat-completions response body.
pub fn first_choice_text(body: &Value) -> Option<&str> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}
