use serde::Deserialize;

use crate::image::ImageFormat;

/// Response from the `/chat/completions` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct OpenAIResponse {
    pub(super) choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIChoice {
    pub(super) message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIMessage {
    /// Missing when the model answered with a tool call only.
    #[serde(default)]
    pub(super) content: Option<String>,
}

impl OpenAIResponse {
    /// The text of the first choice.
    pub(super) fn into_reply(self) -> Option<String> {
        let choice = self.choices.into_iter().next()?;

        Some(choice.message.content.unwrap_or_default())
    }
}

/// One `data:` event of a streaming chat completion.
#[derive(Debug, Deserialize)]
pub(super) struct OpenAIStreamChunk {
    #[serde(default)]
    pub(super) choices: Vec<OpenAIStreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIStreamChoice {
    pub(super) delta: OpenAIDelta,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIDelta {
    #[serde(default)]
    pub(super) content: Option<String>,
}

impl OpenAIStreamChunk {
    /// The text carried by this chunk, if any. Role-only and finish chunks carry none.
    pub(super) fn into_fragment(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
    }
}

/// Response from the `/images/generations` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct OpenAIImageResponse {
    pub(super) data: Vec<OpenAIImageData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIImageData {
    #[serde(default)]
    pub(super) url: Option<String>,
    #[serde(default)]
    pub(super) b64_json: Option<String>,
}

impl OpenAIImageResponse {
    /// Image references in provider order, picked by the requested format.
    ///
    /// Entries without a reference in that format are skipped with a warning.
    pub(super) fn into_references(self, format: ImageFormat) -> Vec<String> {
        self.data
            .into_iter()
            .enumerate()
            .filter_map(|(index, image)| {
                let reference = match format {
                    ImageFormat::Url => image.url,
                    ImageFormat::Base64 => image.b64_json,
                };

                if reference.is_none() {
                    log::warn!("Provider image {index} has no {} reference, skipping it", format.response_format());
                }

                reference
            })
            .collect()
    }
}
