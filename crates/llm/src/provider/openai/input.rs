use serde::Serialize;

use crate::messages::ChatMessage;

/// Request body for the `/chat/completions` endpoint.
///
/// Only the fields the gateway sets are modelled; sampling parameters are
/// left to the provider defaults.
#[derive(Debug, Serialize)]
pub(super) struct OpenAIChatRequest<'a> {
    /// ID of the model to use.
    pub(super) model: &'a str,

    /// The conversation so far, oldest message first.
    pub(super) messages: &'a [ChatMessage],

    /// If set, partial message deltas are sent as data-only server-sent events,
    /// terminated by a `data: [DONE]` message.
    pub(super) stream: bool,
}

/// Request body for the `/images/generations` endpoint.
#[derive(Debug, Serialize)]
pub(super) struct OpenAIImageRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) model: Option<&'a str>,

    pub(super) prompt: &'a str,

    /// Number of images to generate.
    pub(super) n: u32,

    /// One of `256x256`, `512x512` or `1024x1024`.
    pub(super) size: &'static str,

    /// Either `url` or `b64_json`.
    pub(super) response_format: &'static str,
}
