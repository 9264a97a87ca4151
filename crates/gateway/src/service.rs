use std::sync::Arc;

use config::GatewayConfig;
use futures::{StreamExt, stream};
use llm::{ChatMessage, ImageFormat, ImageRequest, ImageSize, LlmError, ModelClient};
use thiserror::Error;

use crate::{
    envelope::Envelope,
    journal::{Journal, LogJournal},
    request::RequestContext,
    stream::{ObservedStream, ReplyStream},
};

const BLANK_MESSAGE: &str = "message can not be blank";
const EMPTY_MESSAGES: &str = "messages can not be empty";
const BLANK_PROMPT: &str = "prompt can not be blank";
const ZERO_IMAGES: &str = "n must be at least 1";

/// Why the built-in streaming conversation produced no fragments.
#[derive(Debug, Error)]
pub enum BuiltinStreamError {
    #[error("built-in prompt is blank")]
    BlankPrompt,
    #[error("failed to open the reply stream: {0}")]
    Upstream(#[from] LlmError),
}

/// The request gateway: validates caller input, forwards it to the model
/// client and reports every exchange to the journal.
///
/// Validation failures become [`Envelope::Fail`] and never reach the client.
/// Client failures are returned as errors for the HTTP boundary to render,
/// except in [`Gateway::builtin_stream`], which degrades to an empty stream.
pub struct Gateway {
    client: Arc<dyn ModelClient>,
    journal: Arc<dyn Journal>,
    builtin_prompt: String,
    image_size: ImageSize,
    image_format: ImageFormat,
}

impl Gateway {
    pub fn new(client: Arc<dyn ModelClient>, config: &GatewayConfig) -> Self {
        Self {
            client,
            journal: Arc::new(LogJournal),
            builtin_prompt: config.builtin_prompt.clone(),
            image_size: config.image.size.into(),
            image_format: config.image.format.into(),
        }
    }

    /// Replace the journal every exchange is reported to.
    pub fn with_journal(mut self, journal: Arc<dyn Journal>) -> Self {
        self.journal = journal;
        self
    }

    /// Single-turn chat with a free-text message.
    pub async fn send(&self, context: &RequestContext, message: &str) -> llm::Result<Envelope<String>> {
        self.journal.request(context, "send a message", message);

        if is_blank(message) {
            return Ok(Envelope::fail(BLANK_MESSAGE));
        }

        let reply = self.client.send_message(message).await?;
        self.journal.reply(context, "get a reply", &reply);

        Ok(Envelope::success(reply))
    }

    /// Multi-turn chat, answered with one aggregated reply.
    pub async fn multi_send(&self, context: &RequestContext, messages: &[ChatMessage]) -> llm::Result<Envelope<String>> {
        self.journal.request(context, "send messages", &format!("{messages:?}"));

        if messages.is_empty() {
            return Ok(Envelope::fail(EMPTY_MESSAGES));
        }

        let reply = self.client.multi_chat(messages).await?;
        self.journal.reply(context, "get a reply", &reply);

        Ok(Envelope::success(reply))
    }

    /// Multi-turn chat answered incrementally.
    ///
    /// An empty conversation is rejected like in [`Gateway::multi_send`]. A
    /// failure to open the stream is returned as an error; failures after
    /// that end the stream and are only visible in the journal.
    pub async fn multi_send_stream(
        &self,
        context: &RequestContext,
        messages: &[ChatMessage],
    ) -> llm::Result<Envelope<ReplyStream>> {
        self.journal.request(context, "send messages", &format!("{messages:?}"));

        if messages.is_empty() {
            return Ok(Envelope::fail(EMPTY_MESSAGES));
        }

        let fragments = self.client.chat_stream(messages).await?;

        Ok(Envelope::success(self.observe(fragments, context)))
    }

    /// Streams the reply to the fixed one-message conversation built from the
    /// configured prompt. Never fails: any error is journaled and the caller
    /// gets an already completed empty stream.
    pub async fn builtin_stream(&self, context: &RequestContext) -> ReplyStream {
        self.journal.request(context, "send messages", &self.builtin_prompt);

        match self.open_builtin_stream(context).await {
            Ok(stream) => stream,
            Err(error) => {
                self.journal.failed(context, &error);
                stream::empty::<String>().boxed()
            }
        }
    }

    async fn open_builtin_stream(&self, context: &RequestContext) -> Result<ReplyStream, BuiltinStreamError> {
        if is_blank(&self.builtin_prompt) {
            return Err(BuiltinStreamError::BlankPrompt);
        }

        let conversation = [ChatMessage::user(self.builtin_prompt.as_str())];
        let fragments = self.client.chat_stream(&conversation).await?;

        Ok(self.observe(fragments, context))
    }

    /// One image for a prompt, using the configured size and format.
    pub async fn image(&self, context: &RequestContext, prompt: &str) -> llm::Result<Envelope<String>> {
        self.journal.request(context, "image generation prompt", prompt);

        if is_blank(prompt) {
            return Ok(Envelope::fail(BLANK_PROMPT));
        }

        let request = ImageRequest {
            prompt: prompt.to_string(),
            count: 1,
            size: self.image_size,
            format: self.image_format,
        };

        let image = self.client.generate_image(&request).await?;
        self.journal.reply(context, "image is generated", &describe_images(&[&image], request.format));

        Ok(Envelope::success(image))
    }

    /// Several images with caller-chosen size and format.
    pub async fn images(&self, context: &RequestContext, request: ImageRequest) -> llm::Result<Envelope<Vec<String>>> {
        self.journal.request(context, "image generation prompt", &request.prompt);

        if is_blank(&request.prompt) {
            return Ok(Envelope::fail(BLANK_PROMPT));
        }

        if request.count == 0 {
            return Ok(Envelope::fail(ZERO_IMAGES));
        }

        let images = self.client.generate_images(&request).await?;
        self.journal.reply(context, "image is generated", &describe_images(&images, request.format));

        Ok(Envelope::success(images))
    }

    fn observe(&self, fragments: llm::FragmentStream, context: &RequestContext) -> ReplyStream {
        ObservedStream::new(fragments, self.journal.clone(), context.clone()).boxed()
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Base64 payloads are summarized, URLs are logged as they are.
fn describe_images<S: AsRef<str>>(images: &[S], format: ImageFormat) -> String {
    match format {
        ImageFormat::Url => format!("{:?}", images.iter().map(|image| image.as_ref()).collect::<Vec<&str>>()),
        ImageFormat::Base64 => {
            let sizes = images.iter().map(|image| image.as_ref().len()).collect::<Vec<_>>();
            format!("{} base64 image(s) of {sizes:?} bytes", images.len())
        }
    }
}
