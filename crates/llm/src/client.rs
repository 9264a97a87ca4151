use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::{
    error::LlmError,
    image::ImageRequest,
    messages::{ChatMessage, Role},
};

/// Type alias for a stream of text fragments.
///
/// The stream is lazy, finite and cannot be restarted. An `Err` item means the
/// provider stream broke; nothing after it is meaningful.
pub type FragmentStream = Pin<Box<dyn Stream<Item = crate::Result<String>> + Send>>;

/// Operations of the upstream language model the gateway forwards to.
///
/// Note for async_trait: the gateway holds the client as `Arc<dyn ModelClient>`,
/// so the trait must stay dyn-compatible.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Single-turn completion of a free-text message.
    async fn send_message(&self, message: &str) -> crate::Result<String> {
        self.multi_chat(&[ChatMessage {
            role: Role::User,
            content: message.to_string(),
        }])
        .await
    }

    /// Multi-turn completion. The messages are forwarded in the given order
    /// and the reply is returned as one string.
    async fn multi_chat(&self, messages: &[ChatMessage]) -> crate::Result<String>;

    /// Multi-turn completion delivered incrementally.
    ///
    /// Errors returned here happen before any fragment is produced; failures
    /// after the stream opened are `Err` items of the stream.
    async fn chat_stream(&self, messages: &[ChatMessage]) -> crate::Result<FragmentStream>;

    /// Generate images, returning one reference (URL or base64 data) per image in provider order.
    async fn generate_images(&self, request: &ImageRequest) -> crate::Result<Vec<String>>;

    /// Generate a single image and return its reference.
    async fn generate_image(&self, request: &ImageRequest) -> crate::Result<String> {
        let images = self.generate_images(request).await?;

        images.into_iter().next().ok_or_else(|| {
            log::error!("Provider returned no image for a single image request");
            LlmError::InternalError(Some("Provider returned no image".to_string()))
        })
    }
}
