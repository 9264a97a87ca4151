//! Client side of the upstream language model: the [`ModelClient`] trait the
//! gateway forwards to, and its OpenAI-compatible HTTP implementation.

mod client;
mod error;
mod image;
mod messages;
mod provider;

pub use client::{FragmentStream, ModelClient};
pub use error::LlmError;
pub use image::{ImageFormat, ImageRequest, ImageSize};
pub use messages::{ChatMessage, Role};
pub use provider::openai::OpenAIClient;

pub type Result<T> = std::result::Result<T, LlmError>;
