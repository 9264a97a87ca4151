//! Gateway endpoint configuration.

use std::borrow::Cow;

use serde::Deserialize;

/// Settings of the HTTP endpoints exposed to callers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// The path under which the gateway routes are mounted.
    pub path: Cow<'static, str>,

    /// Content of the single user message sent by the built-in streaming endpoint.
    pub builtin_prompt: String,

    /// Defaults for the single image endpoint.
    pub image: ImageDefaults,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            path: Cow::Borrowed("/"),
            builtin_prompt: "You are a helpful assistant.".to_string(),
            image: ImageDefaults::default(),
        }
    }
}

/// Size and format used when a caller asks for one image by prompt only.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageDefaults {
    /// Image dimensions.
    pub size: ImageSizeName,
    /// How the image is returned.
    pub format: ImageFormatName,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            size: ImageSizeName::Medium,
            format: ImageFormatName::Url,
        }
    }
}

/// Named image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSizeName {
    /// 256x256
    Small,
    /// 512x512
    Medium,
    /// 1024x1024
    Large,
}

/// Named image response format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormatName {
    /// A URL pointing to the generated image.
    Url,
    /// The image bytes, base64 encoded.
    Base64,
}
