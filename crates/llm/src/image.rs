use config::{ImageFormatName, ImageSizeName};

/// Dimensions of a generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    Medium,
    Large,
}

impl ImageSize {
    /// Resolve the legacy integer size code. `1` is small, `2` is medium and
    /// every other value, including zero and negatives, is large.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Small,
            2 => Self::Medium,
            _ => Self::Large,
        }
    }

    /// The `size` value the provider expects.
    pub fn dimensions(self) -> &'static str {
        match self {
            Self::Small => "256x256",
            Self::Medium => "512x512",
            Self::Large => "1024x1024",
        }
    }
}

impl From<ImageSizeName> for ImageSize {
    fn from(name: ImageSizeName) -> Self {
        match name {
            ImageSizeName::Small => Self::Small,
            ImageSizeName::Medium => Self::Medium,
            ImageSizeName::Large => Self::Large,
        }
    }
}

/// How generated images are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Url,
    Base64,
}

impl ImageFormat {
    /// Only the exact, case-sensitive string `url` selects URLs; anything
    /// else, including a missing value, selects base64.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("url") => Self::Url,
            _ => Self::Base64,
        }
    }

    /// The `response_format` value the provider expects.
    pub fn response_format(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Base64 => "b64_json",
        }
    }
}

impl From<ImageFormatName> for ImageFormat {
    fn from(name: ImageFormatName) -> Self {
        match name {
            ImageFormatName::Url => Self::Url,
            ImageFormatName::Base64 => Self::Base64,
        }
    }
}

/// Parameters of one image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub count: u32,
    pub size: ImageSize,
    pub format: ImageFormat,
}
