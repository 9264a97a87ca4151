use llm::{ImageFormat, ImageRequest, ImageSize};
use serde::Deserialize;

/// Query of `GET /send`.
#[derive(Debug, Deserialize)]
pub(crate) struct SendQuery {
    pub(crate) message: String,
}

/// Query of `GET /image`.
#[derive(Debug, Deserialize)]
pub(crate) struct ImageQuery {
    pub(crate) prompt: String,
}

/// Query of `GET /images`.
#[derive(Debug, Deserialize)]
pub(crate) struct ImagesQuery {
    pub(crate) prompt: String,
    /// Number of images, defaults to one.
    pub(crate) n: Option<u32>,
    /// Integer size code, or a size name.
    pub(crate) size: Option<String>,
    pub(crate) format: Option<String>,
}

impl ImagesQuery {
    pub(crate) fn into_request(self) -> ImageRequest {
        ImageRequest {
            count: self.n.unwrap_or(1),
            size: resolve_size(self.size.as_deref()),
            format: ImageFormat::from_name(self.format.as_deref()),
            prompt: self.prompt,
        }
    }
}

/// Integer codes keep their legacy meaning. The names `small`, `medium` and
/// `large` are accepted as well; anything else, or no value, is large.
fn resolve_size(raw: Option<&str>) -> ImageSize {
    let Some(raw) = raw.map(str::trim) else {
        return ImageSize::Large;
    };

    if let Ok(code) = raw.parse::<i64>() {
        return ImageSize::from_code(code);
    }

    match raw.to_ascii_lowercase().as_str() {
        "small" => ImageSize::Small,
        "medium" => ImageSize::Medium,
        _ => ImageSize::Large,
    }
}
