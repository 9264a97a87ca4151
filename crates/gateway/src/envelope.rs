use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer, ser::SerializeStruct};

/// Uniform result wrapper returned by the non-streaming endpoints.
///
/// Serializes as `{"ok":true,"data":…}` or `{"ok":false,"message":…}`; the
/// field that does not belong to the variant is never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    /// The call succeeded with a payload.
    Success(T),
    /// The call was rejected with a human-readable reason.
    Fail(String),
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self::Success(data)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Fail(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Fail(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Fail(message) => Err(message),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("Envelope", 2)?;

        match self {
            Self::Success(data) => {
                envelope.serialize_field("ok", &true)?;
                envelope.serialize_field("data", data)?;
            }
            Self::Fail(message) => {
                envelope.serialize_field("ok", &false)?;
                envelope.serialize_field("message", message)?;
            }
        }

        envelope.end()
    }
}

/// Envelopes are always sent with `200 OK`; the `ok` flag carries the outcome.
impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
