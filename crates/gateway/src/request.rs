use std::{convert::Infallible, fmt, net::SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use http::request::Parts;
use uuid::Uuid;

const UNKNOWN_REMOTE: &str = "unknown";

/// Opaque per-call token used only to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who is calling, attached to every journal entry of one inbound call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    /// Remote IP address of the caller.
    pub remote: String,
}

impl RequestContext {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            remote: remote.into(),
        }
    }
}

/// Generates a fresh correlation id for every request. The remote address
/// comes from the connection info, which is only present when the router is
/// served with `into_make_service_with_connect_info`.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(address)| address.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_REMOTE.to_string());

        Ok(Self::new(remote))
    }
}
