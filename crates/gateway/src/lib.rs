//! The HTTP surface of the chat gateway.
//!
//! Every operation answers with an [`Envelope`], logs its request and reply
//! through a [`Journal`] under a per-call correlation id, and forwards to a
//! [`llm::ModelClient`]. Streaming operations are served as server-sent events.

mod envelope;
mod handler;
mod journal;
mod params;
mod request;
mod service;
mod stream;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use config::Config;
use llm::OpenAIClient;

pub use envelope::Envelope;
pub use journal::{Journal, LogJournal};
pub use request::{RequestContext, RequestId};
pub use service::{BuiltinStreamError, Gateway};
pub use stream::{ObservedStream, ReplyStream};

/// Builds the gateway routes, mounted under `path`.
pub fn routes(gateway: Arc<Gateway>, path: &str) -> Router {
    let routes = Router::new()
        .route("/send", get(handler::send))
        .route("/multi/send", post(handler::multi_send))
        .route("/multi/send2", post(handler::multi_send_stream))
        .route("/multi/send3", get(handler::builtin_stream))
        .route("/image", get(handler::image))
        .route("/images", get(handler::images))
        .with_state(gateway);

    let path = path.trim_end_matches('/');

    if path.is_empty() {
        routes
    } else {
        Router::new().nest(path, routes)
    }
}

/// Creates the OpenAI-compatible client from the configuration and returns
/// the gateway routes bound to it.
pub fn router(config: &Config) -> anyhow::Result<Router> {
    let client = OpenAIClient::new(&config.llm).context("Failed to create the model client")?;
    let gateway = Gateway::new(Arc::new(client), &config.gateway);

    log::debug!("Gateway routes mounted under '{}'", config.gateway.path);

    Ok(routes(Arc::new(gateway), &config.gateway.path))
}
