//! Request/response logging for the gateway.
//!
//! The gateway never logs directly; it reports to a [`Journal`] it was given
//! at construction. The process-wide implementation is [`LogJournal`], which
//! writes through the `log` facade.

use std::error::Error;

use crate::request::RequestContext;

/// Receives the observable events of gateway calls.
///
/// Implementations are called inline from request handling and from stream
/// polling, so they must not block.
pub trait Journal: Send + Sync {
    /// A caller asked for something. `action` names the operation, `payload` is what they sent.
    fn request(&self, context: &RequestContext, action: &str, payload: &str);

    /// A complete reply is about to be returned.
    fn reply(&self, context: &RequestContext, action: &str, payload: &str);

    /// A streaming reply delivered one fragment.
    fn fragment(&self, context: &RequestContext, fragment: &str);

    /// A streaming reply ended normally.
    fn completed(&self, context: &RequestContext);

    /// A streaming reply ended with an error, or could not be started.
    fn failed(&self, context: &RequestContext, error: &dyn Error);

    /// The caller went away before a streaming reply ended.
    fn cancelled(&self, context: &RequestContext);
}

/// Journal writing one log line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogJournal;

impl Journal for LogJournal {
    fn request(&self, context: &RequestContext, action: &str, payload: &str) {
        log::info!(
            "requestId {}, ip {}, {action} : {payload}",
            context.request_id,
            context.remote
        );
    }

    fn reply(&self, context: &RequestContext, action: &str, payload: &str) {
        log::info!(
            "requestId {}, ip {}, {action} : {payload}",
            context.request_id,
            context.remote
        );
    }

    fn fragment(&self, context: &RequestContext, fragment: &str) {
        log::info!(
            "requestId {}, ip {}, get a reply : {fragment}",
            context.request_id,
            context.remote
        );
    }

    fn completed(&self, context: &RequestContext) {
        log::info!("requestId {}, ip {}, complete", context.request_id, context.remote);
    }

    fn failed(&self, context: &RequestContext, error: &dyn Error) {
        log::error!("requestId {}, ip {}, error : {error}", context.request_id, context.remote);
    }

    fn cancelled(&self, context: &RequestContext) {
        log::info!("requestId {}, ip {}, cancelled", context.request_id, context.remote);
    }
}
