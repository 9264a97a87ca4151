use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    Json,
    extract::{Query, State},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::{Stream, StreamExt};
use llm::ChatMessage;

use crate::{
    Gateway,
    envelope::Envelope,
    params::{ImageQuery, ImagesQuery, SendQuery},
    request::RequestContext,
    stream::ReplyStream,
};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// `GET /send`
pub(crate) async fn send(
    State(gateway): State<Arc<Gateway>>,
    context: RequestContext,
    Query(query): Query<SendQuery>,
) -> llm::Result<Envelope<String>> {
    gateway.send(&context, &query.message).await
}

/// `POST /multi/send`
pub(crate) async fn multi_send(
    State(gateway): State<Arc<Gateway>>,
    context: RequestContext,
    Json(messages): Json<Vec<ChatMessage>>,
) -> llm::Result<Envelope<String>> {
    gateway.multi_send(&context, &messages).await
}

/// `POST /multi/send2`
///
/// Replies with server-sent events, one `data` event per fragment. A rejected
/// conversation is answered with a failed envelope instead.
pub(crate) async fn multi_send_stream(
    State(gateway): State<Arc<Gateway>>,
    context: RequestContext,
    Json(messages): Json<Vec<ChatMessage>>,
) -> llm::Result<Response> {
    let envelope = gateway.multi_send_stream(&context, &messages).await?;

    let response = match envelope.into_result() {
        Ok(stream) => into_sse(stream).into_response(),
        Err(message) => Envelope::<()>::fail(message).into_response(),
    };

    Ok(response)
}

/// `GET /multi/send3`
pub(crate) async fn builtin_stream(State(gateway): State<Arc<Gateway>>, context: RequestContext) -> Response {
    into_sse(gateway.builtin_stream(&context).await).into_response()
}

/// `GET /image`
pub(crate) async fn image(
    State(gateway): State<Arc<Gateway>>,
    context: RequestContext,
    Query(query): Query<ImageQuery>,
) -> llm::Result<Envelope<String>> {
    gateway.image(&context, &query.prompt).await
}

/// `GET /images`
pub(crate) async fn images(
    State(gateway): State<Arc<Gateway>>,
    context: RequestContext,
    Query(query): Query<ImagesQuery>,
) -> llm::Result<Envelope<Vec<String>>> {
    gateway.images(&context, query.into_request()).await
}

/// Fragments go out untouched, except that carriage returns, which SSE
/// cannot carry, become line feeds.
fn into_sse(stream: ReplyStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = stream.map(|fragment| {
        let event = if fragment.contains('\r') {
            Event::default().data(fragment.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Event::default().data(fragment)
        };

        Ok::<_, Infallible>(event)
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
