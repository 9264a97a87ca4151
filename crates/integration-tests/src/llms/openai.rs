use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::post,
};
use futures::{StreamExt, stream};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const DEFAULT_REPLY: &str = "This is a test response from the mock LLM server";

/// Builder for an OpenAI-compatible test server.
///
/// Serves `/v1/chat/completions` (plain and streaming) and
/// `/v1/images/generations`, and records every request body it receives.
#[derive(Default)]
pub struct OpenAIMock {
    custom_responses: Vec<(String, String)>,
    fragments: Option<Vec<String>>,
    fragment_delay: Duration,
    interrupt_after: Option<usize>,
    error_type: Option<ErrorType>,
}

#[derive(Clone)]
enum ErrorType {
    AuthError(String),
    RateLimit(String),
    BadRequest(String),
    InternalError(String),
    ServiceUnavailable(String),
}

impl ErrorType {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ErrorType::AuthError(message) => (StatusCode::UNAUTHORIZED, message),
            ErrorType::RateLimit(message) => (StatusCode::TOO_MANY_REQUESTS, message),
            ErrorType::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ErrorType::InternalError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            ErrorType::ServiceUnavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        (status, message).into_response()
    }
}

impl OpenAIMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `response` whenever a message contains `trigger`.
    pub fn with_response(mut self, trigger: impl Into<String>, response: impl Into<String>) -> Self {
        self.custom_responses.push((trigger.into(), response.into()));
        self
    }

    /// Stream exactly these fragments instead of splitting the reply into words.
    pub fn with_fragments<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fragments = Some(fragments.into_iter().map(Into::into).collect());
        self
    }

    /// Wait this long before sending each streamed fragment.
    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = delay;
        self
    }

    /// Abort the streaming connection after this many fragments.
    pub fn with_stream_interrupted_after(mut self, fragments: usize) -> Self {
        self.interrupt_after = Some(fragments);
        self
    }

    pub fn with_auth_error(mut self, message: impl Into<String>) -> Self {
        self.error_type = Some(ErrorType::AuthError(message.into()));
        self
    }

    pub fn with_rate_limit(mut self, message: impl Into<String>) -> Self {
        self.error_type = Some(ErrorType::RateLimit(message.into()));
        self
    }

    pub fn with_bad_request(mut self, message: impl Into<String>) -> Self {
        self.error_type = Some(ErrorType::BadRequest(message.into()));
        self
    }

    pub fn with_internal_error(mut self, message: impl Into<String>) -> Self {
        self.error_type = Some(ErrorType::InternalError(message.into()));
        self
    }

    pub fn with_service_unavailable(mut self, message: impl Into<String>) -> Self {
        self.error_type = Some(ErrorType::ServiceUnavailable(message.into()));
        self
    }

    /// Start serving on an ephemeral port.
    pub async fn spawn(self) -> anyhow::Result<OpenAIServer> {
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = Arc::new(MockState {
            custom_responses: self.custom_responses,
            fragments: self.fragments,
            fragment_delay: self.fragment_delay,
            interrupt_after: self.interrupt_after,
            error_type: self.error_type,
            requests: requests.clone(),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .route("/v1/images/generations", post(image_generations))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(OpenAIServer { address, requests })
    }
}

/// A running mock provider.
#[derive(Clone)]
pub struct OpenAIServer {
    pub address: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A request body as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: &'static str,
    pub authorization: Option<String>,
    pub body: Value,
}

impl OpenAIServer {
    /// The value for `llm.base_url`.
    pub fn url(&self) -> String {
        format!("http://{}/v1", self.address)
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.bodies("chat/completions")
    }

    pub fn image_requests(&self) -> Vec<Value> {
        self.bodies("images/generations")
    }

    fn bodies(&self, endpoint: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|request| request.endpoint == endpoint)
            .map(|request| request.body)
            .collect()
    }
}

struct MockState {
    custom_responses: Vec<(String, String)>,
    fragments: Option<Vec<String>>,
    fragment_delay: Duration,
    interrupt_after: Option<usize>,
    error_type: Option<ErrorType>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockState {
    fn record(&self, endpoint: &'static str, headers: &axum::http::HeaderMap, body: &Value) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        self.requests.lock().unwrap().push(RecordedRequest {
            endpoint,
            authorization,
            body: body.clone(),
        });
    }

    fn reply_for(&self, messages: &[ChatMessage]) -> String {
        for message in messages {
            for (trigger, response) in &self.custom_responses {
                if message.content.contains(trigger) {
                    return response.clone();
                }
            }
        }

        DEFAULT_REPLY.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(default)]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationRequest {
    n: u32,
    #[serde(default)]
    response_format: Option<String>,
}

async fn chat_completions(
    State(state): State<Arc<MockState>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("chat/completions", &headers, &body);

    if let Some(error) = state.error_type.clone() {
        return error.into_response();
    }

    let request: ChatCompletionRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let reply = state.reply_for(&request.messages);

    if !request.stream {
        return Json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1677651200,
            "model": request.model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": reply},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 15, "total_tokens": 25}
        }))
        .into_response();
    }

    let fragments = state
        .fragments
        .clone()
        .unwrap_or_else(|| reply.split_inclusive(' ').map(str::to_string).collect());

    streaming_response(&request.model, fragments, state.fragment_delay, state.interrupt_after)
}

fn chunk(model: &str, delta: Value, finish_reason: Option<&str>) -> String {
    let chunk = json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "created": 1677651200,
        "model": model,
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
    });

    format!("data: {chunk}\n\n")
}

fn streaming_response(
    model: &str,
    fragments: Vec<String>,
    fragment_delay: Duration,
    interrupt_after: Option<usize>,
) -> Response {
    let mut events: Vec<(Duration, Result<String, std::io::Error>)> =
        vec![(Duration::ZERO, Ok(chunk(model, json!({"role": "assistant"}), None)))];

    let mut interrupted = false;

    for (index, fragment) in fragments.into_iter().enumerate() {
        if interrupt_after == Some(index) {
            // The pause lets the fragments before an interruption reach the socket.
            let error = std::io::Error::other("connection reset by mock");
            events.push((Duration::from_millis(50), Err(error)));
            interrupted = true;
            break;
        }

        events.push((fragment_delay, Ok(chunk(model, json!({"content": fragment}), None))));
    }

    if !interrupted {
        events.push((Duration::ZERO, Ok(chunk(model, json!({}), Some("stop")))));
        events.push((Duration::ZERO, Ok("data: [DONE]\n\n".to_string())));
    }

    let events = stream::iter(events).then(|(delay, event)| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        event
    });

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(events))
        .unwrap()
}

async fn image_generations(
    State(state): State<Arc<MockState>>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Response> {
    state.record("images/generations", &headers, &body);

    if let Some(error) = state.error_type.clone() {
        return Err(error.into_response());
    }

    let request: ImageGenerationRequest =
        serde_json::from_value(body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()).into_response())?;

    let base64 = request.response_format.as_deref() == Some("b64_json");

    let data = (0..request.n)
        .map(|i| {
            if base64 {
                json!({"b64_json": format!("aW1hZ2Ut{i}")})
            } else {
                json!({"url": format!("https://images.test/{i}.png")})
            }
        })
        .collect::<Vec<_>>();

    Ok(Json(json!({"created": 1677651200, "data": data})))
}
