use std::time::Duration;

use indoc::indoc;
use integration_tests::{TestClient, TestServer, llms::OpenAIMock};
use serde_json::json;

fn conversation() -> serde_json::Value {
    json!([
        {"role": "system", "content": "Answer with a greeting."},
        {"role": "user", "content": "Say hello"}
    ])
}

#[tokio::test]
async fn fragments_arrive_in_order() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new().with_fragments(["Hel", "lo", "!"])).await;

    let server = builder.build("").await;
    let response = server.client.post("/multi/send2", &conversation()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let events = TestClient::read_events(response).await;
    assert_eq!(events, ["Hel", "lo", "!"]);

    let requests = provider.chat_requests();
    assert_eq!(requests[0]["stream"], true);
    assert_eq!(requests[0]["messages"], conversation());
}

#[tokio::test]
async fn whitespace_inside_fragments_is_kept() {
    let mut builder = TestServer::builder();
    builder
        .spawn_llm(OpenAIMock::new().with_fragments(["Hello", " wide", "  world"]))
        .await;

    let server = builder.build("").await;
    let response = server.client.post("/multi/send2", &conversation()).await;

    let events = TestClient::read_events(response).await;
    assert_eq!(events.concat(), "Hello wide  world");
}

#[tokio::test]
async fn default_reply_is_streamed_word_by_word() {
    let mut builder = TestServer::builder();
    builder
        .spawn_llm(OpenAIMock::new().with_response("hello", "Hi there friend"))
        .await;

    let server = builder.build("").await;
    let response = server.client.post("/multi/send2", &conversation()).await;

    let events = TestClient::read_events(response).await;
    assert_eq!(events, ["Hi ", "there ", "friend"]);
}

#[tokio::test]
async fn interrupted_provider_stream_ends_the_reply() {
    let mock = OpenAIMock::new()
        .with_fragments(["Hel", "lo", "!"])
        .with_stream_interrupted_after(1);

    let mut builder = TestServer::builder();
    builder.spawn_llm(mock).await;

    let server = builder.build("").await;
    let response = server.client.post("/multi/send2", &conversation()).await;

    assert_eq!(response.status(), 200);

    let events = TestClient::read_events(response).await;
    assert_eq!(events, ["Hel"]);
}

#[tokio::test]
async fn slow_stream_outlasts_the_provider_timeout() {
    let config = indoc! {r#"
        [llm]
        timeout = "1s"
    "#};

    let mock = OpenAIMock::new()
        .with_fragments(["one ", "two ", "three ", "four ", "five ", "six"])
        .with_fragment_delay(Duration::from_millis(300));

    let mut builder = TestServer::builder();
    builder.spawn_llm(mock).await;

    let server = builder.build(config).await;
    let response = server.client.post("/multi/send2", &conversation()).await;

    assert_eq!(response.status(), 200);

    let events = TestClient::read_events(response).await;
    assert_eq!(events, ["one ", "two ", "three ", "four ", "five ", "six"]);
}

#[tokio::test]
async fn empty_conversation_is_rejected_with_an_envelope() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.post("/multi/send2", &json!([])).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/json");

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":false,"message":"messages can not be empty"}"#);

    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn builtin_prompt_stream() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new().with_fragments(["Sure", "."])).await;

    let server = builder.build("").await;
    let response = server.client.get("/multi/send3").await;

    assert_eq!(response.status(), 200);

    let events = TestClient::read_events(response).await;
    assert_eq!(events, ["Sure", "."]);

    assert_eq!(
        provider.chat_requests()[0]["messages"],
        json!([{"role": "user", "content": "You are a helpful assistant."}])
    );
}

#[tokio::test]
async fn builtin_prompt_from_config() {
    let config = indoc! {r#"
        [gateway]
        builtin_prompt = "Tell me a joke."
    "#};

    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build(config).await;
    let response = server.client.get("/multi/send3").await;

    let events = TestClient::read_events(response).await;
    assert!(!events.is_empty());

    assert_eq!(
        provider.chat_requests()[0]["messages"],
        json!([{"role": "user", "content": "Tell me a joke."}])
    );
}

#[tokio::test]
async fn builtin_stream_is_empty_when_the_provider_fails() {
    let mut builder = TestServer::builder();
    builder
        .spawn_llm(OpenAIMock::new().with_service_unavailable("try again later"))
        .await;

    let server = builder.build("").await;
    let response = server.client.get("/multi/send3").await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let events = TestClient::read_events(response).await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn blank_builtin_prompt_yields_empty_stream() {
    let config = indoc! {r#"
        [gateway]
        builtin_prompt = " "
    "#};

    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build(config).await;
    let response = server.client.get("/multi/send3").await;

    assert_eq!(response.status(), 200);

    let events = TestClient::read_events(response).await;
    assert!(events.is_empty());
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn concurrent_streams_do_not_mix() {
    let mut builder = TestServer::builder();
    builder
        .spawn_llm(
            OpenAIMock::new()
                .with_response("first", "one two three")
                .with_response("second", "four five six"),
        )
        .await;

    let server = builder.build("").await;

    let first = async {
        let response = server
            .client
            .post("/multi/send2", &json!([{"role": "user", "content": "first"}]))
            .await;

        TestClient::read_events(response).await
    };

    let second = async {
        let response = server
            .client
            .post("/multi/send2", &json!([{"role": "user", "content": "second"}]))
            .await;

        TestClient::read_events(response).await
    };

    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.concat(), "one two three");
    assert_eq!(second.concat(), "four five six");
}
