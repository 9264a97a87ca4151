use indoc::indoc;
use integration_tests::{TestServer, llms::OpenAIMock};
use serde_json::json;

#[tokio::test]
async fn send_message() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.get_with_query("/send", &[("message", "Hello there")]).await;

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":true,"data":"This is a test response from the mock LLM server"}"#);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-key"));

    assert_eq!(
        requests[0].body,
        json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "Hello there"}],
            "stream": false
        })
    );
}

#[tokio::test]
async fn send_uses_configured_model() {
    let config = indoc! {r#"
        [llm]
        chat_model = "gpt-4o-mini"
    "#};

    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build(config).await;
    let response = server.client.get("/send?message=Hi").await;

    assert_eq!(response.status(), 200);
    assert_eq!(provider.chat_requests()[0]["model"], "gpt-4o-mini");
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.get_with_query("/send", &[("message", "   ")]).await;

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":false,"message":"message can not be blank"}"#);

    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn missing_message_parameter() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.get("/send").await;

    assert_eq!(response.status(), 400);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn multi_send_forwards_the_conversation_in_order() {
    let mock = OpenAIMock::new().with_response("Cargo", "Cargo is the Rust package manager.");

    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(mock).await;

    let server = builder.build("").await;

    let conversation = json!([
        {"role": "system", "content": "Be brief."},
        {"role": "user", "content": "What is Rust?"},
        {"role": "assistant", "content": "A systems language."},
        {"role": "user", "content": "And Cargo?"}
    ]);

    let response = server.client.post("/multi/send", &conversation).await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":true,"data":"Cargo is the Rust package manager."}"#);

    assert_eq!(provider.chat_requests()[0]["messages"], conversation);
}

#[tokio::test]
async fn multi_send_rejects_empty_conversation() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.post("/multi/send", &json!([])).await;

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":false,"message":"messages can not be empty"}"#);

    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn unknown_role_is_rejected_before_forwarding() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server
        .client
        .post("/multi/send", &json!([{"role": "wizard", "content": "Hi"}]))
        .await;

    assert_eq!(response.status(), 422);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn custom_path() {
    let config = indoc! {r#"
        [gateway]
        path = "/chat"
    "#};

    let mut builder = TestServer::builder();
    builder.spawn_llm(OpenAIMock::new().with_response("Ping", "Pong")).await;

    let server = builder.build(config).await;

    let response = server.client.get("/chat/send?message=Ping").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":true,"data":"Pong"}"#);

    let response = server.client.get("/send?message=Ping").await;
    assert_eq!(response.status(), 404);
}
