use integration_tests::{TestServer, llms::OpenAIMock};
use serde_json::json;

#[tokio::test]
async fn authentication_failure() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(OpenAIMock::new().with_auth_error("Invalid API key")).await;

    let server = builder.build("").await;
    let response = server.client.get("/send?message=Hello").await;

    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(
        body,
        json!({
            "error": {
                "message": "Authentication failed: Invalid API key",
                "type": "authentication_error",
                "code": 401
            }
        })
    );
}

#[tokio::test]
async fn rate_limited() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(OpenAIMock::new().with_rate_limit("Slow down")).await;

    let server = builder.build("").await;
    let response = server
        .client
        .post("/multi/send", &json!([{"role": "user", "content": "Hi"}]))
        .await;

    assert_eq!(response.status(), 429);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "rate_limit_error");
    assert_eq!(body["error"]["message"], "Rate limit exceeded: Slow down");
}

#[tokio::test]
async fn image_policy_rejection() {
    let mut builder = TestServer::builder();
    builder
        .spawn_llm(OpenAIMock::new().with_bad_request("Your request was rejected by the safety system"))
        .await;

    let server = builder.build("").await;
    let response = server.client.get("/images?prompt=forbidden&n=2").await;

    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn provider_outage_is_a_bad_gateway() {
    let mut builder = TestServer::builder();
    builder
        .spawn_llm(OpenAIMock::new().with_service_unavailable("overloaded"))
        .await;

    let server = builder.build("").await;
    let response = server.client.get("/image?prompt=cat").await;

    assert_eq!(response.status(), 502);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Provider API error (503): overloaded");
}

#[tokio::test]
async fn provider_internal_error_is_passed_through() {
    let mut builder = TestServer::builder();
    builder
        .spawn_llm(OpenAIMock::new().with_internal_error("model crashed"))
        .await;

    let server = builder.build("").await;
    let response = server
        .client
        .post("/multi/send2", &json!([{"role": "user", "content": "Hi"}]))
        .await;

    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["message"], "model crashed");
}

#[tokio::test]
async fn unreachable_provider() {
    let config = r#"
        [llm]
        base_url = "http://127.0.0.1:1/v1"
        timeout = "2s"
    "#;

    let server = TestServer::builder().build(config).await;
    let response = server.client.get("/send?message=Hello").await;

    assert_eq!(response.status(), 502);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "api_error");
}
