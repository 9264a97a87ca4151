use indoc::indoc;
use integration_tests::{TestServer, llms::OpenAIMock};
use serde_json::json;

#[tokio::test]
async fn single_image_uses_configured_defaults() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server
        .client
        .get_with_query("/image", &[("prompt", "a lighthouse at dusk")])
        .await;

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":true,"data":"https://images.test/0.png"}"#);

    assert_eq!(
        provider.image_requests(),
        [json!({
            "prompt": "a lighthouse at dusk",
            "n": 1,
            "size": "512x512",
            "response_format": "url"
        })]
    );
}

#[tokio::test]
async fn single_image_defaults_from_config() {
    let config = indoc! {r#"
        [llm]
        image_model = "dall-e-2"

        [gateway.image]
        size = "small"
        format = "base64"
    "#};

    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build(config).await;
    let response = server.client.get("/image?prompt=cat").await;

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":true,"data":"aW1hZ2Ut0"}"#);

    assert_eq!(
        provider.image_requests(),
        [json!({
            "model": "dall-e-2",
            "prompt": "cat",
            "n": 1,
            "size": "256x256",
            "response_format": "b64_json"
        })]
    );
}

#[tokio::test]
async fn several_images_in_provider_order() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.get("/images?prompt=cats&n=3&size=1&format=url").await;

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(
        body,
        @r#"{"ok":true,"data":["https://images.test/0.png","https://images.test/1.png","https://images.test/2.png"]}"#
    );

    let request = &provider.image_requests()[0];
    assert_eq!(request["n"], 3);
    assert_eq!(request["size"], "256x256");
}

#[tokio::test]
async fn images_default_to_large_base64() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.get("/images?prompt=cats").await;

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":true,"data":["aW1hZ2Ut0"]}"#);

    let request = &provider.image_requests()[0];
    assert_eq!(request["n"], 1);
    assert_eq!(request["size"], "1024x1024");
    assert_eq!(request["response_format"], "b64_json");
}

#[tokio::test]
async fn size_by_name_and_unknown_format() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server
        .client
        .get("/images?prompt=cats&n=2&size=medium&format=png")
        .await;

    assert_eq!(response.status(), 200);

    let request = &provider.image_requests()[0];
    assert_eq!(request["size"], "512x512");
    assert_eq!(request["response_format"], "b64_json");
}

#[tokio::test]
async fn zero_images_is_rejected() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;
    let response = server.client.get("/images?prompt=cats&n=0").await;

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":false,"message":"n must be at least 1"}"#);

    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn blank_prompt_is_rejected() {
    let mut builder = TestServer::builder();
    let provider = builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;

    let response = server.client.get("/image?prompt=").await;
    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":false,"message":"prompt can not be blank"}"#);

    let response = server.client.get("/images?prompt=%20%20&n=2").await;
    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"ok":false,"message":"prompt can not be blank"}"#);

    assert!(provider.requests().is_empty());
}
