use indoc::indoc;
use integration_tests::{TestServer, llms::OpenAIMock};
use reqwest::Method;

#[tokio::test]
async fn permissive_by_default() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build("").await;

    let response = server
        .client
        .request(Method::OPTIONS, "/multi/send")
        .header("Origin", "https://example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let headers = response.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert!(headers.contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn allow_origins_explicit() {
    let config = indoc! {r#"
        [server.cors]
        allow_origins = ["https://allowed.com", "https://also-allowed.com"]
    "#};

    let mut builder = TestServer::builder();
    builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build(config).await;

    let response = server
        .client
        .request(Method::GET, "/send?message=Hi")
        .header("Origin", "https://also-allowed.com")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://also-allowed.com"
    );

    let response = server
        .client
        .request(Method::GET, "/send?message=Hi")
        .header("Origin", "https://not-allowed.com")
        .send()
        .await
        .unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn allow_origins_glob() {
    let config = indoc! {r#"
        [server.cors]
        allow_origins = ["https://*.example.com"]
    "#};

    let mut builder = TestServer::builder();
    builder.spawn_llm(OpenAIMock::new()).await;

    let server = builder.build(config).await;

    let response = server
        .client
        .request(Method::GET, "/send?message=Hi")
        .header("Origin", "https://app.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://app.example.com"
    );
}

#[tokio::test]
async fn cors_applies_to_health() {
    let config = indoc! {r#"
        [server.cors]
        allow_origins = ["https://allowed.com"]
    "#};

    let server = TestServer::builder().build(config).await;

    let response = server
        .client
        .request(Method::GET, "/health")
        .header("Origin", "https://allowed.com")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://allowed.com"
    );
}
