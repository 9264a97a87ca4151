pub mod llms;

use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use config::Config;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use llms::OpenAIServer;
use reqwest::{Method, RequestBuilder};
use server::ServeConfig;
use tokio::net::TcpListener;
use tokio::time::timeout;

static INIT: Once = Once::new();

fn init_crypto_provider() {
    INIT.call_once(|| {
        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .expect("Failed to install default crypto provider");
    });
}

/// Test client for making HTTP requests to the test server
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a POST request to the given path with JSON body
    pub async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> reqwest::Response {
        self.request(Method::POST, path).json(body).send().await.unwrap()
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.request(Method::GET, path).send().await.unwrap()
    }

    /// Send a GET request with the given query parameters, encoded by reqwest
    pub async fn get_with_query<T: serde::Serialize + ?Sized>(&self, path: &str, query: &T) -> reqwest::Response {
        self.request(Method::GET, path).query(query).send().await.unwrap()
    }

    /// Start building a request to the given path
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Read a server-sent event response to the end, returning every `data` payload
    pub async fn read_events(response: reqwest::Response) -> Vec<String> {
        response
            .bytes_stream()
            .eventsource()
            .take_while(|event| futures::future::ready(event.is_ok()))
            .filter_map(|event| async move { event.ok().map(|event| event.data) })
            .collect()
            .await
    }
}

/// Test server that manages the lifecycle of a server instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    /// The mock provider the gateway forwards to, if one was spawned
    pub provider: Option<OpenAIServer>,
    _handle: tokio::task::JoinHandle<()>,
}

/// Collects what the test server needs before it starts
#[derive(Default)]
pub struct TestServerBuilder {
    provider: Option<OpenAIServer>,
}

impl TestServerBuilder {
    /// Spawn the mock provider and point `llm.base_url` at it
    pub async fn spawn_llm(&mut self, mock: llms::OpenAIMock) -> OpenAIServer {
        let provider = mock.spawn().await.unwrap();
        self.provider = Some(provider.clone());

        provider
    }

    /// Start the server with the given TOML configuration
    pub async fn build(self, config_toml: &str) -> TestServer {
        init_crypto_provider();

        let mut table: toml::Table = toml::from_str(config_toml).unwrap();

        if let Some(provider) = &self.provider {
            let llm = table
                .entry("llm")
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));

            if let toml::Value::Table(llm) = llm {
                llm.entry("base_url").or_insert_with(|| provider.url().into());
                llm.entry("api_key").or_insert_with(|| "test-key".into());
            }
        }

        let config: Config = toml::Value::Table(table).try_into().unwrap();
        config.validate().unwrap();

        TestServer::start(config, self.provider).await
    }
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    async fn start(config: Config, provider: Option<OpenAIServer>) -> Self {
        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let serve_config = ServeConfig {
            listen_address: address,
            config,
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let _ = tx.send(server::serve(serve_config).await);
        });

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Check if the server failed to start (non-blocking check)
        if let Ok(Err(e)) = rx.try_recv() {
            eprintln!("Server failed to start: {e}");
            std::process::exit(1);
        }

        let client = TestClient::new(format!("http://{address}"));

        // Verify the server is actually running by making a simple request
        let mut retries = 10;
        while retries > 0 {
            if timeout(Duration::from_millis(100), client.request(Method::GET, "/").send())
                .await
                .is_ok()
            {
                break;
            }
            retries -= 1;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestServer {
            client,
            address,
            provider,
            _handle: handle,
        }
    }

    /// The mock provider, which must have been spawned with the builder
    pub fn provider(&self) -> &OpenAIServer {
        self.provider.as_ref().expect("no mock provider was spawned")
    }
}
