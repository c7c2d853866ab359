#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use grok_proxy::{app, AppConfig, GrokClient, UpstreamClient};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const UPSTREAM_PATH: &str = "/v1/chat/completions";
pub const TEST_KEY: &str = "gsk_test";

pub struct TestHarness {
    pub mock_server: MockServer,
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_timeout(Duration::from_secs(60)).await
    }

    pub async fn with_timeout(timeout: Duration) -> Self {
        let mock_server = MockServer::start().await;
        let config = AppConfig::default()
            .with_upstream_url(format!("{}{}", mock_server.uri(), UPSTREAM_PATH))
            .with_upstream_timeout(timeout);
        let upstream: Arc<dyn UpstreamClient> = Arc::new(GrokClient::new(&config).unwrap());
        let addr = start_server(upstream);

        Self {
            mock_server,
            addr,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.addr, route)
    }

    pub async fn post_chat(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/chat"))
            .json(&body)
            .send()
            .await
            .expect("failed to send request")
    }

    pub async fn mount_json_response(&self, status: u16, response: Value) {
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .and(header("Authorization", "Bearer gsk_test"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(status).set_body_json(&response))
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mount_delayed_response(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": "late" }))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    /// 断言上游一次都没有被调用
    pub async fn expect_no_upstream_calls(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.mock_server)
            .await;
    }
}

fn start_server(upstream: Arc<dyn UpstreamClient>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(upstream);

    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(router.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });

    addr
}

pub fn simple_chat() -> Value {
    json!({
        "apiKey": TEST_KEY,
        "messages": [{ "role": "user", "content": "hi" }],
    })
}

pub fn completion_response(id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "object": "chat.completion",
        "model": "grok-beta",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11 }
    })
}
