#![allow(dead_code)]

use axum::Router;
use ingest_client::{ApiClient, ClientConfig};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Build a test `ClientConfig` pointing at `base_url`.
pub fn test_config(base_url: &str, token: Option<&str>) -> ClientConfig {
    ClientConfig {
        api_url: base_url.to_string(),
        api_token: token.map(str::to_string),
        request_timeout: Some(std::time::Duration::from_secs(5)),
        workflow: Default::default(),
    }
}

pub fn api(base_url: &str, token: Option<&str>) -> ApiClient {
    ApiClient::new(&test_config(base_url, token)).unwrap()
}
