use httpmock::prelude::*;
use reqwest::Client;
use tempfile::TempDir;
use vk_birthday_bot::config::ImageSearchConfig;
use vk_birthday_bot::core::images::{ImageProvider, LocalFolder, WebImageSearch};
use vk_birthday_bot::domain::ports::ImageSource;

fn settings(server: &MockServer) -> ImageSearchConfig {
    ImageSearchConfig {
        enable: true,
        api_key: Some("google-key".to_string()),
        search_engine_id: Some("engine".to_string()),
        query: Some("открытки".to_string()),
        fallback_to_local: true,
        endpoint: server.url("/customsearch/v1"),
    }
}

#[tokio::test]
async fn test_search_downloads_a_result() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/customsearch/v1")
            .query_param("key", "google-key")
            .query_param("cx", "engine")
            .query_param("q", "открытки")
            .query_param("searchType", "image")
            .query_param("imgSize", "large")
            .query_param("num", "10")
            .query_param("safe", "active");
        then.status(200).json_body(serde_json::json!({
            "items": [{"link": server.url("/cards/one.jpg"), "mime": "image/jpeg"}]
        }));
    });
    let download = server.mock(|when, then| {
        when.method(GET)
            .path("/cards/one.jpg")
            .header_exists("user-agent");
        then.status(200).body(b"card-bytes");
    });

    let source = WebImageSearch::new(Client::new(), settings(&server));

    assert_eq!(source.fetch().await, Some(b"card-bytes".to_vec()));
    search.assert();
    download.assert();
}

#[tokio::test]
async fn test_rate_limited_search_is_soft_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/customsearch/v1");
        then.status(429).json_body(serde_json::json!({
            "error": {"code": 429, "message": "Quota exceeded"}
        }));
    });

    let source = WebImageSearch::new(Client::new(), settings(&server));

    assert!(source.fetch().await.is_none());
}

#[tokio::test]
async fn test_search_error_status_is_soft_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/customsearch/v1");
        then.status(403).json_body(serde_json::json!({
            "error": {"code": 403, "message": "API key not valid"}
        }));
    });

    let source = WebImageSearch::new(Client::new(), settings(&server));

    assert!(source.fetch().await.is_none());
}

#[tokio::test]
async fn test_no_results_and_broken_download() {
    let server = MockServer::start();
    let mut search = server.mock(|when, then| {
        when.method(GET).path("/customsearch/v1");
        then.status(200).json_body(serde_json::json!({"searchInformation": {"totalResults": "0"}}));
    });

    let source = WebImageSearch::new(Client::new(), settings(&server));
    assert!(source.fetch().await.is_none());
    search.delete();

    server.mock(|when, then| {
        when.method(GET).path("/customsearch/v1");
        then.status(200).json_body(serde_json::json!({
            "items": [{"link": server.url("/cards/gone.jpg")}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/cards/gone.jpg");
        then.status(404);
    });

    assert!(source.fetch().await.is_none());
}

#[tokio::test]
async fn test_provider_falls_back_to_local_folder() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/customsearch/v1");
        then.status(429);
    });

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cake.JPEG"), b"local-card").unwrap();

    let provider = ImageProvider::new(vec![
        Box::new(WebImageSearch::new(Client::new(), settings(&server))),
        Box::new(LocalFolder::new(dir.path())),
    ]);

    assert_eq!(provider.acquire().await, Some(b"local-card".to_vec()));
}
