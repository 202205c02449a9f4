use httpmock::prelude::*;
use httpmock::Mock;
use regex::Regex;
use vk_birthday_bot::core::publisher::Publisher;
use vk_birthday_bot::core::vk_client::VkClient;
use vk_birthday_bot::domain::model::Post;
use vk_birthday_bot::{BotConfig, BotError};

fn config_for(server: &MockServer) -> BotConfig {
    BotConfig::from_toml_str(&format!(
        r#"
access_token = "test-token"
group_id = "testgroup"
api_base_url = "{}"
"#,
        server.base_url()
    ))
    .unwrap()
}

fn post() -> Post {
    Post {
        owner_id: "-123".to_string(),
        from_group: true,
        message: "🎉 18 октября".to_string(),
        attachment: None,
    }
}

// Auth parameters always follow the post parameters, so a text-only post has
// `access_token` right after `message`.
fn text_only_body() -> Regex {
    Regex::new(r"message=[^&]*&access_token=").unwrap()
}

fn mock_upload_server(server: &MockServer) -> Mock<'_> {
    let upload_url = server.url("/upload");
    server.mock(move |when, then| {
        when.method(GET)
            .path("/photos.getWallUploadServer")
            .query_param("group_id", "123");
        then.status(200).json_body(serde_json::json!({
            "response": {"upload_url": upload_url, "album_id": -14, "user_id": 0}
        }));
    })
}

fn mock_upload(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/upload")
            .header_exists("content-type")
            .body_contains("filename=\"birthday.jpg\"");
        then.status(200)
            .header("Content-Type", "text/html; charset=windows-1251")
            .body(r#"{"server": 852, "photo": "[{\"markers_restarted\":true,\"photo\":\"abc\"}]", "hash": "h4sh"}"#);
    })
}

#[tokio::test]
async fn test_text_only_post_without_image() {
    let server = MockServer::start();
    let upload_server = mock_upload_server(&server);
    let wall = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_contains("owner_id=-123")
            .body_contains("from_group=1")
            .body_matches(text_only_body());
        then.status(200)
            .json_body(serde_json::json!({"response": {"post_id": 11}}));
    });

    let client = VkClient::new(&config_for(&server)).unwrap();
    let published = Publisher::new(&client).publish(post(), None).await.unwrap();

    assert_eq!(published.post_id, 11);
    assert!(!published.with_image);
    wall.assert_hits(1);
    upload_server.assert_hits(0);
}

#[tokio::test]
async fn test_image_is_uploaded_and_attached() {
    let server = MockServer::start();
    let upload_server = mock_upload_server(&server);
    let upload = mock_upload(&server);
    let save = server.mock(|when, then| {
        when.method(GET)
            .path("/photos.saveWallPhoto")
            .query_param("group_id", "123")
            .query_param("server", "852")
            .query_param("hash", "h4sh");
        then.status(200).json_body(serde_json::json!({
            "response": [{"id": 456, "owner_id": -123, "album_id": -14}]
        }));
    });
    let wall_with_photo = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_contains("attachments=photo-123_456");
        then.status(200)
            .json_body(serde_json::json!({"response": {"post_id": 12}}));
    });

    let client = VkClient::new(&config_for(&server)).unwrap();
    let published = Publisher::new(&client)
        .publish(post(), Some(b"jpeg-bytes".to_vec()))
        .await
        .unwrap();

    assert_eq!(published.post_id, 12);
    assert!(published.with_image);
    upload_server.assert();
    upload.assert();
    save.assert();
    wall_with_photo.assert_hits(1);
}

#[tokio::test]
async fn test_save_failure_falls_back_to_single_text_post() {
    let server = MockServer::start();
    mock_upload_server(&server);
    mock_upload(&server);
    let save = server.mock(|when, then| {
        when.method(GET).path("/photos.saveWallPhoto");
        then.status(200).json_body(serde_json::json!({
            "error": {"error_code": 121, "error_msg": "Invalid hash"}
        }));
    });
    let wall_with_photo = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_contains("attachments=");
        then.status(200)
            .json_body(serde_json::json!({"response": {"post_id": 1}}));
    });
    let wall_text_only = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_matches(text_only_body());
        then.status(200)
            .json_body(serde_json::json!({"response": {"post_id": 13}}));
    });

    let client = VkClient::new(&config_for(&server)).unwrap();
    let published = Publisher::new(&client)
        .publish(post(), Some(b"jpeg-bytes".to_vec()))
        .await
        .unwrap();

    assert_eq!(published.post_id, 13);
    assert!(!published.with_image);
    save.assert_hits(1);
    wall_with_photo.assert_hits(0);
    wall_text_only.assert_hits(1);
}

#[tokio::test]
async fn test_rejected_upload_falls_back_to_text() {
    let server = MockServer::start();
    mock_upload_server(&server);
    server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200)
            .body(r#"{"server": 852, "photo": "[]", "hash": "h4sh"}"#);
    });
    let save = server.mock(|when, then| {
        when.method(GET).path("/photos.saveWallPhoto");
        then.status(200)
            .json_body(serde_json::json!({"response": [{"id": 1, "owner_id": -123}]}));
    });
    let wall_text_only = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_matches(text_only_body());
        then.status(200)
            .json_body(serde_json::json!({"response": {"post_id": 14}}));
    });

    let client = VkClient::new(&config_for(&server)).unwrap();
    let published = Publisher::new(&client)
        .publish(post(), Some(b"not really a jpeg".to_vec()))
        .await
        .unwrap();

    assert_eq!(published.post_id, 14);
    save.assert_hits(0);
    wall_text_only.assert_hits(1);
}

#[tokio::test]
async fn test_rejected_post_with_image_is_retried_without_it() {
    let server = MockServer::start();
    mock_upload_server(&server);
    mock_upload(&server);
    server.mock(|when, then| {
        when.method(GET).path("/photos.saveWallPhoto");
        then.status(200)
            .json_body(serde_json::json!({"response": [{"id": 456, "owner_id": -123}]}));
    });
    let wall_with_photo = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_contains("attachments=photo-123_456");
        then.status(200).json_body(serde_json::json!({
            "error": {"error_code": 214, "error_msg": "Access to adding post denied"}
        }));
    });
    let wall_text_only = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_matches(text_only_body());
        then.status(200)
            .json_body(serde_json::json!({"response": {"post_id": 15}}));
    });

    let client = VkClient::new(&config_for(&server)).unwrap();
    let published = Publisher::new(&client)
        .publish(post(), Some(b"jpeg-bytes".to_vec()))
        .await
        .unwrap();

    assert_eq!(published.post_id, 15);
    assert!(!published.with_image);
    wall_with_photo.assert_hits(1);
    wall_text_only.assert_hits(1);
}

#[tokio::test]
async fn test_both_attempts_failing_returns_first_error() {
    let server = MockServer::start();
    mock_upload_server(&server);
    mock_upload(&server);
    server.mock(|when, then| {
        when.method(GET).path("/photos.saveWallPhoto");
        then.status(200)
            .json_body(serde_json::json!({"response": [{"id": 456, "owner_id": -123}]}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_contains("attachments=photo-123_456");
        then.status(200).json_body(serde_json::json!({
            "error": {"error_code": 214, "error_msg": "Access to adding post denied"}
        }));
    });
    let wall_text_only = server.mock(|when, then| {
        when.method(POST)
            .path("/wall.post")
            .body_matches(text_only_body());
        then.status(200).json_body(serde_json::json!({
            "error": {"error_code": 15, "error_msg": "Access denied"}
        }));
    });

    let client = VkClient::new(&config_for(&server)).unwrap();
    let result = Publisher::new(&client)
        .publish(post(), Some(b"jpeg-bytes".to_vec()))
        .await;

    assert!(matches!(result, Err(BotError::ApiError { code: 214, .. })));
    wall_text_only.assert_hits(1);
}

#[tokio::test]
async fn test_failed_text_post_is_not_retried() {
    let server = MockServer::start();
    let wall = server.mock(|when, then| {
        when.method(POST).path("/wall.post");
        then.status(200).json_body(serde_json::json!({
            "error": {"error_code": 15, "error_msg": "Access denied"}
        }));
    });

    let client = VkClient::new(&config_for(&server)).unwrap();
    let result = Publisher::new(&client).publish(post(), None).await;

    assert!(matches!(result, Err(BotError::ApiError { code: 15, .. })));
    wall.assert_hits(1);
}
