use crate::core::group::group_id_from_owner;
use crate::core::vk_client::VkClient;
use crate::domain::model::{PhotoAttachment, Post};
use crate::utils::error::{BotError, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct UploadServer {
    upload_url: String,
}

/// Reply of the upload server itself (not wrapped in the API envelope).
#[derive(Debug, Deserialize)]
struct UploadedPhoto {
    #[serde(default)]
    server: i64,
    #[serde(default)]
    photo: String,
    #[serde(default)]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct SavedPhoto {
    id: i64,
    owner_id: i64,
}

#[derive(Debug, Deserialize)]
struct WallPostResult {
    post_id: i64,
}

/// A published wall post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub post_id: i64,
    pub with_image: bool,
}

pub struct Publisher<'a> {
    client: &'a VkClient,
}

impl<'a> Publisher<'a> {
    pub fn new(client: &'a VkClient) -> Self {
        Self { client }
    }

    /// Publishes `post`, first uploading `image` when given.
    ///
    /// An upload failure drops the picture and posts text only. If the post
    /// with the picture is rejected, the text is posted once more without it;
    /// when that fails too, the first error is returned.
    pub async fn publish(&self, post: Post, image: Option<Vec<u8>>) -> Result<Published> {
        let mut attempts = Vec::with_capacity(2);

        if let Some(bytes) = image {
            match self.upload_photo(&post.owner_id, bytes).await {
                Ok(photo) => {
                    tracing::info!("✅ Image uploaded to VK as {}", photo);
                    attempts.push(Post {
                        attachment: Some(photo),
                        ..post.clone()
                    });
                }
                Err(e) => {
                    tracing::warn!("❌ Image upload failed, posting without it: {}", e);
                }
            }
        }
        attempts.push(post.text_only());

        let mut first_error = None;
        for (index, attempt) in attempts.iter().enumerate() {
            if index > 0 {
                tracing::info!("🔄 Retrying the post without an image");
            }

            match self.post_to_wall(attempt).await {
                Ok(post_id) => {
                    let with_image = attempt.attachment.is_some();
                    tracing::info!("✅ Post {} published (image: {})", post_id, with_image);
                    return Ok(Published { post_id, with_image });
                }
                Err(e) => {
                    tracing::error!("❌ Failed to publish post: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| BotError::ApiError {
            method: "wall.post".to_string(),
            code: 0,
            message: "no publish attempt was made".to_string(),
        }))
    }

    /// Upload server → multipart upload → save to the wall album.
    pub async fn upload_photo(&self, owner_id: &str, bytes: Vec<u8>) -> Result<PhotoAttachment> {
        let group_id = group_id_from_owner(owner_id);

        tracing::info!("🔄 Requesting VK upload server");
        let server: UploadServer = self
            .client
            .get("photos.getWallUploadServer", &[("group_id", group_id.clone())])
            .await?;

        tracing::info!("📤 Uploading image ({} bytes)", bytes.len());
        let part = Part::bytes(bytes)
            .file_name("birthday.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("photo", part);

        let response = self
            .client
            .http()
            .post(&server.upload_url)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| BotError::UploadError {
                message: format!("upload request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::UploadError {
                message: format!("upload server answered {}", status.as_u16()),
            });
        }

        // The upload server may label JSON as text/html, so parse the text.
        let body = response.text().await?;
        let uploaded: UploadedPhoto =
            serde_json::from_str(&body).map_err(|e| BotError::UploadError {
                message: format!("unexpected upload reply: {}", e),
            })?;

        if uploaded.photo.is_empty() || uploaded.photo == "[]" {
            return Err(BotError::UploadError {
                message: "upload server did not accept the image".to_string(),
            });
        }

        tracing::info!("💾 Saving photo to the group album");
        let saved: Vec<SavedPhoto> = self
            .client
            .get(
                "photos.saveWallPhoto",
                &[
                    ("group_id", group_id),
                    ("server", uploaded.server.to_string()),
                    ("photo", uploaded.photo),
                    ("hash", uploaded.hash),
                ],
            )
            .await?;

        let photo = saved.into_iter().next().ok_or_else(|| BotError::UploadError {
            message: "photos.saveWallPhoto returned no photo".to_string(),
        })?;

        Ok(PhotoAttachment {
            owner_id: photo.owner_id,
            photo_id: photo.id,
        })
    }

    pub async fn post_to_wall(&self, post: &Post) -> Result<i64> {
        let mut params = vec![
            ("owner_id", post.owner_id.clone()),
            ("from_group", if post.from_group { "1" } else { "0" }.to_string()),
            ("message", post.message.clone()),
        ];
        if let Some(photo) = &post.attachment {
            params.push(("attachments", photo.to_string()));
        }

        tracing::info!("📝 Publishing post to {}", post.owner_id);
        let result: WallPostResult = self.client.post_form("wall.post", &params).await?;
        Ok(result.post_id)
    }
}
