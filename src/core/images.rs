use crate::config::{BotConfig, ImageSearchConfig};
use crate::domain::ports::ImageSource;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

#[derive(Debug, Deserialize)]
struct SearchErrorBody {
    error: Option<SearchErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct SearchErrorDetail {
    message: Option<String>,
}

fn search_error(message: String) -> BotError {
    BotError::ImageSearchError { message }
}

/// Picks a random large greeting card from Google Custom Search.
pub struct WebImageSearch {
    client: Client,
    settings: ImageSearchConfig,
}

impl WebImageSearch {
    pub fn new(client: Client, settings: ImageSearchConfig) -> Self {
        Self { client, settings }
    }

    async fn search(&self, key: &str, cx: &str) -> Result<Vec<String>> {
        let query = self.settings.query();
        tracing::info!("🔍 Searching images for: \"{}\"", query);

        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&[
                ("key", key),
                ("cx", cx),
                ("q", query),
                ("searchType", "image"),
                ("imgSize", "large"),
                ("num", "10"),
                ("safe", "active"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(search_error("rate limit exceeded".to_string()));
        }
        if !status.is_success() {
            let detail = response
                .json::<SearchErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|error| error.message)
                .unwrap_or_default();
            return Err(search_error(format!("API error {} - {}", status.as_u16(), detail)));
        }

        let body: SearchResponse = response.json().await?;

        Ok(body.items.into_iter().map(|item| item.link).collect())
    }

    async fn download(&self, link: &str) -> Result<Vec<u8>> {
        let host = url::Url::parse(link)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| link.to_string());
        tracing::info!("📥 Downloading image from {}", host);

        let response = self
            .client
            .get(link)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(search_error(format!(
                "download from {} failed with status {}",
                host,
                status.as_u16()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageSource for WebImageSearch {
    fn name(&self) -> &str {
        "image search"
    }

    async fn fetch(&self) -> Option<Vec<u8>> {
        let Some((key, cx)) = self.settings.credentials() else {
            tracing::warn!("⚠️ Image search API key or search engine id is not configured");
            return None;
        };

        let links = match self.search(key, cx).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!("❌ {}", e);
                return None;
            }
        };

        let Some(link) = links.choose(&mut rand::thread_rng()).cloned() else {
            tracing::warn!("❌ Image search returned no results");
            return None;
        };

        match self.download(&link).await {
            Ok(bytes) => {
                tracing::info!("✅ Image downloaded from search ({} bytes)", bytes.len());
                Some(bytes)
            }
            Err(e) => {
                tracing::warn!("❌ {}", e);
                None
            }
        }
    }
}

/// Picks a random image file from a local directory.
pub struct LocalFolder {
    dir: PathBuf,
}

impl LocalFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn image_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if has_image_extension(&path) && entry.file_type().await?.is_file() {
                files.push(path);
            }
        }

        // read_dir order is platform-dependent.
        files.sort();
        Ok(files)
    }
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[async_trait]
impl ImageSource for LocalFolder {
    fn name(&self) -> &str {
        "local folder"
    }

    async fn fetch(&self) -> Option<Vec<u8>> {
        let files = match self.image_files().await {
            Ok(files) => files,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("❌ Image folder {} does not exist", self.dir.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("❌ Cannot list image folder {}: {}", self.dir.display(), e);
                return None;
            }
        };

        let Some(path) = files.choose(&mut rand::thread_rng()).cloned() else {
            tracing::warn!("❌ No images found in {}", self.dir.display());
            return None;
        };

        tracing::info!("🖼 Picked local image: {}", path.display());
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::info!("✅ Local image loaded ({} bytes)", bytes.len());
                Some(bytes)
            }
            Err(e) => {
                tracing::warn!("❌ Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Tries each source in order and returns the first image produced.
pub struct ImageProvider {
    sources: Vec<Box<dyn ImageSource>>,
    announce_fallback: bool,
}

impl ImageProvider {
    pub fn new(sources: Vec<Box<dyn ImageSource>>) -> Self {
        Self {
            sources,
            announce_fallback: true,
        }
    }

    /// Web search first when enabled, then always the local folder.
    /// `fallback_to_local` only decides whether the switch is logged.
    pub fn from_config(config: &BotConfig, client: Client) -> Self {
        let mut sources: Vec<Box<dyn ImageSource>> = Vec::new();

        if let Some(search) = config.image_search.as_ref().filter(|_| config.search_enabled()) {
            sources.push(Box::new(WebImageSearch::new(client, search.clone())));
        }
        sources.push(Box::new(LocalFolder::new(&config.images_dir)));

        Self {
            sources,
            announce_fallback: config.fallback_to_local(),
        }
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// `None` is a valid outcome: the post then goes out without a picture.
    pub async fn acquire(&self) -> Option<Vec<u8>> {
        for (index, source) in self.sources.iter().enumerate() {
            if index == 0 {
                tracing::info!("🖼 Looking for an image via {}", source.name());
            } else if self.announce_fallback {
                tracing::info!("🔄 Falling back to {}", source.name());
            } else {
                tracing::debug!("Trying {}", source.name());
            }

            if let Some(bytes) = source.fetch().await {
                return Some(bytes);
            }
        }

        tracing::warn!("⚠️ No image available, posting text only");
        None
    }
}
