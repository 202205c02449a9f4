use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

/// Source of "now" for every date decision the bot makes.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// One way of producing image bytes for the post.
///
/// Sources never fail hard: `None` means "nothing here, try the next one".
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> Option<Vec<u8>>;
}
