use crate::config::BotConfig;
use crate::core::birthday::{birthday_people, compose_post};
use crate::core::clock::{format_short, format_timestamp, today, SystemClock};
use crate::core::group::resolve_owner_id;
use crate::core::images::ImageProvider;
use crate::core::lock::{LockDecision, LockManager};
use crate::core::members::MemberFetcher;
use crate::core::publisher::Publisher;
use crate::core::vk_client::VkClient;
use crate::domain::model::{Member, Post};
use crate::domain::ports::Clock;
use crate::utils::error::Result;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// The lock refused the run; nothing was fetched or posted.
    Blocked(LockDecision),
    Published {
        owner_id: String,
        members_total: usize,
        birthday_people: Vec<Member>,
        post_text: String,
        post_id: i64,
        with_image: bool,
    },
}

/// Runs one daily pass: lock → group → members → post text → image → wall.
pub struct BirthdayBot<'a> {
    config: &'a BotConfig,
    client: VkClient,
    clock: Arc<dyn Clock>,
    lock: LockManager,
    images: ImageProvider,
}

impl<'a> BirthdayBot<'a> {
    pub fn new(config: &'a BotConfig) -> Result<Self> {
        let client = VkClient::new(config)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let lock = LockManager::new(&config.lock_file, clock.clone());
        let images = ImageProvider::from_config(config, client.http().clone());

        Ok(Self {
            config,
            client,
            clock,
            lock,
            images,
        })
    }

    /// Replaces the clock, e.g. to replay a specific day.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.lock = LockManager::new(&self.config.lock_file, clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_images(mut self, images: ImageProvider) -> Self {
        self.images = images;
        self
    }

    pub fn now_display(&self) -> String {
        format_timestamp(&self.clock.now())
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🌏 Current UTC+7 time: {}", self.now_display());

        let decision = self.lock.check_and_acquire().await;
        if !decision.may_proceed() {
            return Ok(RunReport::Blocked(decision));
        }

        tracing::info!("🔄 Resolving group id for {}", self.config.group_id);
        let owner_id = resolve_owner_id(&self.client, &self.config.group_id).await?;
        tracing::info!("✅ Group owner id: {}", owner_id);

        tracing::info!("🔄 Fetching group members");
        let members = MemberFetcher::new(&self.client)
            .fetch_all(&self.config.group_id)
            .await?;
        tracing::info!("✅ Members fetched: {}", members.len());

        let today = today(self.clock.as_ref());
        let people = birthday_people(&members, today);
        if people.is_empty() {
            tracing::info!("🎂 No birthdays today");
        } else {
            tracing::info!("🎂 Birthdays today: {}", people.len());
            for person in &people {
                tracing::info!("- {}", person.mention());
            }
        }

        let post_text = compose_post(&people, &format_short(&today));
        tracing::debug!("Post text:\n{}", post_text);

        let image = self.images.acquire().await;

        let post = Post {
            owner_id: owner_id.clone(),
            from_group: self.config.from_group,
            message: post_text.clone(),
            attachment: None,
        };
        let published = Publisher::new(&self.client).publish(post, image).await?;

        Ok(RunReport::Published {
            owner_id,
            members_total: members.len(),
            birthday_people: people,
            post_text,
            post_id: published.post_id,
            with_image: published.with_image,
        })
    }
}
