use crate::core::vk_client::VkClient;
use crate::domain::model::Member;
use crate::utils::error::Result;
use serde::Deserialize;
use std::time::Duration;

pub const PAGE_SIZE: u64 = 1000;
/// Pause between pages to stay under VK's request rate limit.
pub const PAGE_DELAY: Duration = Duration::from_millis(500);

const MEMBER_FIELDS: &str = "bdate,first_name,last_name";

#[derive(Debug, Deserialize)]
struct MembersPage {
    count: u64,
    #[serde(default)]
    items: Vec<Member>,
}

/// Pages through `groups.getMembers` one request at a time.
pub struct MemberFetcher<'a> {
    client: &'a VkClient,
    page_delay: Duration,
}

impl<'a> MemberFetcher<'a> {
    pub fn new(client: &'a VkClient) -> Self {
        Self {
            client,
            page_delay: PAGE_DELAY,
        }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Fetches every member of `group_id`. Any failing page fails the whole
    /// fetch; earlier pages are dropped.
    pub async fn fetch_all(&self, group_id: &str) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        let mut offset = 0u64;

        loop {
            let page: MembersPage = self
                .client
                .get(
                    "groups.getMembers",
                    &[
                        ("group_id", group_id.to_string()),
                        ("fields", MEMBER_FIELDS.to_string()),
                        ("offset", offset.to_string()),
                        ("count", PAGE_SIZE.to_string()),
                    ],
                )
                .await
                .inspect_err(|e| tracing::error!("❌ Failed to fetch members at offset {}: {}", offset, e))?;

            let received = page.items.len();
            members.extend(page.items);
            tracing::debug!(
                "Fetched {} members at offset {} ({} of {})",
                received,
                offset,
                members.len(),
                page.count
            );

            if received == 0 || offset + PAGE_SIZE >= page.count {
                break;
            }

            offset += PAGE_SIZE;
            tokio::time::sleep(self.page_delay).await;
        }

        Ok(members)
    }
}
