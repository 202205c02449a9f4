use crate::core::vk_client::VkClient;
use crate::utils::error::{BotError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GroupInfo {
    id: i64,
}

/// `groups.getById` answers `{"groups": [...]}` since API 5.139 and a bare
/// array before that.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupsById {
    Wrapped {
        #[serde(default)]
        groups: Vec<GroupInfo>,
    },
    Bare(Vec<GroupInfo>),
}

impl GroupsById {
    fn first(self) -> Option<GroupInfo> {
        match self {
            GroupsById::Wrapped { groups } | GroupsById::Bare(groups) => groups.into_iter().next(),
        }
    }
}

/// Turns a configured group identifier into the wall owner id (`-<id>`).
/// Identifiers that already start with `-` are returned untouched.
pub async fn resolve_owner_id(client: &VkClient, group_id: &str) -> Result<String> {
    if group_id.starts_with('-') {
        return Ok(group_id.to_string());
    }

    let groups: GroupsById = client
        .get("groups.getById", &[("group_ids", group_id.to_string())])
        .await
        .inspect_err(|e| tracing::error!("❌ Failed to resolve group id: {}", e))?;

    let group = groups.first().ok_or_else(|| {
        tracing::error!("❌ Group '{}' not found, check groupId", group_id);
        BotError::GroupNotFound {
            group_id: group_id.to_string(),
        }
    })?;

    Ok(format!("-{}", group.id))
}

/// Numeric group id for the photo upload methods, which take it unsigned.
pub fn group_id_from_owner(owner_id: &str) -> String {
    owner_id.trim_start_matches('-').to_string()
}
