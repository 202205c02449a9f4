use serde::{Deserialize, Serialize};
use std::fmt;

/// A group member as returned by `groups.getMembers` with
/// `fields=bdate,first_name,last_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// `DD.MM` or `DD.MM.YYYY`; absent when hidden by privacy settings.
    #[serde(default)]
    pub bdate: Option<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Profile mention as VK renders it inside wall posts.
    pub fn mention(&self) -> String {
        format!("@id{} ({})", self.id, self.full_name())
    }
}

/// A photo saved to the group's wall album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub owner_id: i64,
    pub photo_id: i64,
}

impl fmt::Display for PhotoAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "photo{}_{}", self.owner_id, self.photo_id)
    }
}

/// One wall post. `owner_id` is negative for a group wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub owner_id: String,
    pub from_group: bool,
    pub message: String,
    pub attachment: Option<PhotoAttachment>,
}

impl Post {
    pub fn text_only(&self) -> Post {
        Post {
            attachment: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_mention() {
        let member = Member {
            id: 42,
            first_name: "Анна".to_string(),
            last_name: "Иванова".to_string(),
            bdate: Some("1.2".to_string()),
        };
        assert_eq!(member.mention(), "@id42 (Анна Иванова)");
    }

    #[test]
    fn test_member_without_bdate_deserializes() {
        let member: Member =
            serde_json::from_str(r#"{"id": 7, "first_name": "Ivan", "last_name": "Petrov", "can_access_closed": true}"#)
                .unwrap();
        assert_eq!(member.id, 7);
        assert!(member.bdate.is_none());
    }

    #[test]
    fn test_attachment_reference() {
        let photo = PhotoAttachment {
            owner_id: -123,
            photo_id: 456,
        };
        assert_eq!(photo.to_string(), "photo-123_456");
    }
}
