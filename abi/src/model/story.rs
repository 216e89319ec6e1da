use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// stories live for 24 hours after creation
pub const STORY_TTL_SECS: i64 = 24 * 60 * 60;

/// time-limited media post; the store expires the document via a TTL index on
/// `expires_at`, the listing queries filter on it as well
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Story {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub views: Vec<StoryView>,
    pub is_active: bool,
    pub create_time: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoryView {
    pub viewer_id: String,
    pub viewed_at: i64,
}

impl Story {
    pub fn media_url(&self) -> Option<&str> {
        self.image_url.as_deref().or(self.video_url.as_deref())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// distinct viewers excluding the owner, most recent view first
    pub fn viewers(&self) -> Vec<&StoryView> {
        let mut seen = std::collections::HashSet::new();
        let mut views: Vec<&StoryView> = self
            .views
            .iter()
            .filter(|v| v.viewer_id != self.user_id)
            .filter(|v| seen.insert(v.viewer_id.as_str()))
            .collect();
        views.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn story_with_views(views: Vec<StoryView>) -> Story {
        Story {
            id: "s1".to_string(),
            user_id: "owner".to_string(),
            image_url: Some("/uploads/s.png".to_string()),
            video_url: None,
            views,
            is_active: true,
            create_time: 0,
            expires_at: Utc::now() + Duration::hours(24),
        }
    }

    #[test]
    fn viewers_excludes_owner_and_dedups() {
        let story = story_with_views(vec![
            StoryView {
                viewer_id: "owner".to_string(),
                viewed_at: 10,
            },
            StoryView {
                viewer_id: "a".to_string(),
                viewed_at: 1,
            },
            StoryView {
                viewer_id: "b".to_string(),
                viewed_at: 5,
            },
            StoryView {
                viewer_id: "a".to_string(),
                viewed_at: 3,
            },
        ]);
        let viewers = story.viewers();
        assert_eq!(viewers.len(), 2);
        assert_eq!(viewers[0].viewer_id, "b");
        assert_eq!(viewers[1].viewer_id, "a");
    }

    #[test]
    fn expiry_is_inclusive() {
        let mut story = story_with_views(vec![]);
        let now = Utc::now();
        story.expires_at = now;
        assert!(story.is_expired(now));
        story.expires_at = now + Duration::seconds(1);
        assert!(!story.is_expired(now));
    }
}
