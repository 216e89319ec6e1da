use serde::{Deserialize, Serialize};

/// user post with at most one media attachment (image XOR video)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
    pub event: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<Comment>,
    pub create_time: i64,
    pub update_time: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub create_time: i64,
}

impl Post {
    pub fn media_url(&self) -> Option<&str> {
        self.image_url.as_deref().or(self.video_url.as_deref())
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_url_prefers_whichever_is_set() {
        let mut post = Post::default();
        assert!(post.media_url().is_none());
        post.video_url = Some("/uploads/a.mp4".to_string());
        assert_eq!(post.media_url(), Some("/uploads/a.mp4"));
        post.video_url = None;
        post.image_url = Some("/uploads/a.png".to_string());
        assert_eq!(post.media_url(), Some("/uploads/a.png"));
    }
}
