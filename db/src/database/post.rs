use async_trait::async_trait;
use std::fmt::Debug;

use abi::errors::Error;
use abi::model::{Comment, Post};

/// owner-editable fields; `None` clears, so the handler passes current values through
#[derive(Clone, Debug, Default)]
pub struct PostContentUpdate {
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
    pub event: Option<String>,
}

#[async_trait]
pub trait PostRepo: Sync + Send + Debug {
    async fn create(&self, post: Post) -> Result<Post, Error>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Post>, Error>;

    /// newest first
    async fn list_timeline(&self) -> Result<Vec<Post>, Error>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Post>, Error>;

    async fn update_content(
        &self,
        id: &str,
        update: PostContentUpdate,
    ) -> Result<Option<Post>, Error>;

    /// returns the deleted post so the caller can clean up its blob
    async fn delete(&self, id: &str) -> Result<Option<Post>, Error>;

    /// atomic membership flip of `user_id` in the like set
    async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<Option<Post>, Error>;

    async fn add_comment(&self, post_id: &str, comment: Comment) -> Result<Option<Post>, Error>;
}
