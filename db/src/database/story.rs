use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use abi::errors::Error;
use abi::model::{Story, StoryView};

#[async_trait]
pub trait StoryRepo: Sync + Send + Debug {
    async fn create(&self, story: Story) -> Result<Story, Error>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Story>, Error>;

    /// active, unexpired stories, newest first
    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Story>, Error>;

    async fn list_by_user(&self, user_id: &str, now: DateTime<Utc>)
        -> Result<Vec<Story>, Error>;

    /// append the view unless this viewer is already recorded
    async fn add_view(&self, story_id: &str, view: StoryView) -> Result<(), Error>;

    /// returns the deleted story so the caller can clean up its blob
    async fn delete(&self, id: &str) -> Result<Option<Story>, Error>;
}
