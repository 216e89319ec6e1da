use async_trait::async_trait;
use bson::{doc, to_bson, DateTime as BsonDateTime};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use std::time::Duration;

use abi::errors::Error;
use abi::model::{Story, StoryView};

use crate::database::story::StoryRepo;

const COLL_STORIES: &str = "stories";

#[derive(Debug)]
pub struct MongoStory {
    coll: Collection<Story>,
}

impl MongoStory {
    pub async fn new(db: Database) -> Result<Self, Error> {
        let coll = db.collection(COLL_STORIES);
        // the store reaps expired stories on its own; listings filter as well
        let index = IndexModel::builder()
            .keys(doc! {"expires_at": 1})
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(0))
                    .build(),
            )
            .build();
        coll.create_index(index, None).await?;
        Ok(Self { coll })
    }

    fn unexpired(now: DateTime<Utc>) -> bson::Document {
        doc! {
            "is_active": true,
            "expires_at": {"$gt": BsonDateTime::from_chrono(now)},
        }
    }

    fn newest_first() -> FindOptions {
        FindOptions::builder()
            .sort(Some(doc! {"create_time": -1}))
            .build()
    }
}

#[async_trait]
impl StoryRepo for MongoStory {
    async fn create(&self, story: Story) -> Result<Story, Error> {
        self.coll.insert_one(&story, None).await?;
        Ok(story)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Story>, Error> {
        Ok(self.coll.find_one(doc! {"_id": id}, None).await?)
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Story>, Error> {
        let cursor = self.coll.find(Self::unexpired(now), Self::newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Story>, Error> {
        let mut filter = Self::unexpired(now);
        filter.insert("user_id", user_id);
        let cursor = self.coll.find(filter, Self::newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn add_view(&self, story_id: &str, view: StoryView) -> Result<(), Error> {
        // the filter makes the append first-view-only and idempotent
        self.coll
            .update_one(
                doc! {"_id": story_id, "views.viewer_id": {"$ne": &view.viewer_id}},
                doc! {"$push": {"views": to_bson(&view)?}},
                None,
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<Option<Story>, Error> {
        Ok(self.coll.find_one_and_delete(doc! {"_id": id}, None).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;

    use chrono::Duration as ChronoDuration;
    use utils::mongodb_tester::MongoDbTester;

    use super::*;

    struct TestConfig {
        repo: MongoStory,
        _tdb: MongoDbTester,
    }

    impl Deref for TestConfig {
        type Target = MongoStory;
        fn deref(&self) -> &Self::Target {
            &self.repo
        }
    }

    impl TestConfig {
        async fn new() -> Self {
            let tdb = MongoDbTester::new("localhost", 27017).await;
            let repo = MongoStory::new(tdb.database().await).await.unwrap();
            Self { repo, _tdb: tdb }
        }
    }

    fn story(id: &str, expires_at: DateTime<Utc>) -> Story {
        Story {
            id: id.to_string(),
            user_id: "owner".to_string(),
            image_url: Some("/uploads/s.png".to_string()),
            video_url: None,
            views: vec![],
            is_active: true,
            create_time: chrono::Utc::now().timestamp_millis(),
            expires_at,
        }
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn expired_stories_never_listed() {
        let config = TestConfig::new().await;
        let now = Utc::now();
        config.create(story("fresh", now + ChronoDuration::hours(24))).await.unwrap();
        // expired but still active: must not appear either
        config.create(story("stale", now - ChronoDuration::hours(1))).await.unwrap();

        let listed = config.list_active(now).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "fresh");
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn add_view_records_first_view_only() {
        let config = TestConfig::new().await;
        let now = Utc::now();
        config.create(story("s1", now + ChronoDuration::hours(24))).await.unwrap();

        let view = |t| StoryView {
            viewer_id: "v1".to_string(),
            viewed_at: t,
        };
        config.add_view("s1", view(1)).await.unwrap();
        config.add_view("s1", view(2)).await.unwrap();

        let stored = config.get_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.views.len(), 1);
        assert_eq!(stored.views[0].viewed_at, 1);
    }
}
