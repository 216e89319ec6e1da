use async_trait::async_trait;
use bson::{doc, to_bson};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument, UpdateModifications};
use mongodb::{Collection, Database};

use abi::errors::Error;
use abi::model::{Comment, Post};

use crate::database::post::{PostContentUpdate, PostRepo};

const COLL_POSTS: &str = "posts";

#[derive(Debug)]
pub struct MongoPost {
    coll: Collection<Post>,
}

impl MongoPost {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection(COLL_POSTS),
        }
    }

    fn newest_first() -> FindOptions {
        FindOptions::builder()
            .sort(Some(doc! {"create_time": -1}))
            .build()
    }

    fn return_after() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }
}

#[async_trait]
impl PostRepo for MongoPost {
    async fn create(&self, post: Post) -> Result<Post, Error> {
        self.coll.insert_one(&post, None).await?;
        Ok(post)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Post>, Error> {
        Ok(self.coll.find_one(doc! {"_id": id}, None).await?)
    }

    async fn list_timeline(&self) -> Result<Vec<Post>, Error> {
        let cursor = self.coll.find(doc! {}, Self::newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Post>, Error> {
        let cursor = self
            .coll
            .find(doc! {"user_id": user_id}, Self::newest_first())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_content(
        &self,
        id: &str,
        update: PostContentUpdate,
    ) -> Result<Option<Post>, Error> {
        let set = doc! {
            "content": to_bson(&update.content)?,
            "image_url": to_bson(&update.image_url)?,
            "video_url": to_bson(&update.video_url)?,
            "location": to_bson(&update.location)?,
            "event": to_bson(&update.event)?,
            "update_time": chrono::Utc::now().timestamp_millis(),
        };
        Ok(self
            .coll
            .find_one_and_update(doc! {"_id": id}, doc! {"$set": set}, Self::return_after())
            .await?)
    }

    async fn delete(&self, id: &str) -> Result<Option<Post>, Error> {
        Ok(self.coll.find_one_and_delete(doc! {"_id": id}, None).await?)
    }

    async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<Option<Post>, Error> {
        // single pipeline update so concurrent toggles never clobber each other
        let pipeline = UpdateModifications::Pipeline(vec![doc! {
            "$set": {"likes": {
                "$cond": {
                    "if": {"$in": [user_id, "$likes"]},
                    "then": {"$setDifference": ["$likes", [user_id]]},
                    "else": {"$concatArrays": ["$likes", [user_id]]},
                }
            }}
        }]);
        Ok(self
            .coll
            .find_one_and_update(doc! {"_id": post_id}, pipeline, Self::return_after())
            .await?)
    }

    async fn add_comment(&self, post_id: &str, comment: Comment) -> Result<Option<Post>, Error> {
        Ok(self
            .coll
            .find_one_and_update(
                doc! {"_id": post_id},
                doc! {"$push": {"comments": to_bson(&comment)?}},
                Self::return_after(),
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;

    use utils::mongodb_tester::MongoDbTester;

    use super::*;

    struct TestConfig {
        repo: MongoPost,
        _tdb: MongoDbTester,
    }

    impl Deref for TestConfig {
        type Target = MongoPost;
        fn deref(&self) -> &Self::Target {
            &self.repo
        }
    }

    impl TestConfig {
        async fn new() -> Self {
            let tdb = MongoDbTester::new("localhost", 27017).await;
            let repo = MongoPost::new(tdb.database().await);
            Self { repo, _tdb: tdb }
        }
    }

    fn text_post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            user_id: "owner".to_string(),
            content: Some("hello".to_string()),
            create_time: chrono::Utc::now().timestamp_millis(),
            update_time: chrono::Utc::now().timestamp_millis(),
            ..Default::default()
        }
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn double_toggle_restores_like_state() {
        let config = TestConfig::new().await;
        config.create(text_post("p1")).await.unwrap();

        let liked = config.toggle_like("p1", "u1").await.unwrap().unwrap();
        assert!(liked.is_liked_by("u1"));
        let unliked = config.toggle_like("p1", "u1").await.unwrap().unwrap();
        assert!(!unliked.is_liked_by("u1"));
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn concurrent_toggles_from_different_users_both_persist() {
        let config = TestConfig::new().await;
        config.create(text_post("p1")).await.unwrap();

        let (a, b) = tokio::join!(
            config.toggle_like("p1", "u1"),
            config.toggle_like("p1", "u2"),
        );
        a.unwrap();
        b.unwrap();

        let post = config.get_by_id("p1").await.unwrap().unwrap();
        assert!(post.is_liked_by("u1"));
        assert!(post.is_liked_by("u2"));
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn update_can_clear_media() {
        let config = TestConfig::new().await;
        let mut post = text_post("p1");
        post.image_url = Some("/uploads/a.png".to_string());
        config.create(post).await.unwrap();

        let updated = config
            .update_content(
                "p1",
                PostContentUpdate {
                    content: Some("edited".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content.as_deref(), Some("edited"));
        assert!(updated.image_url.is_none());
    }
}
