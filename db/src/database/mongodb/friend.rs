use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use nanoid::nanoid;

use abi::errors::Error;
use abi::model::{FriendRequest, FriendRequestStatus};

use crate::database::friend::FriendRequestRepo;

const COLL_FRIEND_REQUESTS: &str = "friend_requests";

#[derive(Debug)]
pub struct MongoFriendRequest {
    coll: Collection<FriendRequest>,
}

impl MongoFriendRequest {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection(COLL_FRIEND_REQUESTS),
        }
    }
}

#[async_trait]
impl FriendRequestRepo for MongoFriendRequest {
    async fn create(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest, Error> {
        let request = FriendRequest {
            id: nanoid!(),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            status: FriendRequestStatus::Pending,
            create_time: chrono::Utc::now().timestamp_millis(),
            accept_time: None,
        };
        self.coll.insert_one(&request, None).await?;
        Ok(request)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<FriendRequest>, Error> {
        Ok(self.coll.find_one(doc! {"_id": id}, None).await?)
    }

    async fn get_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>, Error> {
        let filter = doc! {"$or": [
            {"sender_id": a, "recipient_id": b},
            {"sender_id": b, "recipient_id": a},
        ]};
        Ok(self.coll.find_one(filter, None).await?)
    }

    async fn accept(&self, id: &str) -> Result<Option<FriendRequest>, Error> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .coll
            .find_one_and_update(
                doc! {"_id": id, "status": "pending"},
                doc! {"$set": {
                    "status": "accepted",
                    "accept_time": chrono::Utc::now().timestamp_millis(),
                }},
                options,
            )
            .await?;
        if updated.is_some() {
            return Ok(updated);
        }
        // lost the race or retried: an already accepted request is a no-op
        match self.get_by_id(id).await? {
            Some(request) if request.status == FriendRequestStatus::Accepted => Ok(Some(request)),
            _ => Ok(None),
        }
    }

    async fn list_pending_incoming(&self, user_id: &str) -> Result<Vec<FriendRequest>, Error> {
        let cursor = self
            .coll
            .find(doc! {"recipient_id": user_id, "status": "pending"}, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_pending_involving(&self, user_id: &str) -> Result<Vec<FriendRequest>, Error> {
        let filter = doc! {
            "status": "pending",
            "$or": [{"sender_id": user_id}, {"recipient_id": user_id}],
        };
        let cursor = self.coll.find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;

    use utils::mongodb_tester::MongoDbTester;

    use super::*;

    struct TestConfig {
        repo: MongoFriendRequest,
        _tdb: MongoDbTester,
    }

    impl Deref for TestConfig {
        type Target = MongoFriendRequest;
        fn deref(&self) -> &Self::Target {
            &self.repo
        }
    }

    impl TestConfig {
        async fn new() -> Self {
            let tdb = MongoDbTester::new("localhost", 27017).await;
            let repo = MongoFriendRequest::new(tdb.database().await);
            Self { repo, _tdb: tdb }
        }
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn get_between_ignores_direction() {
        let config = TestConfig::new().await;
        let request = config.create("a", "b").await.unwrap();
        assert_eq!(config.get_between("a", "b").await.unwrap().unwrap().id, request.id);
        assert_eq!(config.get_between("b", "a").await.unwrap().unwrap().id, request.id);
        assert!(config.get_between("a", "c").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn accept_is_retry_safe() {
        let config = TestConfig::new().await;
        let request = config.create("a", "b").await.unwrap();

        let first = config.accept(&request.id).await.unwrap().unwrap();
        assert_eq!(first.status, FriendRequestStatus::Accepted);
        let accept_time = first.accept_time;

        let second = config.accept(&request.id).await.unwrap().unwrap();
        assert_eq!(second.status, FriendRequestStatus::Accepted);
        assert_eq!(second.accept_time, accept_time);
    }
}
