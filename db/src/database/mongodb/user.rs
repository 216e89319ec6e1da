use async_trait::async_trait;
use bson::{doc, to_bson, Document};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

use abi::errors::Error;
use abi::model::{User, UserRole, UserUpdate};

use crate::database::mongodb::utils::{is_duplicate_key, user_to_doc};
use crate::database::user::UserRepo;

const COLL_USERS: &str = "users";

#[derive(Debug)]
pub struct MongoUser {
    coll: Collection<Document>,
}

impl MongoUser {
    pub async fn new(db: Database) -> Result<Self, Error> {
        let coll = db.collection(COLL_USERS);
        let index = IndexModel::builder()
            .keys(doc! {"email": 1})
            .options(IndexOptions::builder().unique(true).build())
            .build();
        coll.create_index(index, None).await?;
        Ok(Self { coll })
    }

    async fn find_one_user(&self, filter: Document) -> Result<Option<User>, Error> {
        match self.coll.find_one(filter, None).await? {
            None => Ok(None),
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
        }
    }

    async fn find_users(&self, filter: Document) -> Result<Vec<User>, Error> {
        let docs: Vec<Document> = self.coll.find(filter, None).await?.try_collect().await?;
        docs.into_iter()
            .map(|doc| bson::from_document(doc).map_err(Error::from))
            .collect()
    }

    async fn update_returning(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<User>, Error> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        match self.coll.find_one_and_update(filter, update, options).await? {
            None => Ok(None),
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
        }
    }
}

#[async_trait]
impl UserRepo for MongoUser {
    async fn create_user(&self, user: User) -> Result<User, Error> {
        let doc = user_to_doc(&user)?;
        if let Err(e) = self.coll.insert_one(doc, None).await {
            if is_duplicate_key(&e) {
                return Err(Error::conflict("email already registered"));
            }
            return Err(e.into());
        }
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, Error> {
        self.find_one_user(doc! {"_id": id}).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.find_one_user(doc! {"email": email}).await
    }

    async fn verify_pwd(&self, email: &str, password: &str) -> Result<Option<User>, Error> {
        let Some(mut user) = self.get_user_by_email(email).await? else {
            return Ok(None);
        };
        let is_valid = utils::verify_password(password, &user.password)?;
        user.password = String::new();
        if !is_valid {
            return Ok(None);
        }
        Ok(Some(user))
    }

    async fn update_profile(&self, id: &str, update: UserUpdate) -> Result<Option<User>, Error> {
        let mut set = doc! {"update_time": chrono::Utc::now().timestamp_millis()};
        if let Some(full_name) = update.full_name {
            set.insert("full_name", full_name);
        }
        if let Some(avatar) = update.avatar {
            set.insert("avatar", avatar);
        }
        if let Some(bio) = update.bio {
            set.insert("bio", bio);
        }
        self.update_returning(doc! {"_id": id}, doc! {"$set": set})
            .await
    }

    async fn set_onboarded(&self, id: &str) -> Result<Option<User>, Error> {
        self.update_returning(
            doc! {"_id": id},
            doc! {"$set": {
                "onboarded": true,
                "update_time": chrono::Utc::now().timestamp_millis(),
            }},
        )
        .await
    }

    async fn approve(&self, id: &str, role: UserRole) -> Result<Option<User>, Error> {
        self.update_returning(
            doc! {"_id": id, "approval_status": "pending"},
            doc! {"$set": {
                "approval_status": "approved",
                "is_active": true,
                "role": to_bson(&role)?,
                "update_time": chrono::Utc::now().timestamp_millis(),
            }},
        )
        .await
    }

    async fn delete_user(&self, id: &str) -> Result<bool, Error> {
        let result = self.coll.delete_one(doc! {"_id": id}, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_pending(&self) -> Result<Vec<User>, Error> {
        self.find_users(doc! {"approval_status": "pending"}).await
    }

    async fn list_all(&self) -> Result<Vec<User>, Error> {
        self.find_users(doc! {}).await
    }

    async fn add_friend(&self, user_id: &str, friend_id: &str) -> Result<(), Error> {
        self.coll
            .update_one(
                doc! {"_id": user_id},
                doc! {"$addToSet": {"friends": friend_id}},
                None,
            )
            .await?;
        Ok(())
    }

    async fn list_by_ids(&self, ids: &[String]) -> Result<Vec<User>, Error> {
        self.find_users(doc! {"_id": {"$in": ids}}).await
    }

    async fn list_active_excluding(&self, exclude: &[String]) -> Result<Vec<User>, Error> {
        self.find_users(doc! {
            "_id": {"$nin": exclude},
            "is_active": true,
            "approval_status": "approved",
            "onboarded": true,
        })
        .await
    }

    async fn admin_exists(&self) -> Result<bool, Error> {
        Ok(self.find_one_user(doc! {"role": "admin"}).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;

    use abi::model::ApprovalStatus;
    use utils::mongodb_tester::MongoDbTester;

    use super::*;

    struct TestConfig {
        repo: MongoUser,
        _tdb: MongoDbTester,
    }

    impl Deref for TestConfig {
        type Target = MongoUser;
        fn deref(&self) -> &Self::Target {
            &self.repo
        }
    }

    impl TestConfig {
        async fn new() -> Self {
            let tdb = MongoDbTester::new("localhost", 27017).await;
            let repo = MongoUser::new(tdb.database().await).await.unwrap();
            Self { repo, _tdb: tdb }
        }
    }

    fn signup_user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            full_name: format!("user {id}"),
            email: email.to_string(),
            password: utils::hash_password("secret1").unwrap(),
            create_time: chrono::Utc::now().timestamp_millis(),
            update_time: chrono::Utc::now().timestamp_millis(),
            ..Default::default()
        }
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn duplicate_email_conflicts() {
        let config = TestConfig::new().await;
        config.create_user(signup_user("u1", "a@x.com")).await.unwrap();
        let err = config
            .create_user(signup_user("u2", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), abi::errors::ErrorKind::Conflict));
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn approve_only_moves_pending_users() {
        let config = TestConfig::new().await;
        config.create_user(signup_user("u1", "a@x.com")).await.unwrap();

        let approved = config.approve("u1", UserRole::Employee).await.unwrap();
        let user = approved.unwrap();
        assert!(user.is_active);
        assert_eq!(user.approval_status, ApprovalStatus::Approved);
        assert_eq!(user.role, UserRole::Employee);

        // second approval finds no pending user
        assert!(config.approve("u1", UserRole::Client).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn verify_pwd_round_trip() {
        let config = TestConfig::new().await;
        config.create_user(signup_user("u1", "a@x.com")).await.unwrap();

        let user = config.verify_pwd("a@x.com", "secret1").await.unwrap();
        assert!(user.is_some());
        assert!(user.unwrap().password.is_empty());
        assert!(config.verify_pwd("a@x.com", "wrong").await.unwrap().is_none());
        assert!(config.verify_pwd("b@x.com", "secret1").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn list_all_covers_every_lifecycle_state() {
        let config = TestConfig::new().await;
        config.create_user(signup_user("u1", "a@x.com")).await.unwrap();
        config.create_user(signup_user("u2", "b@x.com")).await.unwrap();
        // approved but not yet onboarded: outside the recommendation pool
        config.approve("u2", UserRole::Employee).await.unwrap();

        assert!(config.list_active_excluding(&[]).await.unwrap().is_empty());
        let mut all: Vec<String> = config
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        all.sort();
        assert_eq!(all, vec!["u1", "u2"]);
    }

    #[tokio::test]
    #[ignore = "requires a running mongod"]
    async fn add_friend_is_idempotent() {
        let config = TestConfig::new().await;
        config.create_user(signup_user("u1", "a@x.com")).await.unwrap();
        config.add_friend("u1", "u2").await.unwrap();
        config.add_friend("u1", "u2").await.unwrap();
        let user = config.get_user_by_id("u1").await.unwrap().unwrap();
        assert_eq!(user.friends, vec!["u2"]);
    }
}
