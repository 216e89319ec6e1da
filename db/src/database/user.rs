use async_trait::async_trait;
use std::fmt::Debug;

use abi::errors::Error;
use abi::model::{User, UserRole, UserUpdate};

#[async_trait]
pub trait UserRepo: Sync + Send + Debug {
    /// create user; email uniqueness is enforced by the store
    async fn create_user(&self, user: User) -> Result<User, Error>;

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// returns the user with the password hash cleared when credentials match
    async fn verify_pwd(&self, email: &str, password: &str) -> Result<Option<User>, Error>;

    async fn update_profile(&self, id: &str, update: UserUpdate) -> Result<Option<User>, Error>;

    async fn set_onboarded(&self, id: &str) -> Result<Option<User>, Error>;

    /// pending -> approved transition; returns None unless the target is pending
    async fn approve(&self, id: &str, role: UserRole) -> Result<Option<User>, Error>;

    /// hard delete, used on rejection only
    async fn delete_user(&self, id: &str) -> Result<bool, Error>;

    async fn list_pending(&self) -> Result<Vec<User>, Error>;

    /// every user regardless of lifecycle state, for maintenance tasks
    async fn list_all(&self) -> Result<Vec<User>, Error>;

    /// idempotent set-add into a user's friend list
    async fn add_friend(&self, user_id: &str, friend_id: &str) -> Result<(), Error>;

    async fn list_by_ids(&self, ids: &[String]) -> Result<Vec<User>, Error>;

    /// active, approved, onboarded users not in `exclude` - the recommendation pool
    async fn list_active_excluding(&self, exclude: &[String]) -> Result<Vec<User>, Error>;

    async fn admin_exists(&self) -> Result<bool, Error>;
}
