use async_trait::async_trait;
use std::fmt::Debug;

use abi::errors::Error;
use abi::model::FriendRequest;

#[async_trait]
pub trait FriendRequestRepo: Sync + Send + Debug {
    /// create a pending request; callers check the pair invariant first
    async fn create(&self, sender_id: &str, recipient_id: &str) -> Result<FriendRequest, Error>;

    async fn get_by_id(&self, id: &str) -> Result<Option<FriendRequest>, Error>;

    /// any request between the unordered pair, regardless of direction or status
    async fn get_between(&self, a: &str, b: &str) -> Result<Option<FriendRequest>, Error>;

    /// mark accepted; retry safe - an already accepted request is returned as-is
    async fn accept(&self, id: &str) -> Result<Option<FriendRequest>, Error>;

    /// incoming pending requests for a recipient
    async fn list_pending_incoming(&self, user_id: &str) -> Result<Vec<FriendRequest>, Error>;

    /// pending requests the user is involved in, either direction
    async fn list_pending_involving(&self, user_id: &str) -> Result<Vec<FriendRequest>, Error>;
}
