use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    #[default]
    Pending,
    Accepted,
}

impl Display for FriendRequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FriendRequestStatus::Pending => write!(f, "pending"),
            FriendRequestStatus::Accepted => write!(f, "accepted"),
        }
    }
}

/// directed proposal between two users; at most one exists per unordered pair
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FriendRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: FriendRequestStatus,
    pub create_time: i64,
    pub accept_time: Option<i64>,
}

impl FriendRequest {
    /// the other party of the pair, from `user_id`'s point of view
    pub fn counterparty(&self, user_id: &str) -> &str {
        if self.sender_id == user_id {
            &self.recipient_id
        } else {
            &self.sender_id
        }
    }
}
