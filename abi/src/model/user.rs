use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Unassigned,
    Admin,
    Employee,
    Client,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Unassigned => write!(f, "unassigned"),
            UserRole::Admin => write!(f, "admin"),
            UserRole::Employee => write!(f, "employee"),
            UserRole::Client => write!(f, "client"),
        }
    }
}

impl UserRole {
    /// roles an admin may hand out during approval
    pub fn assignable(&self) -> bool {
        matches!(self, UserRole::Employee | UserRole::Client)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Display for ApprovalStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Clone, Serialize, Default, Deserialize, Debug)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    // round-trips through bson, never leaves the api as json
    #[serde(skip_serializing, default)]
    pub password: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub onboarded: bool,
    pub role: UserRole,
    pub is_active: bool,
    pub approval_status: ApprovalStatus,
    pub friends: Vec<String>,
    pub create_time: i64,
    pub update_time: i64,
}

impl User {
    /// a user may act in the system only when activated, approved and assigned a role
    pub fn can_act(&self) -> bool {
        self.is_active
            && self.approval_status == ApprovalStatus::Approved
            && self.role != UserRole::Unassigned
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_friend_of(&self, user_id: &str) -> bool {
        self.friends.iter().any(|id| id == user_id)
    }
}

/// self-service profile update; empty/absent fields keep their current value
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved_user() -> User {
        User {
            id: "u1".to_string(),
            is_active: true,
            approval_status: ApprovalStatus::Approved,
            role: UserRole::Employee,
            ..Default::default()
        }
    }

    #[test]
    fn can_act_requires_all_three_flags() {
        let user = approved_user();
        assert!(user.can_act());

        let mut inactive = approved_user();
        inactive.is_active = false;
        assert!(!inactive.can_act());

        let mut pending = approved_user();
        pending.approval_status = ApprovalStatus::Pending;
        assert!(!pending.can_act());

        let mut unassigned = approved_user();
        unassigned.role = UserRole::Unassigned;
        assert!(!unassigned.can_act());
    }

    #[test]
    fn only_employee_and_client_are_assignable() {
        assert!(UserRole::Employee.assignable());
        assert!(UserRole::Client.assignable());
        assert!(!UserRole::Admin.assignable());
        assert!(!UserRole::Unassigned.assignable());
    }

    #[test]
    fn password_is_not_serialized() {
        let mut user = approved_user();
        user.password = "hash".to_string();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));
        assert!(!json.contains("password"));
    }
}
