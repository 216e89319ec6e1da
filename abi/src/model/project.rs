use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// project notes share the story TTL: gone 24 hours after creation
pub const NOTE_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    OnHold,
    Done,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// completion percentage, 0..=100
    pub progress: u8,
    pub members: Vec<String>,
    pub create_time: i64,
}

/// notes live in their own collection so the store can expire them natively
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectNote {
    #[serde(rename = "_id")]
    pub id: String,
    pub project_id: String,
    pub author_id: String,
    pub content: String,
    pub create_time: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub assignee: Option<String>,
    pub progress: u8,
    pub create_time: i64,
}
