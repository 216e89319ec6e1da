use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use abi::errors::Error;
use abi::model::{Project, ProjectNote, Task};

#[async_trait]
pub trait ProjectRepo: Sync + Send + Debug {
    async fn create_project(&self, project: Project) -> Result<Project, Error>;

    async fn get_project(&self, id: &str) -> Result<Option<Project>, Error>;

    async fn list_projects(&self) -> Result<Vec<Project>, Error>;

    async fn add_note(&self, note: ProjectNote) -> Result<ProjectNote, Error>;

    /// unexpired notes of a project, newest first
    async fn list_notes(
        &self,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProjectNote>, Error>;

    async fn create_task(&self, task: Task) -> Result<Task, Error>;

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>, Error>;
}
