use async_trait::async_trait;
use bson::{doc, DateTime as BsonDateTime};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use std::time::Duration;

use abi::errors::Error;
use abi::model::{Project, ProjectNote, Task};

use crate::database::project::ProjectRepo;

const COLL_PROJECTS: &str = "projects";
const COLL_PROJECT_NOTES: &str = "project_notes";
const COLL_TASKS: &str = "tasks";

#[derive(Debug)]
pub struct MongoProject {
    projects: Collection<Project>,
    notes: Collection<ProjectNote>,
    tasks: Collection<Task>,
}

impl MongoProject {
    pub async fn new(db: Database) -> Result<Self, Error> {
        let notes: Collection<ProjectNote> = db.collection(COLL_PROJECT_NOTES);
        let index = IndexModel::builder()
            .keys(doc! {"expires_at": 1})
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(0))
                    .build(),
            )
            .build();
        notes.create_index(index, None).await?;

        Ok(Self {
            projects: db.collection(COLL_PROJECTS),
            notes,
            tasks: db.collection(COLL_TASKS),
        })
    }

    fn newest_first() -> FindOptions {
        FindOptions::builder()
            .sort(Some(doc! {"create_time": -1}))
            .build()
    }
}

#[async_trait]
impl ProjectRepo for MongoProject {
    async fn create_project(&self, project: Project) -> Result<Project, Error> {
        self.projects.insert_one(&project, None).await?;
        Ok(project)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, Error> {
        Ok(self.projects.find_one(doc! {"_id": id}, None).await?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, Error> {
        let cursor = self.projects.find(doc! {}, Self::newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn add_note(&self, note: ProjectNote) -> Result<ProjectNote, Error> {
        self.notes.insert_one(&note, None).await?;
        Ok(note)
    }

    async fn list_notes(
        &self,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProjectNote>, Error> {
        let filter = doc! {
            "project_id": project_id,
            "expires_at": {"$gt": BsonDateTime::from_chrono(now)},
        };
        let cursor = self.notes.find(filter, Self::newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn create_task(&self, task: Task) -> Result<Task, Error> {
        self.tasks.insert_one(&task, None).await?;
        Ok(task)
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>, Error> {
        let cursor = self
            .tasks
            .find(doc! {"project_id": project_id}, Self::newest_first())
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
