use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use nanoid::nanoid;
use serde::Deserialize;
use tracing::info;

use abi::errors::Error;
use abi::model::{Project, ProjectNote, ProjectStatus, Task, TaskStatus, NOTE_TTL_SECS};
use db::ProjectRepo;

use crate::api_utils::custom_extract::{JsonExtractor, SessionUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub assignee: Option<String>,
    #[serde(default)]
    pub progress: u8,
}

pub async fn create_project(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    JsonExtractor(req): JsonExtractor<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), Error> {
    if req.name.trim().is_empty() {
        return Err(Error::bad_request("project name cannot be empty"));
    }

    // the creator is always a member
    let mut members = req.members;
    if !members.contains(&caller.id) {
        members.push(caller.id.clone());
    }
    let project = Project {
        id: nanoid!(),
        name: req.name,
        description: req.description,
        status: req.status,
        progress: 0,
        members,
        create_time: Utc::now().timestamp_millis(),
    };
    let project = state.db.project.create_project(project).await?;
    info!("{} created project {}", caller.id, project.id);
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
) -> Result<Json<Vec<Project>>, Error> {
    let projects = state.db.project.list_projects().await?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Project>, Error> {
    let project = state
        .db
        .project
        .get_project(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    Ok(Json(project))
}

/// notes expire like stories do, 24 hours after they are written
pub async fn add_note(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(project_id): Path<String>,
    JsonExtractor(req): JsonExtractor<NoteRequest>,
) -> Result<(StatusCode, Json<ProjectNote>), Error> {
    if req.content.trim().is_empty() {
        return Err(Error::bad_request("note cannot be empty"));
    }
    state
        .db
        .project
        .get_project(&project_id)
        .await?
        .ok_or_else(Error::not_found)?;

    let now = Utc::now();
    let note = ProjectNote {
        id: nanoid!(),
        project_id,
        author_id: caller.id,
        content: req.content,
        create_time: now.timestamp_millis(),
        expires_at: now + Duration::seconds(NOTE_TTL_SECS),
    };
    let note = state.db.project.add_note(note).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn list_notes(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectNote>>, Error> {
    let notes = state.db.project.list_notes(&project_id, Utc::now()).await?;
    Ok(Json(notes))
}

pub async fn create_task(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(project_id): Path<String>,
    JsonExtractor(req): JsonExtractor<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), Error> {
    if req.title.trim().is_empty() {
        return Err(Error::bad_request("task title cannot be empty"));
    }
    if req.progress > 100 {
        return Err(Error::bad_request("progress is a percentage"));
    }
    state
        .db
        .project
        .get_project(&project_id)
        .await?
        .ok_or_else(Error::not_found)?;

    let task = Task {
        id: nanoid!(),
        project_id,
        title: req.title,
        status: req.status,
        assignee: req.assignee,
        progress: req.progress,
        create_time: Utc::now().timestamp_millis(),
    };
    let task = state.db.project.create_task(task).await?;
    info!("{} created task {}", caller.id, task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Task>>, Error> {
    let tasks = state.db.project.list_tasks(&project_id).await?;
    Ok(Json(tasks))
}
