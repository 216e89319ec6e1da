use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use nanoid::nanoid;
use serde::Serialize;
use tracing::info;

use abi::errors::Error;
use abi::model::{Story, StoryView, User, STORY_TTL_SECS};
use db::{StoryRepo, UserRepo};

use crate::api_utils::custom_extract::SessionUser;
use crate::handlers::files::{delete_media_url, save_media_field, MediaKind};
use crate::AppState;

/// a recorded view joined with the viewer's profile
#[derive(Debug, Serialize)]
pub struct StoryViewer {
    pub user: User,
    pub viewed_at: i64,
}

pub async fn create_story(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Story>), Error> {
    let mut media = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if media.is_some() {
                    return Err(Error::bad_request("a story carries exactly one attachment"));
                }
                media = Some(save_media_field(&state, field).await?);
            }
            other => {
                return Err(Error::bad_request(format!("unknown field {other}")));
            }
        }
    }
    let media = media.ok_or_else(|| Error::bad_request("a story needs an attachment"))?;

    let now = Utc::now();
    let (image_url, video_url) = match media.kind {
        MediaKind::Image => (Some(media.url), None),
        MediaKind::Video => (None, Some(media.url)),
    };
    let story = Story {
        id: nanoid!(),
        user_id: caller.id.clone(),
        image_url,
        video_url,
        views: vec![],
        is_active: true,
        create_time: now.timestamp_millis(),
        expires_at: now + Duration::seconds(STORY_TTL_SECS),
    };
    let story = state.db.story.create(story).await?;
    info!("{} created story {}", caller.id, story.id);
    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn active_stories(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
) -> Result<Json<Vec<Story>>, Error> {
    let stories = state.db.story.list_active(Utc::now()).await?;
    Ok(Json(stories))
}

pub async fn user_stories(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Story>>, Error> {
    let stories = state.db.story.list_by_user(&user_id, Utc::now()).await?;
    Ok(Json(stories))
}

/// record that the caller saw the story; only the first view per viewer sticks
pub async fn view_story(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    let story = state
        .db
        .story
        .get_by_id(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    if story.is_expired(Utc::now()) || !story.is_active {
        return Err(Error::not_found());
    }

    let view = StoryView {
        viewer_id: caller.id,
        viewed_at: Utc::now().timestamp_millis(),
    };
    state.db.story.add_view(&id, view).await?;
    Ok(())
}

/// who saw the story, owner only
pub async fn story_viewers(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<StoryViewer>>, Error> {
    let story = state
        .db
        .story
        .get_by_id(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    if story.user_id != caller.id {
        return Err(Error::forbidden("only the owner may list viewers"));
    }

    let views = story.viewers();
    let ids: Vec<String> = views.iter().map(|v| v.viewer_id.clone()).collect();
    let users = state.db.user.list_by_ids(&ids).await?;

    // keep the most-recent-first order of the views
    let viewers = views
        .into_iter()
        .filter_map(|view| {
            users
                .iter()
                .find(|u| u.id == view.viewer_id)
                .map(|user| StoryViewer {
                    user: user.clone(),
                    viewed_at: view.viewed_at,
                })
        })
        .collect();
    Ok(Json(viewers))
}

pub async fn delete_story(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    let story = state
        .db
        .story
        .get_by_id(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    if story.user_id != caller.id && !caller.is_admin() {
        return Err(Error::forbidden("only the owner may delete a story"));
    }

    let deleted = state
        .db
        .story
        .delete(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    if let Some(url) = deleted.media_url() {
        delete_media_url(&state, url).await;
    }
    info!("{} deleted story {}", caller.id, id);
    Ok(())
}
