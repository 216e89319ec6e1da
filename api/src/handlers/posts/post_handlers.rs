use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use nanoid::nanoid;
use serde::Deserialize;
use tracing::info;

use abi::errors::Error;
use abi::model::{Comment, Post};
use db::{PostContentUpdate, PostRepo};

use crate::api_utils::custom_extract::{JsonExtractor, SessionUser};
use crate::handlers::files::{delete_media_url, save_media_field, MediaKind, SavedMedia};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// text fields plus an optional attachment collected off a multipart body
#[derive(Debug, Default)]
struct PostForm {
    content: Option<String>,
    location: Option<String>,
    event: Option<String>,
    media: Option<SavedMedia>,
    remove_media: bool,
}

async fn read_post_form(state: &AppState, mut multipart: Multipart) -> Result<PostForm, Error> {
    let mut form = PostForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "content" => {
                form.content = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::bad_request(e.to_string()))?,
                )
            }
            "location" => {
                form.location = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::bad_request(e.to_string()))?,
                )
            }
            "event" => {
                form.event = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| Error::bad_request(e.to_string()))?,
                )
            }
            "remove_media" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::bad_request(e.to_string()))?;
                form.remove_media = value == "true" || value == "1";
            }
            "file" => {
                if form.media.is_some() {
                    return Err(Error::bad_request("a post carries at most one attachment"));
                }
                form.media = Some(save_media_field(state, field).await?);
            }
            other => {
                return Err(Error::bad_request(format!("unknown field {other}")));
            }
        }
    }
    Ok(form)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// stored content and media urls for a new post; a post carrying neither
/// text nor an attachment is rejected
fn new_post_fields(
    form: &PostForm,
) -> Result<(Option<String>, Option<String>, Option<String>), Error> {
    let content = non_empty(form.content.clone());
    let (image_url, video_url) = match &form.media {
        Some(media) if media.kind == MediaKind::Image => (Some(media.url.clone()), None),
        Some(media) => (None, Some(media.url.clone())),
        None => (None, None),
    };
    if content.is_none() && image_url.is_none() && video_url.is_none() {
        return Err(Error::bad_request("post needs text or an attachment"));
    }
    Ok((content, image_url, video_url))
}

pub async fn create_post(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Post>), Error> {
    let form = read_post_form(&state, multipart).await?;
    let (content, image_url, video_url) = new_post_fields(&form)?;

    let now = chrono::Utc::now().timestamp_millis();
    let post = Post {
        id: nanoid!(),
        user_id: caller.id.clone(),
        content,
        image_url,
        video_url,
        location: non_empty(form.location),
        event: non_empty(form.event),
        likes: vec![],
        comments: vec![],
        create_time: now,
        update_time: now,
    };
    let post = state.db.post.create(post).await?;
    info!("{} created post {}", caller.id, post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn timeline(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
) -> Result<Json<Vec<Post>>, Error> {
    let posts = state.db.post.list_timeline().await?;
    Ok(Json(posts))
}

pub async fn user_posts(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Post>>, Error> {
    let posts = state.db.post.list_by_user(&user_id).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    SessionUser(_caller): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, Error> {
    let post = state
        .db
        .post
        .get_by_id(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    Ok(Json(post))
}

/// owner-only edit; fields absent from the form keep their stored values,
/// a new attachment replaces the old one and `remove_media` drops it
pub async fn update_post(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Post>, Error> {
    let current = state
        .db
        .post
        .get_by_id(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    if current.user_id != caller.id {
        return Err(Error::forbidden("only the author may edit a post"));
    }

    let form = read_post_form(&state, multipart).await?;
    let superseded = if form.media.is_some() || form.remove_media {
        current.media_url().map(str::to_string)
    } else {
        None
    };

    let (image_url, video_url) = match &form.media {
        Some(media) if media.kind == MediaKind::Image => (Some(media.url.clone()), None),
        Some(media) => (None, Some(media.url.clone())),
        None if form.remove_media => (None, None),
        None => (current.image_url.clone(), current.video_url.clone()),
    };
    let update = PostContentUpdate {
        content: non_empty(form.content).or(current.content),
        image_url,
        video_url,
        location: non_empty(form.location).or(current.location),
        event: non_empty(form.event).or(current.event),
    };
    if update.content.is_none() && update.image_url.is_none() && update.video_url.is_none() {
        return Err(Error::bad_request("post needs text or an attachment"));
    }

    let post = state
        .db
        .post
        .update_content(&id, update)
        .await?
        .ok_or_else(Error::not_found)?;
    if let Some(url) = superseded {
        delete_media_url(&state, &url).await;
    }
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(id): Path<String>,
) -> Result<(), Error> {
    let current = state
        .db
        .post
        .get_by_id(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    if current.user_id != caller.id && !caller.is_admin() {
        return Err(Error::forbidden("only the author may delete a post"));
    }

    let deleted = state
        .db
        .post
        .delete(&id)
        .await?
        .ok_or_else(Error::not_found)?;
    if let Some(url) = deleted.media_url() {
        delete_media_url(&state, url).await;
    }
    info!("{} deleted post {}", caller.id, id);
    Ok(())
}

pub async fn like_toggle(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, Error> {
    let post = state
        .db
        .post
        .toggle_like(&id, &caller.id)
        .await?
        .ok_or_else(Error::not_found)?;
    Ok(Json(post))
}

pub async fn add_comment(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    Path(id): Path<String>,
    JsonExtractor(req): JsonExtractor<CommentRequest>,
) -> Result<Json<Post>, Error> {
    if req.content.trim().is_empty() {
        return Err(Error::bad_request("comment cannot be empty"));
    }
    let comment = Comment {
        id: nanoid!(),
        user_id: caller.id.clone(),
        content: req.content,
        create_time: chrono::Utc::now().timestamp_millis(),
    };
    let post = state
        .db
        .post
        .add_comment(&id, comment)
        .await?
        .ok_or_else(Error::not_found)?;
    Ok(Json(post))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_blank_values() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("hi".to_string())), Some("hi".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn empty_post_is_rejected() {
        let err = new_post_fields(&PostForm::default()).unwrap_err();
        assert!(matches!(err.kind(), abi::errors::ErrorKind::BadRequest));

        // whitespace-only text counts as empty
        let form = PostForm {
            content: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(new_post_fields(&form).is_err());
    }

    #[test]
    fn content_only_post_has_no_media_urls() {
        let form = PostForm {
            content: Some("hello".to_string()),
            ..Default::default()
        };
        let (content, image_url, video_url) = new_post_fields(&form).unwrap();
        assert_eq!(content.as_deref(), Some("hello"));
        assert!(image_url.is_none());
        assert!(video_url.is_none());
    }

    #[test]
    fn attachment_only_post_is_accepted() {
        let form = PostForm {
            media: Some(SavedMedia {
                filename: "k.png".to_string(),
                url: "/uploads/k.png".to_string(),
                kind: MediaKind::Image,
            }),
            ..Default::default()
        };
        let (content, image_url, video_url) = new_post_fields(&form).unwrap();
        assert!(content.is_none());
        assert_eq!(image_url.as_deref(), Some("/uploads/k.png"));
        assert!(video_url.is_none());
    }
}
