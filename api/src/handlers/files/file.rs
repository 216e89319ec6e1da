use axum::extract::multipart::Field;
use axum::extract::{Path, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderMap, HeaderValue};
use nanoid::nanoid;
use tracing::error;

use abi::errors::Error;
use oss::Oss;

use crate::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Clone, Debug)]
pub struct SavedMedia {
    pub filename: String,
    pub url: String,
    pub kind: MediaKind,
}

pub fn media_kind(content_type: Option<&str>) -> Option<MediaKind> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => Some(MediaKind::Image),
        Some(ct) if ct.starts_with("video/") => Some(MediaKind::Video),
        _ => None,
    }
}

/// strip the public prefix from a stored media url, yielding the blob key
pub fn filename_from_url<'a>(url: &'a str, public_path: &str) -> Option<&'a str> {
    url.strip_prefix(public_path)
        .map(|rest| rest.trim_start_matches('/'))
        .filter(|name| !name.is_empty())
}

/// blob key for an upload: a fresh nanoid, keeping at most the extension of
/// whatever the client called the file. Client names are untrusted and may
/// contain separators or `..`, which the store rejects.
pub fn blob_key(file_name: Option<&str>) -> String {
    let id = nanoid!();
    let ext: String = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.chars().filter(char::is_ascii_alphanumeric).collect())
        .unwrap_or_default();
    if ext.is_empty() {
        id
    } else {
        format!("{id}.{ext}")
    }
}

/// store one multipart file field as a nanoid-keyed blob
pub async fn save_media_field(state: &AppState, field: Field<'_>) -> Result<SavedMedia, Error> {
    let kind = media_kind(field.content_type())
        .ok_or_else(|| Error::bad_request("attachment must be an image or a video"))?;

    let filename = blob_key(field.file_name());

    let data = field
        .bytes()
        .await
        .map_err(|e| Error::bad_request(e.to_string()))?;
    if data.is_empty() {
        return Err(Error::bad_request("attachment is empty"));
    }
    state.oss.upload_file(&filename, data.into()).await?;

    let url = format!("{}/{}", state.public_path.trim_end_matches('/'), filename);
    Ok(SavedMedia {
        filename,
        url,
        kind,
    })
}

/// best-effort blob removal for a stored media url; the sweep catches leftovers
pub async fn delete_media_url(state: &AppState, url: &str) {
    let Some(filename) = filename_from_url(url, &state.public_path) else {
        error!("media url has no blob key: {url}");
        return;
    };
    if let Err(e) = state.oss.delete_file(filename).await {
        error!("failed to delete blob {filename}: {:?}", e);
    }
}

pub async fn get_file_by_name(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<(HeaderMap, Vec<u8>), Error> {
    let bytes = state.oss.download_file(&filename).await?;
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("private, max-age=31536000"),
    );
    Ok((headers, bytes.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_from_content_type() {
        assert_eq!(media_kind(Some("image/png")), Some(MediaKind::Image));
        assert_eq!(media_kind(Some("video/mp4")), Some(MediaKind::Video));
        assert_eq!(media_kind(Some("application/pdf")), None);
        assert_eq!(media_kind(None), None);
    }

    #[test]
    fn blob_key_drops_untrusted_name_parts() {
        // `..`, separators and other junk must never reach the store
        let key = blob_key(Some("my..photo.png"));
        assert!(!key.contains(".."));
        assert!(key.ends_with(".png"));

        let key = blob_key(Some("../../etc/passwd"));
        assert!(!key.contains(".."));
        assert!(!key.contains('/'));

        let key = blob_key(Some("c:\\dir\\clip.mp4"));
        assert!(!key.contains('\\'));
        assert!(key.ends_with(".mp4"));

        assert!(!blob_key(None).contains('.'));
        assert!(!blob_key(Some("noext")).contains('.'));
    }

    #[test]
    fn filename_extraction() {
        assert_eq!(
            filename_from_url("/uploads/abc-cat.png", "/uploads"),
            Some("abc-cat.png")
        );
        assert_eq!(filename_from_url("/elsewhere/cat.png", "/uploads"), None);
        assert_eq!(filename_from_url("/uploads/", "/uploads"), None);
    }
}
