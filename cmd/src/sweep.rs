use std::collections::HashSet;

use chrono::Utc;
use tracing::info;

use abi::config::Config;
use abi::errors::Error;
use db::{DbRepo, PostRepo, StoryRepo, UserRepo};
use oss::Oss;

/// delete uploaded blobs that no post, story or avatar references.
/// Expired stories are removed by the store, so their blobs end up here.
pub async fn run(config: &Config) -> Result<(), Error> {
    let db = DbRepo::new(config).await?;
    let oss = oss::oss(config).await?;

    let referenced = referenced_keys(config, &db).await?;
    let stored = oss.list_files().await?;

    let mut deleted = 0usize;
    for key in &stored {
        if !referenced.contains(key.as_str()) {
            oss.delete_file(key).await?;
            deleted += 1;
        }
    }
    info!(
        "sweep done: {} blobs stored, {} referenced, {} deleted",
        stored.len(),
        referenced.len(),
        deleted
    );
    Ok(())
}

async fn referenced_keys(config: &Config, db: &DbRepo) -> Result<HashSet<String>, Error> {
    let mut keys = HashSet::new();
    let public_path = &config.oss.public_path;

    for post in db.post.list_timeline().await? {
        if let Some(url) = post.media_url() {
            insert_key(&mut keys, url, public_path);
        }
    }
    for story in db.story.list_active(Utc::now()).await? {
        if let Some(url) = story.media_url() {
            insert_key(&mut keys, url, public_path);
        }
    }

    // every user counts, whatever their lifecycle state
    for user in db.user.list_all().await? {
        if let Some(url) = &user.avatar {
            insert_key(&mut keys, url, public_path);
        }
    }
    Ok(keys)
}

fn insert_key(keys: &mut HashSet<String>, url: &str, public_path: &str) {
    if let Some(key) = url
        .strip_prefix(public_path)
        .map(|rest| rest.trim_start_matches('/'))
        .filter(|key| !key.is_empty())
    {
        keys.insert(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_extraction_strips_public_prefix() {
        let mut keys = HashSet::new();
        insert_key(&mut keys, "/uploads/abc.png", "/uploads");
        insert_key(&mut keys, "https://cdn.example.com/abc.png", "/uploads");
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("abc.png"));
    }
}
