use crate::Oss;
use abi::errors::Error;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

/// blob store backed by a local directory; files are flat, one per key
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        // keys are plain filenames; reject anything that could escape the root
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(Error::oss(format!("invalid blob key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl Oss for LocalStore {
    async fn file_exists(&self, key: &str) -> Result<bool, Error> {
        let path = self.path_for(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn upload_file(&self, key: &str, content: Vec<u8>) -> Result<(), Error> {
        let path = self.path_for(key)?;
        fs::write(&path, content).await?;
        Ok(())
    }

    async fn download_file(&self, key: &str) -> Result<Bytes, Error> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found_with_details(format!("no blob {key}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_file(&self, key: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // deleting a missing blob is not an error, the sweep may have won
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_files(&self) -> Result<Vec<String>, Error> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.push(name.to_string());
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("oss_test_{}", nanoid::nanoid!()));
        LocalStore::new(&dir).await.unwrap()
    }

    #[tokio::test]
    async fn upload_download_delete() {
        let store = store().await;
        store.upload_file("a.png", b"data".to_vec()).await.unwrap();
        assert!(store.file_exists("a.png").await.unwrap());
        let data = store.download_file("a.png").await.unwrap();
        assert_eq!(&data[..], b"data");

        store.delete_file("a.png").await.unwrap();
        assert!(!store.file_exists("a.png").await.unwrap());
        // delete is idempotent
        store.delete_file("a.png").await.unwrap();
    }

    #[tokio::test]
    async fn download_missing_is_not_found() {
        let store = store().await;
        let err = store.download_file("missing.png").await.unwrap_err();
        assert!(matches!(err.kind(), abi::errors::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn rejects_path_traversal_keys() {
        let store = store().await;
        assert!(store.download_file("../etc/passwd").await.is_err());
        assert!(store.upload_file("a/b.png", vec![]).await.is_err());
    }

    #[tokio::test]
    async fn lists_stored_keys() {
        let store = store().await;
        store.upload_file("one.png", vec![1]).await.unwrap();
        store.upload_file("two.mp4", vec![2]).await.unwrap();
        let mut keys = store.list_files().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["one.png", "two.mp4"]);
    }
}
