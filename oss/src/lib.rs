use abi::config::Config;
use abi::errors::Error;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;

mod local;

pub use local::LocalStore;

/// media blob store; keys are caller-generated filenames, never paths
#[async_trait]
pub trait Oss: Debug + Send + Sync {
    async fn file_exists(&self, key: &str) -> Result<bool, Error>;
    async fn upload_file(&self, key: &str, content: Vec<u8>) -> Result<(), Error>;
    async fn download_file(&self, key: &str) -> Result<Bytes, Error>;
    async fn delete_file(&self, key: &str) -> Result<(), Error>;

    /// every stored key, used by the orphan sweep
    async fn list_files(&self) -> Result<Vec<String>, Error>;
}

pub async fn oss(config: &Config) -> Result<Arc<dyn Oss>, Error> {
    Ok(Arc::new(LocalStore::new(&config.oss.upload_dir).await?))
}
