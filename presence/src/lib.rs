use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use abi::config::Config;
use abi::errors::Error;

mod http;

pub use http::HttpPresence;

/// chat identity kept by the external presence provider
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresenceUser {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

/// external chat-presence provider; called on approval, profile update,
/// onboarding completion and rejection. All callers treat failures as
/// best-effort: log and move on.
#[async_trait]
pub trait Presence: Debug + Send + Sync {
    async fn upsert_user(&self, user: PresenceUser) -> Result<(), Error>;

    async fn delete_user(&self, user_id: &str) -> Result<(), Error>;

    /// provider-scoped token the chat frontend authenticates with
    fn create_token(&self, user_id: &str) -> Result<String, Error>;
}

pub fn presence(config: &Config) -> Arc<dyn Presence> {
    if config.presence.enabled {
        Arc::new(HttpPresence::from_config(config))
    } else {
        Arc::new(NoopPresence)
    }
}

/// stand-in when no provider is configured (dev, tests)
#[derive(Debug, Clone, Copy)]
pub struct NoopPresence;

#[async_trait]
impl Presence for NoopPresence {
    async fn upsert_user(&self, _user: PresenceUser) -> Result<(), Error> {
        Ok(())
    }

    async fn delete_user(&self, _user_id: &str) -> Result<(), Error> {
        Ok(())
    }

    fn create_token(&self, user_id: &str) -> Result<String, Error> {
        Ok(format!("noop-token-{user_id}"))
    }
}
