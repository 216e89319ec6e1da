// db config
// server config

use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub oss: OssConfig,
    pub presence: PresenceConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_cookie_name() -> String {
    String::from("session")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbConfig {
    pub mongodb: MongoDbConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MongoDbConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OssConfig {
    /// directory media blobs are written to
    pub upload_dir: String,
    /// public url prefix files are served from
    #[serde(default = "default_upload_url")]
    pub public_path: String,
}

fn default_upload_url() -> String {
    String::from("/uploads")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresenceConfig {
    /// set to false to run without the external chat provider
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_presence_timeout")]
    pub timeout: u64,
}

fn default_presence_timeout() -> u64 {
    3000
}

/// bootstrap admin account, created once if no admin exists
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Config {
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(filename).map_err(|_| Error::config_read())?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        // secrets may come from the environment instead of the config file
        if let Ok(secret) = env::var("JWT_SECRET") {
            config.server.jwt_secret = secret;
        }
        if let Ok(secret) = env::var("PRESENCE_SECRET") {
            config.presence.api_secret = secret;
        }
        Ok(config)
    }
}

impl MongoDbConfig {
    pub fn server_url(&self) -> String {
        match (self.user.is_empty(), self.password.is_empty()) {
            (true, _) => format!("mongodb://{}:{}", self.host, self.port),
            (false, true) => format!("mongodb://{}@{}:{}", self.user, self.host, self.port),
            (false, false) => format!(
                "mongodb://{}:{}@{}:{}",
                self.user, self.password, self.host, self.port
            ),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url(), self.database)
    }
}

impl ServerConfig {
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        let config = Config::load("./fixtures/app.yml").unwrap();
        assert_eq!(config.db.mongodb.host, "localhost");
        assert_eq!(config.db.mongodb.port, 27017);
        assert_eq!(config.server.port, 50000);
        assert_eq!(config.server.cookie_name, "session");
        assert_eq!(config.oss.public_path, "/uploads");
    }

    #[test]
    fn mongodb_url_without_credentials() {
        let config = Config::load("./fixtures/app.yml").unwrap();
        assert_eq!(
            config.db.mongodb.url(),
            "mongodb://localhost:27017/social_dev"
        );
    }
}
