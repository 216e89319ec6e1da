use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use tracing::debug;

use abi::config::Config;
use abi::errors::Error;

use crate::{Presence, PresenceUser};

/// provider options
pub struct PresenceOptions {
    pub endpoint: String,
    pub api_key: String,
    pub api_secret: String,
    pub timeout: u64,
}

impl PresenceOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.presence.endpoint.clone(),
            api_key: config.presence.api_key.clone(),
            api_secret: config.presence.api_secret.clone(),
            timeout: config.presence.timeout,
        }
    }
}

#[derive(Debug)]
pub struct HttpPresence {
    options: PresenceOptions,
    client: reqwest::Client,
}

impl std::fmt::Debug for PresenceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the secret
        f.debug_struct("PresenceOptions")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpPresence {
    pub fn from_config(config: &Config) -> Self {
        let options = PresenceOptions::from_config(config);
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(options.timeout))
            .no_proxy()
            .build()
            .unwrap();
        Self { options, client }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.options.endpoint, path)
    }
}

#[derive(Serialize)]
struct TokenClaims {
    sub: String,
    iat: i64,
}

#[async_trait]
impl Presence for HttpPresence {
    async fn upsert_user(&self, user: PresenceUser) -> Result<(), Error> {
        let url = self.api_url("users");
        debug!("upsert presence user {} to {url}", user.id);
        let response = self
            .client
            .put(&url)
            .header("x-api-key", &self.options.api_key)
            .json(&user)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::internal_with_details(
                response.text().await.unwrap_or_default(),
            ));
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("users/{user_id}"));
        let response = self
            .client
            .delete(&url)
            .header("x-api-key", &self.options.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::internal_with_details(
                response.text().await.unwrap_or_default(),
            ));
        }
        Ok(())
    }

    fn create_token(&self, user_id: &str) -> Result<String, Error> {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: chrono::Utc::now().timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.options.api_secret.as_bytes()),
        )
        .map_err(Error::internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> HttpPresence {
        let options = PresenceOptions {
            endpoint: "http://localhost:3030".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            timeout: 1000,
        };
        HttpPresence {
            options,
            client: reqwest::Client::new(),
        }
    }

    #[test]
    fn token_is_signed_with_provider_secret() {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

        let token = provider().create_token("u1").unwrap();

        #[derive(serde::Deserialize)]
        struct Claims {
            sub: String,
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.sub, "u1");
    }

    #[test]
    fn debug_output_hides_secret() {
        let text = format!("{:?}", provider());
        assert!(!text.contains("secret"));
    }
}
