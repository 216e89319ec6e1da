use cookie::{Cookie, SameSite};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use abi::errors::Error;

mod user_handlers;

pub use user_handlers::*;

/// sessions last seven days
pub const SESSION_EXPIRES: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub,
            exp: now + SESSION_EXPIRES,
            iat: now,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn gen_token(jwt_secret: &str, user_id: &str) -> Result<String, Error> {
    let claims = Claims::new(user_id.to_string());
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(Error::internal)
}

/// httpOnly session cookie carrying the signed token
pub fn session_cookie(name: &str, token: &str) -> String {
    Cookie::build((name.to_string(), token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(cookie::time::Duration::seconds(SESSION_EXPIRES))
        .build()
        .to_string()
}

/// expired cookie, clears the session unconditionally
pub fn clear_session_cookie(name: &str) -> String {
    Cookie::build((name.to_string(), String::new()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn token_round_trip() {
        let token = gen_token("test-secret", "u1").unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "u1");
        assert_eq!(data.claims.exp - data.claims.iat, SESSION_EXPIRES);
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let token = gen_token("test-secret", "u1").unwrap();
        assert!(decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        )
        .is_err());
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("session", "tok");
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("session=tok"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie("session");
        assert!(cookie.contains("Max-Age=0"));
    }
}
