use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::{async_trait, extract::MatchedPath, RequestPartsExt};
use cookie::Cookie;
use jsonwebtoken::{decode, DecodingKey, Validation};

use abi::errors::Error;
use abi::model::User;
use db::UserRepo;

use crate::handlers::users::Claims;
use crate::AppState;

/// authenticated caller: session cookie present, token valid, user still exists
pub struct SessionUser(pub User);

/// authenticated caller holding the admin role
pub struct AdminUser(pub User);

fn session_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == cookie_name)
        .map(|cookie| cookie.value().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts
            .extract::<MatchedPath>()
            .await
            .map(|path| path.as_str().to_owned())
            .unwrap_or_default();
        let app_state = AppState::from_ref(state);

        let token = session_token(parts, &app_state.cookie_name)
            .ok_or_else(|| Error::unauthorized_with_details(format!("no session, path: {path}")))?;

        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| Error::unauthorized(err, format!("invalid session, path: {path}")))?;

        // the user may have been rejected/deleted since the token was issued
        let user = app_state
            .db
            .user
            .get_user_by_id(&claims.claims.sub)
            .await?
            .ok_or_else(|| Error::unauthorized_with_details("session user no longer exists"))?;

        Ok(SessionUser(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionUser(user) = SessionUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(Error::forbidden("admin role required"));
        }
        Ok(AdminUser(user))
    }
}
