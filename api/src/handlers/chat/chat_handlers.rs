use axum::extract::State;
use axum::Json;
use serde::Serialize;

use abi::errors::Error;
use presence::Presence;

use crate::api_utils::custom_extract::SessionUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// mint a provider token the client uses to open its chat connection
pub async fn get_token(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
) -> Result<Json<TokenResponse>, Error> {
    let token = state.presence.create_token(&caller.id)?;
    Ok(Json(TokenResponse { token }))
}
