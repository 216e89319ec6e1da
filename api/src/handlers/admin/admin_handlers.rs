use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use abi::errors::Error;
use abi::model::{ApprovalStatus, User, UserRole};
use db::UserRepo;
use presence::Presence;

use crate::api_utils::custom_extract::{AdminUser, JsonExtractor};
use crate::handlers::users::to_presence_user;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub user_id: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub user_id: String,
}

pub async fn pending_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<User>>, Error> {
    let users = state.db.user.list_pending().await?;
    Ok(Json(users))
}

/// pending -> approved: activate the account, assign the role, register the
/// chat identity. The presence call is best effort on both transitions.
pub async fn approve(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonExtractor(req): JsonExtractor<ApproveRequest>,
) -> Result<Json<User>, Error> {
    if !req.role.assignable() {
        return Err(Error::bad_request(format!(
            "role {} cannot be assigned",
            req.role
        )));
    }

    let Some(user) = state.db.user.approve(&req.user_id, req.role).await? else {
        // nothing pending under that id: distinguish missing from already processed
        return match state.db.user.get_user_by_id(&req.user_id).await? {
            Some(_) => Err(Error::already_processed("user is not pending")),
            None => Err(Error::not_found()),
        };
    };

    info!("{} approved {} as {}", admin.id, user.id, user.role);
    if let Err(e) = state.presence.upsert_user(to_presence_user(&user)).await {
        error!("presence upsert failed for {}: {:?}", user.id, e);
    }
    Ok(Json(user))
}

/// pending -> rejected: the record is deleted permanently
pub async fn reject(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonExtractor(req): JsonExtractor<RejectRequest>,
) -> Result<(), Error> {
    let user = state
        .db
        .user
        .get_user_by_id(&req.user_id)
        .await?
        .ok_or_else(Error::not_found)?;
    if user.approval_status != ApprovalStatus::Pending {
        return Err(Error::already_processed("user is not pending"));
    }

    state.db.user.delete_user(&req.user_id).await?;
    info!("{} rejected {}", admin.id, req.user_id);

    if let Err(e) = state.presence.delete_user(&req.user_id).await {
        error!("presence delete failed for {}: {:?}", req.user_id, e);
    }
    Ok(())
}
