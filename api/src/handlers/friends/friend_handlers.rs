use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use abi::errors::Error;
use abi::model::{FriendRequest, User};
use db::{FriendRequestRepo, UserRepo};

use crate::api_utils::custom_extract::{JsonExtractor, SessionUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub recipient_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    pub request_id: String,
}

pub async fn send_request(
    State(state): State<AppState>,
    SessionUser(sender): SessionUser,
    JsonExtractor(req): JsonExtractor<SendRequest>,
) -> Result<(StatusCode, Json<FriendRequest>), Error> {
    if sender.id == req.recipient_id {
        return Err(Error::bad_request("cannot send a friend request to yourself"));
    }
    let recipient = state
        .db
        .user
        .get_user_by_id(&req.recipient_id)
        .await?
        .ok_or_else(Error::not_found)?;
    if sender.is_friend_of(&recipient.id) {
        return Err(Error::conflict("already friends"));
    }
    if !recipient.can_act() {
        return Err(Error::bad_request("recipient cannot receive requests"));
    }
    // one request per unordered pair, whichever way it points
    if state
        .db
        .friend
        .get_between(&sender.id, &recipient.id)
        .await?
        .is_some()
    {
        return Err(Error::conflict("friend request already exists"));
    }

    let request = state.db.friend.create(&sender.id, &recipient.id).await?;
    info!("friend request {} -> {}", sender.id, recipient.id);
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn accept_request(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
    JsonExtractor(req): JsonExtractor<AcceptRequest>,
) -> Result<Json<FriendRequest>, Error> {
    let request = state
        .db
        .friend
        .get_by_id(&req.request_id)
        .await?
        .ok_or_else(Error::not_found)?;
    if request.recipient_id != caller.id {
        return Err(Error::forbidden("only the recipient may accept"));
    }

    let request = state
        .db
        .friend
        .accept(&req.request_id)
        .await?
        .ok_or_else(Error::not_found)?;

    // symmetric set-adds; retrying after a partial failure converges
    state
        .db
        .user
        .add_friend(&request.sender_id, &request.recipient_id)
        .await?;
    state
        .db
        .user
        .add_friend(&request.recipient_id, &request.sender_id)
        .await?;

    info!("{} and {} are now friends", request.sender_id, request.recipient_id);
    Ok(Json(request))
}

pub async fn pending_requests(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
) -> Result<Json<Vec<FriendRequest>>, Error> {
    let requests = state.db.friend.list_pending_incoming(&caller.id).await?;
    Ok(Json(requests))
}

pub async fn friends_list(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
) -> Result<Json<Vec<User>>, Error> {
    let friends = state.db.user.list_by_ids(&caller.friends).await?;
    Ok(Json(friends))
}

/// users the caller could befriend: everyone minus self, friends and
/// anyone with a request pending in either direction
pub async fn recommended(
    State(state): State<AppState>,
    SessionUser(caller): SessionUser,
) -> Result<Json<Vec<User>>, Error> {
    let pending = state.db.friend.list_pending_involving(&caller.id).await?;
    let exclude = exclusion_set(&caller, &pending);
    let users = state.db.user.list_active_excluding(&exclude).await?;
    Ok(Json(users))
}

fn exclusion_set(caller: &User, pending: &[FriendRequest]) -> Vec<String> {
    let mut exclude = Vec::with_capacity(caller.friends.len() + pending.len() + 1);
    exclude.push(caller.id.clone());
    exclude.extend(caller.friends.iter().cloned());
    for request in pending {
        let counterparty = request.counterparty(&caller.id).to_string();
        if !exclude.contains(&counterparty) {
            exclude.push(counterparty);
        }
    }
    exclude
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::model::FriendRequestStatus;

    fn request(id: &str, sender: &str, recipient: &str) -> FriendRequest {
        FriendRequest {
            id: id.to_string(),
            sender_id: sender.to_string(),
            recipient_id: recipient.to_string(),
            status: FriendRequestStatus::Pending,
            create_time: 0,
            accept_time: None,
        }
    }

    #[test]
    fn exclusion_set_unions_self_friends_and_counterparties() {
        let caller = User {
            id: "me".to_string(),
            friends: vec!["f1".to_string(), "f2".to_string()],
            ..Default::default()
        };
        let pending = vec![
            request("r1", "me", "out1"),
            request("r2", "in1", "me"),
            // counterparty already a friend, must not duplicate
            request("r3", "f1", "me"),
        ];
        let exclude = exclusion_set(&caller, &pending);
        assert_eq!(exclude, vec!["me", "f1", "f2", "out1", "in1"]);
    }
}
