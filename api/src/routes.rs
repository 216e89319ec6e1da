use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::admin::{approve, pending_users, reject};
use crate::handlers::chat::get_token;
use crate::handlers::files::get_file_by_name;
use crate::handlers::friends::{
    accept_request, friends_list, pending_requests, recommended, send_request,
};
use crate::handlers::posts::{
    add_comment, create_post, delete_post, get_post, like_toggle, timeline, update_post,
    user_posts,
};
use crate::handlers::projects::{
    add_note, create_project, create_task, get_project, list_notes, list_projects, list_tasks,
};
use crate::handlers::stories::{
    active_stories, create_story, delete_story, story_viewers, user_stories, view_story,
};
use crate::handlers::users::{
    complete_onboarding, get_user_by_id, login, logout, me, signup, update_profile,
};
use crate::AppState;

const MAX_FILE_UPLOAD_SIZE: usize = 1024 * 1024 * 50;

pub(crate) fn app_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/users", user_routes(state.clone()))
        .nest("/api/posts", post_routes(state.clone()))
        .nest("/api/stories", story_routes(state.clone()))
        .nest("/api/admin", admin_routes(state.clone()))
        .nest("/api/projects", project_routes(state.clone()))
        .nest("/api/chat", chat_routes(state.clone()))
        .route("/uploads/:filename", get(get_file_by_name).with_state(state))
}

fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/onboarding", post(complete_onboarding))
        .route("/friend-request", post(send_request))
        .route("/friend-request/accept", post(accept_request))
        .route("/friend-request/pending", get(pending_requests))
        .route("/friends", get(friends_list))
        .route("/recommended", get(recommended))
        .route("/:id", get(get_user_by_id))
        .with_state(state)
}

fn post_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(create_post)
                .get(timeline)
                .layer(DefaultBodyLimit::max(MAX_FILE_UPLOAD_SIZE)),
        )
        .route("/user/:user_id", get(user_posts))
        .route(
            "/:id",
            get(get_post)
                .put(update_post)
                .delete(delete_post)
                .layer(DefaultBodyLimit::max(MAX_FILE_UPLOAD_SIZE)),
        )
        .route("/:id/like", post(like_toggle))
        .route("/:id/comment", post(add_comment))
        .with_state(state)
}

fn story_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(create_story)
                .get(active_stories)
                .layer(DefaultBodyLimit::max(MAX_FILE_UPLOAD_SIZE)),
        )
        .route("/user/:user_id", get(user_stories))
        .route("/:id/view", post(view_story))
        .route("/:id/viewers", get(story_viewers))
        .route("/:id", delete(delete_story))
        .with_state(state)
}

fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/pending", get(pending_users))
        .route("/approve", post(approve))
        .route("/reject", post(reject))
        .with_state(state)
}

fn project_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route("/:id", get(get_project))
        .route("/:id/notes", post(add_note).get(list_notes))
        .route("/:id/tasks", post(create_task).get(list_tasks))
        .with_state(state)
}

fn chat_routes(state: AppState) -> Router {
    Router::new().route("/token", get(get_token)).with_state(state)
}
