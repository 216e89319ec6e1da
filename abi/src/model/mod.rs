mod friend_request;
mod post;
mod project;
mod story;
mod user;

pub use friend_request::*;
pub use post::*;
pub use project::*;
pub use story::*;
pub use user::*;
