mod friend;
mod post;
mod project;
mod story;
mod user;
mod utils;

pub(crate) use friend::MongoFriendRequest;
pub(crate) use post::MongoPost;
pub(crate) use project::MongoProject;
pub(crate) use story::MongoStory;
pub(crate) use user::MongoUser;
