mod friend;
mod mongodb;
mod post;
mod project;
mod story;
mod user;

use ::mongodb::Client;

use abi::config::Config;
use abi::errors::Error;

pub use friend::FriendRequestRepo;
pub use post::{PostContentUpdate, PostRepo};
pub use project::ProjectRepo;
pub use story::StoryRepo;
pub use user::UserRepo;

/// bundle of every repository, built once at startup and shared via AppState
#[derive(Debug)]
pub struct DbRepo {
    pub user: Box<dyn UserRepo>,
    pub friend: Box<dyn FriendRequestRepo>,
    pub post: Box<dyn PostRepo>,
    pub story: Box<dyn StoryRepo>,
    pub project: Box<dyn ProjectRepo>,
}

impl DbRepo {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let db = Client::with_uri_str(config.db.mongodb.url())
            .await?
            .database(&config.db.mongodb.database);
        Self::from_database(db).await
    }

    /// build against an already-opened database (tests)
    pub async fn from_database(db: ::mongodb::Database) -> Result<Self, Error> {
        let user = Box::new(mongodb::MongoUser::new(db.clone()).await?);
        let friend = Box::new(mongodb::MongoFriendRequest::new(db.clone()));
        let post = Box::new(mongodb::MongoPost::new(db.clone()));
        let story = Box::new(mongodb::MongoStory::new(db.clone()).await?);
        let project = Box::new(mongodb::MongoProject::new(db).await?);

        Ok(Self {
            user,
            friend,
            post,
            story,
            project,
        })
    }
}
