mod friend_handlers;

pub use friend_handlers::*;
