mod story_handlers;

pub use story_handlers::*;
