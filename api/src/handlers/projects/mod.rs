mod project_handlers;

pub use project_handlers::*;
