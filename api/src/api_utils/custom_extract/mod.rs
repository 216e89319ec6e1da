mod auth;
mod json_extractor;

pub(crate) use auth::{AdminUser, SessionUser};
pub(crate) use json_extractor::JsonExtractor;
