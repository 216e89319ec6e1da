pub(crate) mod admin;
pub(crate) mod chat;
pub(crate) mod files;
pub(crate) mod friends;
pub(crate) mod posts;
pub(crate) mod projects;
pub(crate) mod stories;
pub(crate) mod users;
