//! Application services orchestrating domain records and repositories.

pub mod auth;
pub mod compose;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod repos;
