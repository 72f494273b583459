//! Application services layer.

pub mod error;
pub mod loader;
pub mod movies;
pub mod pagination;
pub mod posters;
pub mod repos;
pub mod reviews;
pub mod trailers;
