//! Marquee: a movie catalog backend.
//!
//! Layers follow the usual split: `domain` holds records and listing rules,
//! `application` holds services and repository traits, `infra` provides the
//! Postgres, HTTP and storage adapters, and `cache` provides listing caches.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
