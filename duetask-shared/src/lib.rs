//! # DueTask Shared Library
//!
//! Types, storage and business logic shared by the DueTask API server and the
//! notification worker.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, signed session tokens, ownership checks
//! - `db`: Connection pool and embedded migrations
//! - `models`: Users, to-dos and push subscriptions
//! - `services`: Account and to-do operations scoped to the calling user

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the DueTask shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
