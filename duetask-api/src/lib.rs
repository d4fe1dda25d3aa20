//! # DueTask API Server Library
//!
//! HTTP surface for DueTask: account sign-up and login, the per-user to-do
//! list, and capture of browser push subscriptions.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookies`: Cookie parsing and `Set-Cookie` values
//! - `error`: Error handling and HTTP response mapping
//! - `flash`: One-shot flash messages
//! - `middleware`: Security headers and session handling
//! - `routes`: Route handlers
//! - `views`: HTML pages

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod routes;
pub mod views;
