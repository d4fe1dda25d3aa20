//! # DueTask Worker Library
//!
//! The daily due-tomorrow notification job and the push transports it uses.
//!
//! ## Modules
//!
//! - `config`: Environment configuration for push delivery and the schedule
//! - `push`: Push delivery trait, Web Push and recording implementations
//! - `scheduler`: Daily scan with an explicit start/stop lifecycle
//!
//! ## Example
//!
//! ```no_run
//! use duetask_worker::push::{PushDelivery, RecordingDelivery};
//!
//! # async fn example() {
//! let delivery = RecordingDelivery::new();
//! println!("Delivery: {}", delivery.name());
//! # }
//! ```

pub mod config;
pub mod push;
pub mod scheduler;
