//! Hostel Desk Core Library
//!
//! Shared functionality for Hostel Desk components:
//! - Chat assistant: intent classification, canned replies, feedback analytics
//! - Hostel records and their validation
//! - Resource usage analysis
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod assistant;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod records;
pub mod resources;
pub mod role;
pub mod route;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use role::Role;
pub use route::Route;
