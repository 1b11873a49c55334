//! Hostel Desk CLI Library
//!
//! Terminal front end for the hostel services: record commands, one-shot
//! questions, and a full-screen chat with the assistant (ratatui).

pub mod app;
pub mod auth_cmd;
pub mod chat_cmd;
pub mod context;
pub mod fmt;
pub mod records_cmd;
pub mod session_file;
pub mod tui;
pub mod ui;
