//! TUI module for DocGenie
//!
//! Terminal user interface using Ratatui.

mod admin;
mod app;
mod backend;
mod chat;
mod debug_log;
mod help;
mod input;
pub mod log_capture;
mod login;
mod sidebar;
mod ui;

pub use app::run;
