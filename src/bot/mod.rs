//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Handles incoming text and photo messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Renders controller outbound actions into Telegram calls

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

// Re-export utility functions that might be used elsewhere
pub use message_handler::download_file;
pub use ui_builder::{build_keyboard, send_outbound};
