//! # Bakecheck Telegram Bot
//!
//! A Telegram bot that judges pizza bake quality from a photo. After a
//! photo upload the user picks brand, item, and branch from inline
//! keyboards; the photo then goes to a vision-capable chat-completion API
//! for a two-line Persian verdict, augmented with the brand's baking
//! reference records (oven temperature / bake time).

pub mod bot;
pub mod catalog;
pub mod controller;
pub mod messages;
pub mod reference_parser;
pub mod reference_store;
pub mod session;
pub mod vision;
