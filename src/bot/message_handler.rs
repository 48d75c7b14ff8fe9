//! Message Handler module for processing incoming Telegram messages

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::{debug, error};

use crate::controller::{Command, Controller, Event};
use crate::messages;

use super::ui_builder::send_all;

/// Download a Telegram file's raw bytes via the file-proxy URL.
pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    text: &str,
    controller: Arc<Controller>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    let event = match Command::parse(text) {
        Some(Command::Start) => Event::Start,
        Some(Command::Reference(body)) => Event::ReferenceUpdate { body },
        None => Event::PlainText,
    };

    let outbounds = controller.handle_event(msg.chat.id, event).await;
    send_all(bot, msg.chat.id, &outbounds).await
}

async fn handle_photo_message(bot: &Bot, msg: &Message, controller: Arc<Controller>) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received photo message from user");

    let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) else {
        return Ok(());
    };

    let image = match download_file(bot, largest_photo.file.id.clone()).await {
        Ok(bytes) => {
            debug!(user_id = %msg.chat.id, image_bytes = bytes.len(), "Photo downloaded successfully");
            bytes
        }
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to download photo");
            bot.send_message(msg.chat.id, messages::PROCESSING_FAILED)
                .await?;
            return Ok(());
        }
    };

    let outbounds = controller
        .handle_event(msg.chat.id, Event::PhotoUploaded { image })
        .await;
    send_all(bot, msg.chat.id, &outbounds).await
}

async fn handle_unsupported_message(
    bot: &Bot,
    msg: &Message,
    controller: Arc<Controller>,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");
    let outbounds = controller.handle_event(msg.chat.id, Event::PlainText).await;
    send_all(bot, msg.chat.id, &outbounds).await
}

pub async fn message_handler(bot: Bot, msg: Message, controller: Arc<Controller>) -> Result<()> {
    if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, text, controller).await?;
    } else if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, controller).await?;
    } else {
        handle_unsupported_message(&bot, &msg, controller).await?;
    }

    Ok(())
}
