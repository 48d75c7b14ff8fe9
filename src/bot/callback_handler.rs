//! Callback Handler module for processing inline keyboard callback queries

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::debug;

use crate::controller::{Controller, Event, Selection};

use super::ui_builder::send_all;

/// Handle a wizard button press. Unknown payloads are ignored; the query
/// is always answered to clear the client's loading state.
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    controller: Arc<Controller>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    if let Some(msg) = &q.message {
        let chat_id = msg.chat().id;
        match q.data.as_deref().and_then(Selection::parse) {
            Some(selection) => {
                let outbounds = controller
                    .handle_event(chat_id, Event::Selected(selection))
                    .await;
                send_all(&bot, chat_id, &outbounds).await?;
            }
            None => {
                debug!(user_id = %q.from.id, "Unknown callback payload ignored");
            }
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
