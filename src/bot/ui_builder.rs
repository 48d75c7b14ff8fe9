//! UI Builder module for rendering outbound actions into Telegram calls

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::controller::{MenuButton, Outbound};

/// Build an inline keyboard from controller menu rows.
pub fn build_keyboard(rows: &[Vec<MenuButton>]) -> InlineKeyboardMarkup {
    let buttons = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    InlineKeyboardButton::callback(button.label.clone(), button.payload.clone())
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(buttons)
}

/// Perform one outbound action for a chat.
pub async fn send_outbound(bot: &Bot, chat_id: ChatId, outbound: &Outbound) -> Result<()> {
    match outbound {
        Outbound::Text(text) => {
            bot.send_message(chat_id, text).await?;
        }
        Outbound::Menu { text, rows } => {
            bot.send_message(chat_id, text)
                .reply_markup(build_keyboard(rows))
                .await?;
        }
    }
    Ok(())
}

/// Perform every outbound action in order.
pub async fn send_all(bot: &Bot, chat_id: ChatId, outbounds: &[Outbound]) -> Result<()> {
    for outbound in outbounds {
        send_outbound(bot, chat_id, outbound).await?;
    }
    Ok(())
}
