//! Telegram adapter (teloxide).
//!
//! Translates the core's transport-agnostic keyboards and action outcomes
//! into Telegram Bot API calls. All bot-facing failures are logged and
//! swallowed here; nothing in this crate propagates errors back to Telegram.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use tracktor_core::keyboard::{Button, ButtonKind, Keyboard};

pub mod handlers;
pub mod router;

pub fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        keyboard
            .rows
            .iter()
            .map(|row| row.iter().filter_map(to_button).collect::<Vec<_>>()),
    )
}

fn to_button(button: &Button) -> Option<InlineKeyboardButton> {
    match &button.kind {
        ButtonKind::Callback(data) => Some(InlineKeyboardButton::callback(
            button.label.as_str(),
            data.as_str(),
        )),
        ButtonKind::Url(raw) => match url::Url::parse(raw) {
            Ok(url) => Some(InlineKeyboardButton::url(button.label.as_str(), url)),
            Err(e) => {
                tracing::warn!(url = %raw, "dropping button with unparseable url: {e}");
                None
            }
        },
        ButtonKind::SwitchInlineCurrentChat(query) => {
            Some(InlineKeyboardButton::switch_inline_query_current_chat(
                button.label.as_str(),
                query.as_str(),
            ))
        }
    }
}
