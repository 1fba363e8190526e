//! Telegram update handlers.
//!
//! Each handler is a thin adapter: decode the update, take the per-topic
//! lock where a daemon mutation may happen, call into `tracktor-core`, and
//! translate the reply back into bot API calls. Failures are logged and the
//! chat is left untouched.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, InlineQuery, Message},
};

use crate::router::AppState;

mod callback;
mod inline;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_inline_query(
    bot: Bot,
    q: InlineQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    inline::handle_inline_query(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if msg.text().is_some() {
        return text::handle_text(bot, msg, state).await;
    }
    Ok(())
}
