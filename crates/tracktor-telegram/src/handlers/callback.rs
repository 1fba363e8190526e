use std::sync::Arc;

use teloxide::{prelude::*, types::CallbackQuery};

use tracktor_core::{
    action::ActionToken,
    lifecycle::ActionOutcome,
};

use crate::{router::AppState, to_markup};

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let data = q.data.clone().unwrap_or_default();

    let Some(token) = ActionToken::parse(&data) else {
        tracing::warn!(%data, "unrecognized callback data, dropping");
        let _ = bot.answer_callback_query(q.id).await;
        return Ok(());
    };

    // Callbacks from inline-posted messages carry no message; fall back to
    // the private chat with the pressing user.
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat.id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    let reply = {
        let _guard = state.topic_locks.lock_topic(&token.topic_id).await;
        state.lifecycle.handle(&token).await
    };

    let reply = match reply {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(token = %token, "action failed: {e}");
            let _ = bot.answer_callback_query(q.id).await;
            return Ok(());
        }
    };

    // Silent means exactly that: no ack toast either.
    if matches!(reply.outcome, ActionOutcome::Silent) {
        return Ok(());
    }

    let mut answer = bot.answer_callback_query(q.id);
    if let Some(ack) = reply.ack {
        answer = answer.text(ack);
    }
    if let Err(e) = answer.await {
        tracing::warn!(token = %token, "failed to answer callback: {e}");
    }

    match reply.outcome {
        ActionOutcome::Post { text, keyboard } => {
            if let Err(e) = bot
                .send_message(chat_id, text)
                .reply_markup(to_markup(&keyboard))
                .await
            {
                tracing::error!(token = %token, "failed to post status message: {e}");
            }
        }
        ActionOutcome::Edit { text, keyboard } => {
            let Some(msg) = q.message.as_ref() else {
                tracing::warn!(token = %token, "edit outcome without a source message, dropping");
                return Ok(());
            };
            if let Err(e) = bot
                .edit_message_text(msg.chat.id, msg.id, text)
                .reply_markup(to_markup(&keyboard))
                .await
            {
                tracing::error!(token = %token, "failed to edit status message: {e}");
            }
        }
        ActionOutcome::Silent => unreachable!("handled above"),
    }

    Ok(())
}
