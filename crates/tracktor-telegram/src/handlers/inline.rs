use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{
        InlineQuery, InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
        InputMessageContentText, ParseMode,
    },
};
use uuid::Uuid;

use tracktor_core::render;

use crate::{router::AppState, to_markup};

/// Inline search: the query text goes to the tracker, each topic row comes
/// back as one article with its Download / View topic / Back buttons.
pub async fn handle_inline_query(
    bot: Bot,
    q: InlineQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let query = q.query.trim();
    if query.is_empty() {
        let _ = bot
            .answer_inline_query(q.id, Vec::<InlineQueryResult>::new())
            .cache_time(0)
            .await;
        return Ok(());
    }

    let topics = match state.tracker.search(query).await {
        Ok(topics) => topics,
        Err(e) => {
            tracing::error!(%query, "tracker search failed: {e}");
            let _ = bot
                .answer_inline_query(q.id, Vec::<InlineQueryResult>::new())
                .cache_time(0)
                .await;
            return Ok(());
        }
    };

    let results: Vec<InlineQueryResult> = topics
        .iter()
        .map(|topic| {
            let card = render::inline_card(topic, query, &state.cfg.forum_url);
            let content = InputMessageContent::Text(
                InputMessageContentText::new(card.body_html).parse_mode(ParseMode::Html),
            );
            InlineQueryResult::Article(
                InlineQueryResultArticle::new(Uuid::new_v4().to_string(), card.title, content)
                    .description(card.description)
                    .hide_url(true)
                    .reply_markup(to_markup(&card.keyboard)),
            )
        })
        .collect();

    tracing::info!(%query, results = results.len(), "answering inline query");

    // Results reflect live tracker state; never let Telegram cache them.
    if let Err(e) = bot
        .answer_inline_query(q.id, results)
        .cache_time(0)
        .is_personal(false)
        .await
    {
        tracing::warn!(%query, "failed to answer inline query: {e}");
    }

    Ok(())
}
