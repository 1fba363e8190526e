use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::{router::AppState, to_markup};

/// Plain text messages: a pasted forum topic link gets a "ready to start"
/// reply with a Start button. Anything else is ignored.
pub async fn handle_text(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(topic_id) = topic_id_from_link(text) else {
        return Ok(());
    };

    let ready = {
        let _guard = state.topic_locks.lock_topic(&topic_id).await;
        state.lifecycle.ready(&topic_id).await
    };

    match ready {
        Ok((line, keyboard)) => {
            if let Err(e) = bot
                .send_message(msg.chat.id, line)
                .reply_markup(to_markup(&keyboard))
                .reply_to_message_id(msg.id)
                .await
            {
                tracing::error!(%topic_id, "failed to reply to topic link: {e}");
            }
        }
        Err(e) => {
            tracing::error!(%topic_id, "failed to prepare topic from link: {e}");
        }
    }

    Ok(())
}

/// Extract the topic id from a forum link's `t` query parameter.
fn topic_id_from_link(text: &str) -> Option<String> {
    let url = url::Url::parse(text.trim()).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "t")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_topic_id_from_viewtopic_link() {
        assert_eq!(
            topic_id_from_link("https://forum.example/forum/viewtopic.php?t=6330130"),
            Some("6330130".to_string())
        );
    }

    #[test]
    fn tolerates_extra_query_parameters() {
        assert_eq!(
            topic_id_from_link("https://forum.example/viewtopic.php?start=0&t=42"),
            Some("42".to_string())
        );
    }

    #[test]
    fn ignores_non_links_and_links_without_topic() {
        assert_eq!(topic_id_from_link("hello there"), None);
        assert_eq!(topic_id_from_link("https://forum.example/index.php"), None);
        assert_eq!(topic_id_from_link("https://forum.example/viewtopic.php?t="), None);
    }
}
