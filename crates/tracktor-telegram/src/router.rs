use std::{collections::HashMap, sync::Arc};

use teloxide::{
    dispatching::Dispatcher,
    dptree,
    prelude::*,
    update_listeners::webhooks,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use tracktor_core::{config::Config, lifecycle::LifecycleRouter, tracker::TrackerClient};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub tracker: Arc<TrackerClient>,
    pub lifecycle: Arc<LifecycleRouter>,
    pub topic_locks: Arc<TopicLocks>,
}

/// Per-topic single-flight locks.
///
/// Two taps on the same topic's buttons run one after the other, so the
/// descriptor is downloaded at most once and daemon calls do not interleave.
/// Different topics proceed in parallel.
#[derive(Default)]
pub struct TopicLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TopicLocks {
    pub async fn lock_topic(&self, topic_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(topic_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run(
    cfg: Arc<Config>,
    tracker: Arc<TrackerClient>,
    lifecycle: Arc<LifecycleRouter>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = me.username(), "bot started");
    }

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        tracker,
        lifecycle,
        topic_locks: Arc::new(TopicLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_inline_query().endpoint(handlers::handle_inline_query))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .build();

    match webhook_hostname(&cfg) {
        // Production: Telegram pushes updates over HTTPS to our hostname.
        Some(hostname) => {
            let addr = ([0, 0, 0, 0], cfg.webhook_port).into();
            let url = format!("https://{}/{}", hostname, cfg.bot_token)
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid webhook url: {e}"))?;
            tracing::info!(%hostname, port = cfg.webhook_port, "listening for webhook updates");

            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url))
                .await
                .map_err(|e| anyhow::anyhow!("failed to set webhook: {e}"))?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("webhook listener error"),
                )
                .await;
        }
        // Debug: long polling, no public hostname needed.
        None => {
            tracing::info!("long polling for updates");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}

/// Hostname to register a webhook for, or `None` to long-poll.
///
/// Debug runs always long-poll, even with a public hostname configured, so
/// a local run never steals the production bot's webhook registration.
fn webhook_hostname(cfg: &Config) -> Option<&str> {
    if cfg.debug {
        None
    } else {
        cfg.app_hostname.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(debug: bool, app_hostname: Option<&str>) -> Config {
        Config {
            bot_token: "token".to_string(),
            app_hostname: app_hostname.map(str::to_string),
            webhook_port: 8443,
            debug,
            forum_url: "https://forum.example".to_string(),
            bb_session: "session".to_string(),
            transmission_host: "localhost".to_string(),
            transmission_port: 9091,
            transmission_user: None,
            transmission_password: None,
            torrents_dir: PathBuf::from("torrents"),
        }
    }

    #[test]
    fn webhook_mode_needs_a_hostname_and_debug_off() {
        assert_eq!(
            webhook_hostname(&config(false, Some("bot.example"))),
            Some("bot.example")
        );
        assert_eq!(webhook_hostname(&config(false, None)), None);
    }

    #[test]
    fn debug_long_polls_even_with_a_hostname() {
        assert_eq!(webhook_hostname(&config(true, Some("bot.example"))), None);
        assert_eq!(webhook_hostname(&config(true, None)), None);
    }
}
