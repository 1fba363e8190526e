//! The torrent lifecycle state machine.
//!
//! Per-topic state is never persisted: it is re-derived from the daemon on
//! every action, and the "pending removal confirmation" state exists only as
//! the yes/no buttons of the rendered message. What this module returns is a
//! transport-agnostic description of the chat mutation to perform; the
//! Telegram adapter executes it against the triggering message.

use std::sync::Arc;

use crate::{
    action::{Action, ActionToken},
    keyboard::Keyboard,
    ports::DaemonPort,
    render,
    torrent::{self, TorrentCache},
    errors::Error,
    Result,
};

/// Chat mutation produced by one action.
#[derive(Clone, Debug)]
pub enum ActionOutcome {
    /// Post a fresh message (only `init`, which originates from a new
    /// inline selection rather than an existing message's button).
    Post { text: String, keyboard: Keyboard },
    /// Edit the exact message that carried the triggering control.
    Edit { text: String, keyboard: Keyboard },
    /// Do nothing at all: no message, no edit, not even a callback ack.
    Silent,
}

#[derive(Clone, Debug)]
pub struct ActionReply {
    /// Toast-style callback acknowledgement, if any.
    pub ack: Option<String>,
    pub outcome: ActionOutcome,
}

pub struct LifecycleRouter {
    cache: Arc<TorrentCache>,
    daemon: Arc<dyn DaemonPort>,
}

impl LifecycleRouter {
    pub fn new(cache: Arc<TorrentCache>, daemon: Arc<dyn DaemonPort>) -> Self {
        Self { cache, daemon }
    }

    /// Run one decoded action token through the state machine.
    ///
    /// Any cache, decode or daemon failure aborts the whole action: the
    /// caller logs it and leaves the chat untouched.
    pub async fn handle(&self, token: &ActionToken) -> Result<ActionReply> {
        match token.action {
            Action::Init => self.launch(token, true).await,
            Action::Start => self.launch(token, false).await,
            Action::Pause => self.pause(token).await,
            Action::Refresh => self.refresh(token).await,
            Action::Remove => self.confirm_removal(token).await,
            Action::RemoveYes => self.remove(token).await,
        }
    }

    /// "<name>: ready to start" reply for a pasted topic link.
    pub async fn ready(&self, topic_id: &str) -> Result<(String, Keyboard)> {
        let desc = self.descriptor(topic_id).await?;
        Ok((
            render::ready_line(&desc.content_name),
            render::ready_controls(topic_id),
        ))
    }

    /// `init` / `start`: register the cached descriptor with the daemon
    /// (re-adding is idempotent daemon-side), start it, and show the fresh
    /// daemon state.
    async fn launch(&self, token: &ActionToken, post: bool) -> Result<ActionReply> {
        let (path, bytes) = self.cache.fetch(&token.topic_id).await?;
        if bytes.is_empty() {
            return Err(Error::Decode(format!(
                "descriptor for topic {} is not available yet",
                token.topic_id
            )));
        }

        let added = self.daemon.add(&path).await?;
        self.daemon.start(added.id).await?;

        let (text, keyboard) = self.status_display(&added.info_hash, &token.topic_id).await?;
        let (ack, outcome) = if post {
            (
                format!("Started downloading torrent: {}", added.name),
                ActionOutcome::Post { text, keyboard },
            )
        } else {
            (
                format!("Started torrent: {}", added.name),
                ActionOutcome::Edit { text, keyboard },
            )
        };
        Ok(ActionReply {
            ack: Some(ack),
            outcome,
        })
    }

    async fn pause(&self, token: &ActionToken) -> Result<ActionReply> {
        let desc = self.descriptor(&token.topic_id).await?;
        self.daemon.stop(&desc.info_hash).await?;

        let (text, keyboard) = self.status_display(&desc.info_hash, &token.topic_id).await?;
        Ok(ActionReply {
            ack: Some(format!("Stopped torrent: {}", desc.content_name)),
            outcome: ActionOutcome::Edit { text, keyboard },
        })
    }

    async fn refresh(&self, token: &ActionToken) -> Result<ActionReply> {
        let desc = self.descriptor(&token.topic_id).await?;
        let (text, keyboard) = self.status_display(&desc.info_hash, &token.topic_id).await?;
        Ok(ActionReply {
            ack: None,
            outcome: ActionOutcome::Edit { text, keyboard },
        })
    }

    /// `remove` only rewrites the message into a confirmation prompt; the
    /// daemon is not touched until the "Yes" button comes back.
    async fn confirm_removal(&self, token: &ActionToken) -> Result<ActionReply> {
        let desc = self.descriptor(&token.topic_id).await?;
        Ok(ActionReply {
            ack: None,
            outcome: ActionOutcome::Edit {
                text: render::confirm_removal_prompt(&desc.content_name),
                keyboard: render::confirm_removal_controls(&token.topic_id),
            },
        })
    }

    async fn remove(&self, token: &ActionToken) -> Result<ActionReply> {
        let desc = self.descriptor(&token.topic_id).await?;

        let Some(id) = self.daemon.find_id(&desc.info_hash).await? else {
            // The daemon has no record for this hash (already removed, or
            // never added). Abort silently; the cached descriptor stays, so
            // the stale buttons still work.
            tracing::warn!(
                topic_id = %token.topic_id,
                info_hash = %desc.info_hash,
                "remove confirmed for a torrent unknown to the daemon, ignoring"
            );
            return Ok(ActionReply {
                ack: None,
                outcome: ActionOutcome::Silent,
            });
        };

        self.daemon.remove(id, true).await?;
        Ok(ActionReply {
            ack: Some(format!("Removed torrent: {}", desc.content_name)),
            outcome: ActionOutcome::Edit {
                text: render::removed_line(&desc.content_name),
                keyboard: render::restart_controls(&token.topic_id),
            },
        })
    }

    async fn descriptor(&self, topic_id: &str) -> Result<torrent::TorrentDescriptor> {
        let (_, bytes) = self.cache.fetch(topic_id).await?;
        torrent::decode(&bytes)
    }

    /// Shared status rendering: every display of a torrent's state goes
    /// through here, so a refresh and a cancelled removal are byte-identical.
    async fn status_display(&self, info_hash: &str, topic_id: &str) -> Result<(String, Keyboard)> {
        let state = self.daemon.describe(info_hash).await?;
        Ok((
            render::status_line(&state),
            render::torrent_controls(topic_id),
        ))
    }
}
