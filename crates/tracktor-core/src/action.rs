use std::fmt;

/// Lifecycle verb carried by a chat button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// First selection of a topic: add + start, then post a fresh message.
    Init,
    /// (Re-)add and start; edits the triggering message.
    Start,
    Pause,
    Refresh,
    /// Ask for confirmation; does not touch the daemon.
    Remove,
    /// Confirmed removal with local data purge.
    RemoveYes,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Refresh => "refresh",
            Self::Remove => "remove",
            Self::RemoveYes => "remove-yes",
        }
    }
}

/// Decoded callback token: `<verb>-<topicId>`.
///
/// Tokens are opaque to Telegram; they are decoded once here at the boundary
/// and dispatched with an exhaustive match on the verb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionToken {
    pub action: Action,
    pub topic_id: String,
}

impl ActionToken {
    pub fn new(action: Action, topic_id: impl Into<String>) -> Self {
        Self {
            action,
            topic_id: topic_id.into(),
        }
    }

    /// `remove-yes-` must be tried before `remove-`.
    const VERBS: [(&'static str, Action); 6] = [
        ("remove-yes-", Action::RemoveYes),
        ("remove-", Action::Remove),
        ("init-", Action::Init),
        ("start-", Action::Start),
        ("pause-", Action::Pause),
        ("refresh-", Action::Refresh),
    ];

    pub fn parse(data: &str) -> Option<Self> {
        for (prefix, action) in Self::VERBS {
            if let Some(topic_id) = data.strip_prefix(prefix) {
                if topic_id.is_empty() {
                    return None;
                }
                return Some(Self::new(action, topic_id));
            }
        }
        None
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.action.verb(), self.topic_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_verb() {
        for (wire, action) in [
            ("init-100", Action::Init),
            ("start-100", Action::Start),
            ("pause-100", Action::Pause),
            ("refresh-100", Action::Refresh),
            ("remove-100", Action::Remove),
            ("remove-yes-100", Action::RemoveYes),
        ] {
            let token = ActionToken::parse(wire).unwrap();
            assert_eq!(token.action, action);
            assert_eq!(token.topic_id, "100");
        }
    }

    #[test]
    fn remove_yes_wins_over_remove() {
        // A topic id starting with "yes-" must not be misread either way.
        let token = ActionToken::parse("remove-yes-42").unwrap();
        assert_eq!(token.action, Action::RemoveYes);
        assert_eq!(token.topic_id, "42");
    }

    #[test]
    fn rejects_garbage_and_empty_topic_ids() {
        assert_eq!(ActionToken::parse(""), None);
        assert_eq!(ActionToken::parse("init-"), None);
        assert_eq!(ActionToken::parse("remove-yes-"), None);
        assert_eq!(ActionToken::parse("launch-100"), None);
        assert_eq!(ActionToken::parse("askuser:1:2"), None);
    }

    #[test]
    fn display_round_trips() {
        let token = ActionToken::new(Action::RemoveYes, "6133125");
        assert_eq!(token.to_string(), "remove-yes-6133125");
        assert_eq!(ActionToken::parse(&token.to_string()).unwrap(), token);
    }
}
