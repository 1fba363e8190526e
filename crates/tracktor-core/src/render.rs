//! Chat-facing text and keyboard rendering.
//!
//! Everything user-visible goes through these helpers so that two paths
//! showing the same thing (e.g. a refresh and the "No" branch of a removal
//! prompt) produce byte-identical output.

use crate::{
    action::{Action, ActionToken},
    domain::{RemoteTorrentState, TopicRecord},
    keyboard::{Button, Keyboard},
};

/// `"{name}: {status} ({percent}%)"` with one decimal of completion.
pub fn status_line(state: &RemoteTorrentState) -> String {
    format!(
        "{}: {} ({:.1}%)",
        state.name,
        state.status,
        state.percent_done * 100.0
    )
}

pub fn ready_line(name: &str) -> String {
    format!("{name}: ready to start")
}

pub fn removed_line(name: &str) -> String {
    format!("{name}: removed")
}

pub fn confirm_removal_prompt(name: &str) -> String {
    format!("Are you sure you want to remove torrent \"{name}\" and all its contents?")
}

/// The four controls shown under an active torrent's status message.
pub fn torrent_controls(topic_id: &str) -> Keyboard {
    Keyboard::single_row(vec![
        Button::callback("Start", &ActionToken::new(Action::Start, topic_id)),
        Button::callback("Refresh", &ActionToken::new(Action::Refresh, topic_id)),
        Button::callback("Pause", &ActionToken::new(Action::Pause, topic_id)),
        Button::callback("Remove", &ActionToken::new(Action::Remove, topic_id)),
    ])
}

pub fn ready_controls(topic_id: &str) -> Keyboard {
    Keyboard::single_row(vec![Button::callback(
        "Start",
        &ActionToken::new(Action::Start, topic_id),
    )])
}

/// Terminal control after a confirmed removal; "Restart" reuses the start
/// path, which resurrects the torrent from the cached descriptor.
pub fn restart_controls(topic_id: &str) -> Keyboard {
    Keyboard::single_row(vec![Button::callback(
        "Restart",
        &ActionToken::new(Action::Start, topic_id),
    )])
}

/// Yes/no prompt controls; "No" is wired to the refresh verb, which restores
/// the status display.
pub fn confirm_removal_controls(topic_id: &str) -> Keyboard {
    Keyboard::single_row(vec![
        Button::callback("Yes", &ActionToken::new(Action::RemoveYes, topic_id)),
        Button::callback("No", &ActionToken::new(Action::Refresh, topic_id)),
    ])
}

/// One rendered inline search result.
#[derive(Clone, Debug)]
pub struct InlineCard {
    pub title: String,
    pub description: String,
    pub body_html: String,
    pub keyboard: Keyboard,
}

pub fn inline_card(topic: &TopicRecord, query: &str, forum_url: &str) -> InlineCard {
    let mut description = topic.size.clone();
    if !topic.seeders.is_empty() {
        description.push_str(" : ");
        description.push_str(&topic.seeders);
    }
    if !topic.verified.is_empty() {
        description.push_str(" : ");
        description.push_str(&topic.verified);
    }

    let body_html = format!(
        "<b>{}</b>\nSize: {}\nSeeders: {}\nDownloads: {}\n",
        escape_html(&topic.title),
        escape_html(&topic.size),
        escape_html(&topic.seeders),
        escape_html(&topic.downloads),
    );

    let topic_url = format!("{forum_url}?t={}", topic.id);
    let keyboard = Keyboard::single_row(vec![
        Button::callback("Download", &ActionToken::new(Action::Init, &topic.id)),
        Button::url("View topic", topic_url),
        Button::switch_inline("Back", query),
    ]);

    InlineCard {
        title: topic.title.clone(),
        description,
        body_html,
        keyboard,
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TorrentStatus;
    use crate::keyboard::ButtonKind;

    fn callback_data(keyboard: &Keyboard) -> Vec<&str> {
        keyboard.rows[0]
            .iter()
            .filter_map(|b| match &b.kind {
                ButtonKind::Callback(data) => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn status_line_has_one_decimal_percent() {
        let state = RemoteTorrentState {
            name: "ubuntu.iso".to_string(),
            status: TorrentStatus::Downloading,
            percent_done: 0.756,
        };
        assert_eq!(status_line(&state), "ubuntu.iso: Downloading (75.6%)");
    }

    #[test]
    fn zero_state_renders_as_stopped() {
        assert_eq!(status_line(&RemoteTorrentState::default()), ": Stopped (0.0%)");
    }

    #[test]
    fn torrent_controls_carry_all_four_verbs() {
        let kb = torrent_controls("100");
        assert_eq!(
            callback_data(&kb),
            vec!["start-100", "refresh-100", "pause-100", "remove-100"]
        );
    }

    #[test]
    fn confirmation_no_is_wired_to_refresh() {
        let kb = confirm_removal_controls("100");
        assert_eq!(callback_data(&kb), vec!["remove-yes-100", "refresh-100"]);
        assert_eq!(kb.rows[0][1].label, "No");
    }

    #[test]
    fn restart_is_wired_to_start() {
        let kb = restart_controls("100");
        assert_eq!(callback_data(&kb), vec!["start-100"]);
        assert_eq!(kb.rows[0][0].label, "Restart");
    }

    #[test]
    fn inline_card_skips_empty_description_parts() {
        let topic = TopicRecord {
            id: "100".to_string(),
            title: "Big Buck Bunny <1080p>".to_string(),
            size: "1.4 GB".to_string(),
            seeders: "12".to_string(),
            downloads: "345".to_string(),
            ..Default::default()
        };
        let card = inline_card(&topic, "bunny", "https://forum.example");
        assert_eq!(card.description, "1.4 GB : 12");
        assert!(card.body_html.contains("<b>Big Buck Bunny &lt;1080p&gt;</b>"));

        match &card.keyboard.rows[0][1].kind {
            ButtonKind::Url(url) => assert_eq!(url, "https://forum.example?t=100"),
            other => panic!("expected url button, got {other:?}"),
        }
        match &card.keyboard.rows[0][2].kind {
            ButtonKind::SwitchInlineCurrentChat(q) => assert_eq!(q, "bunny"),
            other => panic!("expected switch-inline button, got {other:?}"),
        }
    }
}
