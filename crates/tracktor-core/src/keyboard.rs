use crate::action::ActionToken;

/// Transport-agnostic inline keyboard.
///
/// The Telegram adapter converts this into its own markup type; tests can
/// assert on button wiring without touching the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn single_row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub kind: ButtonKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonKind {
    /// Carries an encoded action token back to the lifecycle router.
    Callback(String),
    Url(String),
    SwitchInlineCurrentChat(String),
}

impl Button {
    pub fn callback(label: impl Into<String>, token: &ActionToken) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Callback(token.to_string()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Url(url.into()),
        }
    }

    pub fn switch_inline(label: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::SwitchInlineCurrentChat(query.into()),
        }
    }
}
