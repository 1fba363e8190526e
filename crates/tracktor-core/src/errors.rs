/// Core error type.
///
/// Adapter crates map their specific errors into this type so the bot core
/// can handle failures consistently. Per-action failures are logged and the
/// action is aborted; nothing here is fatal except `Config` at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
