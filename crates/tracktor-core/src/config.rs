use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Typed configuration for the bot.
///
/// Built once at startup from the environment and injected into every
/// component constructor; no component reads ambient global state.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    /// Public hostname for webhook (push) delivery. `None` only in debug
    /// mode, which falls back to long polling.
    pub app_hostname: Option<String>,
    pub webhook_port: u16,
    pub debug: bool,

    // Forum
    pub forum_url: String,
    pub bb_session: String,

    // Transmission daemon
    pub transmission_host: String,
    pub transmission_port: u16,
    pub transmission_user: Option<String>,
    pub transmission_password: Option<String>,

    // Local descriptor cache
    pub torrents_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = require("BOT_TOKEN")?;
        let forum_url = require("FORUM_URL")?.trim_end_matches('/').to_string();
        let bb_session = require("BB_SESSION")?;
        let transmission_host = require("TRANSMISSION_RPC_HOST")?;

        let transmission_port = env_u16("TRANSMISSION_RPC_PORT").unwrap_or(9091);
        let transmission_user = env_str("TRANSMISSION_RPC_USER").and_then(non_empty);
        let transmission_password = env_str("TRANSMISSION_RPC_PASSWORD").and_then(non_empty);

        let debug = env_str("DEBUG").and_then(non_empty).is_some();
        let app_hostname = env_str("APP_HOSTNAME").and_then(non_empty);
        if app_hostname.is_none() && !debug {
            return Err(Error::Config(
                "APP_HOSTNAME environment variable is required unless DEBUG is set".to_string(),
            ));
        }
        let webhook_port = env_u16("WEBHOOK_PORT").unwrap_or(8443);

        let torrents_dir = env_path("TORRENTS_DIR").unwrap_or_else(|| PathBuf::from("torrents"));

        Ok(Self {
            bot_token,
            app_hostname,
            webhook_port,
            debug,
            forum_url,
            bb_session,
            transmission_host,
            transmission_port,
            transmission_user,
            transmission_password,
            torrents_dir,
        })
    }
}

fn require(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sole test touching process env in this binary; keep it that way.
    #[test]
    fn load_reads_env_without_touching_the_filesystem() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("torrents");

        env::set_var("BOT_TOKEN", "token");
        env::set_var("FORUM_URL", "https://forum.example/");
        env::set_var("BB_SESSION", "session");
        env::set_var("TRANSMISSION_RPC_HOST", "localhost");
        env::set_var("DEBUG", "1");
        env::set_var("TORRENTS_DIR", &dir);

        let cfg = Config::load().unwrap();
        assert_eq!(cfg.torrents_dir, dir);
        // Directory creation belongs to bootstrap, not to config loading.
        assert!(!dir.exists());
        assert!(cfg.debug);
        assert_eq!(cfg.forum_url, "https://forum.example");
    }
}
