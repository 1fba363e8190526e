//! Transmission RPC adapter.
//!
//! Implements the core `DaemonPort` over Transmission's JSON-RPC endpoint:
//! a single POST target, CSRF-protected by the `X-Transmission-Session-Id`
//! header. A `409 Conflict` hands us the session id; the request is then
//! replayed once with it. No other retries.

use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use tracktor_core::{
    config::Config,
    domain::{RemoteTorrentState, TorrentStatus},
    errors::Error,
    ports::{AddedTorrent, DaemonPort},
    Result,
};

const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

pub struct TransmissionClient {
    http: reqwest::Client,
    endpoint: String,
    auth: Option<(String, String)>,
    session_id: Mutex<Option<String>>,
}

impl TransmissionClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let endpoint = format!(
            "http://{}:{}/transmission/rpc",
            cfg.transmission_host, cfg.transmission_port
        );
        let auth = cfg.transmission_user.as_ref().map(|user| {
            (
                user.clone(),
                cfg.transmission_password.clone().unwrap_or_default(),
            )
        });
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Rpc(format!("failed to build rpc client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            auth,
            session_id: Mutex::new(None),
        })
    }

    async fn call(&self, method: &str, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let payload = json!({ "method": method, "arguments": arguments });

        let session_id = self.session_id.lock().await.clone();
        let mut resp = self.post(&payload, session_id).await?;

        if resp.status() == StatusCode::CONFLICT {
            let sid = resp
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::Rpc(format!("{method}: daemon returned 409 without a session id"))
                })?;
            *self.session_id.lock().await = Some(sid.clone());
            resp = self.post(&payload, Some(sid)).await?;
        }

        if !resp.status().is_success() {
            return Err(Error::Rpc(format!(
                "{method} failed with HTTP {}",
                resp.status()
            )));
        }

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| Error::Rpc(format!("{method}: malformed response: {e}")))?;
        if body.result != "success" {
            return Err(Error::Rpc(format!("{method} failed: {}", body.result)));
        }
        tracing::debug!(method, "rpc call ok");
        Ok(body.arguments)
    }

    async fn post(
        &self,
        payload: &serde_json::Value,
        session_id: Option<String>,
    ) -> Result<reqwest::Response> {
        let mut req = self.http.post(&self.endpoint).json(payload);
        if let Some(sid) = session_id {
            req = req.header(SESSION_ID_HEADER, sid);
        }
        if let Some((user, password)) = &self.auth {
            req = req.basic_auth(user, Some(password));
        }
        req.send()
            .await
            .map_err(|e| Error::Rpc(format!("transmission request failed: {e}")))
    }

    async fn get_by_hash(&self, info_hash: &str, fields: &[&str]) -> Result<Vec<TorrentFields>> {
        let args = self
            .call(
                "torrent-get",
                json!({ "ids": [info_hash], "fields": fields }),
            )
            .await?;
        let torrents: Vec<TorrentFields> = serde_json::from_value(
            args.get("torrents").cloned().unwrap_or(json!([])),
        )
        .map_err(|e| Error::Rpc(format!("torrent-get: malformed torrent list: {e}")))?;
        Ok(torrents)
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct TorrentFields {
    id: Option<i64>,
    #[serde(rename = "hashString")]
    hash_string: Option<String>,
    name: Option<String>,
    status: Option<i64>,
    #[serde(rename = "percentDone")]
    percent_done: Option<f64>,
}

fn state_from_fields(t: &TorrentFields) -> RemoteTorrentState {
    RemoteTorrentState {
        name: t.name.clone().unwrap_or_default(),
        status: TorrentStatus::from_code(t.status.unwrap_or_default()),
        percent_done: t.percent_done.unwrap_or_default(),
    }
}

#[async_trait]
impl DaemonPort for TransmissionClient {
    async fn describe(&self, info_hash: &str) -> Result<RemoteTorrentState> {
        let torrents = self
            .get_by_hash(info_hash, &["id", "name", "status", "percentDone"])
            .await?;
        // No match is the zero state, not an error: the torrent just is not
        // registered with the daemon (yet, or any more).
        Ok(torrents
            .first()
            .map(state_from_fields)
            .unwrap_or_default())
    }

    async fn add(&self, descriptor_path: &Path) -> Result<AddedTorrent> {
        let bytes = tokio::fs::read(descriptor_path).await?;
        let metainfo = BASE64.encode(&bytes);
        let args = self
            .call("torrent-add", json!({ "metainfo": metainfo }))
            .await?;

        // Re-adding a known descriptor answers with "torrent-duplicate".
        let added = args
            .get("torrent-added")
            .or_else(|| args.get("torrent-duplicate"))
            .cloned()
            .ok_or_else(|| Error::Rpc("torrent-add: no torrent in response".to_string()))?;
        let fields: TorrentFields = serde_json::from_value(added)
            .map_err(|e| Error::Rpc(format!("torrent-add: malformed response: {e}")))?;

        match (fields.id, fields.hash_string) {
            (Some(id), Some(info_hash)) => Ok(AddedTorrent {
                id,
                info_hash,
                name: fields.name.unwrap_or_default(),
            }),
            _ => Err(Error::Rpc(
                "torrent-add: response missing id or hash".to_string(),
            )),
        }
    }

    async fn start(&self, id: i64) -> Result<()> {
        self.call("torrent-start", json!({ "ids": [id] })).await?;
        Ok(())
    }

    async fn stop(&self, info_hash: &str) -> Result<()> {
        self.call("torrent-stop", json!({ "ids": [info_hash] }))
            .await?;
        Ok(())
    }

    async fn remove(&self, id: i64, purge_local_data: bool) -> Result<()> {
        self.call(
            "torrent-remove",
            json!({ "ids": [id], "delete-local-data": purge_local_data }),
        )
        .await?;
        Ok(())
    }

    async fn find_id(&self, info_hash: &str) -> Result<Option<i64>> {
        let torrents = self.get_by_hash(info_hash, &["id"]).await?;
        Ok(torrents.first().and_then(|t| t.id))
    }
}
