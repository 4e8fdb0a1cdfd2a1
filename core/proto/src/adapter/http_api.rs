//! RemoteApi の HTTP 実装（reqwest blocking）
//!
//! エンドポイント配下の REST 風パスへ JSON を送る。非 2xx は
//! レスポンスボディからメッセージを抽出して Error::http にする。

use crate::domain::{Checkin, Run, RunHistoryEntry, UserId};
use crate::ports::outbound::{RemoteApi, RemoteConnector, RemoteState};
use common::domain::RunId;
use common::error::Error;
use serde_json::Value;
use std::sync::Arc;

/// HTTP で通信する RemoteApi 実装
pub struct HttpRemoteApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpRemoteApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, user: &UserId, suffix: &str) -> String {
        format!("{}/users/{}/{}", self.base_url, user, suffix)
    }

    fn check_status(response: reqwest::blocking::Response) -> Result<String, Error> {
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::http(format!("failed to read response: {}", e)))?;
        if !status.is_success() {
            // エラーレスポンスからメッセージを抽出
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
                .unwrap_or_else(|| format!("HTTP {}: {}", status, text));
            return Err(Error::http(message));
        }
        Ok(text)
    }

    fn put_json(&self, url: &str, body: &impl serde::Serialize) -> Result<(), Error> {
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;
        Self::check_status(response).map(|_| ())
    }
}

impl RemoteApi for HttpRemoteApi {
    fn fetch_state(&self, user: &UserId) -> Result<RemoteState, Error> {
        let response = self
            .client
            .get(self.url(user, "state"))
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;
        let text = Self::check_status(response)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::http(format!("malformed remote state: {}", e)))
    }

    fn put_active_run(&self, user: &UserId, run: &Run) -> Result<(), Error> {
        self.put_json(&self.url(user, "active-run"), run)
    }

    fn delete_active_run(&self, user: &UserId, run_id: &RunId) -> Result<(), Error> {
        let response = self
            .client
            .delete(self.url(user, &format!("active-run/{}", run_id)))
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;
        Self::check_status(response).map(|_| ())
    }

    fn upsert_checkin(
        &self,
        user: &UserId,
        run_id: &RunId,
        checkin: &Checkin,
    ) -> Result<(), Error> {
        self.put_json(
            &self.url(user, &format!("runs/{}/checkins/{}", run_id, checkin.index)),
            checkin,
        )
    }

    fn upsert_history_entry(&self, user: &UserId, entry: &RunHistoryEntry) -> Result<(), Error> {
        self.put_json(&self.url(user, &format!("history/{}", entry.id)), entry)
    }
}

/// 設定済みエンドポイントから HttpRemoteApi を得る RemoteConnector 実装
///
/// エンドポイント未設定、またはクライアント構築失敗なら None
/// （ストア選択はローカルへフォールバックする）。
pub struct HttpRemoteConnector {
    endpoint: Option<String>,
}

impl HttpRemoteConnector {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }
}

impl RemoteConnector for HttpRemoteConnector {
    fn connect(&self) -> Option<Arc<dyn RemoteApi>> {
        let endpoint = self.endpoint.as_deref()?;
        HttpRemoteApi::new(endpoint)
            .ok()
            .map(|api| Arc::new(api) as Arc<dyn RemoteApi>)
    }
}
