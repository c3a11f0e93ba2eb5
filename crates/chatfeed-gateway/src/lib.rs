//! Read-only client for the two Slack Web API methods the feed needs.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use chatfeed_types::slack::{History, Member, Message, SlackResponse, UsersList};

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{method} request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned HTTP {status}")]
    Status {
        method: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("{method} returned an unreadable body: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{method} failed: {error}")]
    Api { method: &'static str, error: String },
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Transport { source, .. } if source.is_timeout())
    }
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub api_base: String,
    pub token: String,
    pub channel_id: String,
    pub history_limit: u32,
    pub timeout: Duration,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            channel_id: channel_id.into(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Messages (newest first) and workspace members fetched together.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub members: Vec<Member>,
}

#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    config: Arc<SlackConfig>,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GatewayError::Client)?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// `users.list`
    pub async fn list_users(&self) -> Result<Vec<Member>, GatewayError> {
        let users: UsersList = self.call("users.list", &[]).await?;
        debug!("users.list returned {} members", users.members.len());
        Ok(users.members)
    }

    /// `conversations.history`, newest message first.
    pub async fn channel_history(&self) -> Result<Vec<Message>, GatewayError> {
        let query = [
            ("channel", self.config.channel_id.clone()),
            ("limit", self.config.history_limit.to_string()),
        ];
        let history: History = self.call("conversations.history", &query).await?;
        debug!(
            "conversations.history returned {} messages",
            history.messages.len()
        );
        Ok(history.messages)
    }

    /// Fetch history and users concurrently. The first failure wins and the
    /// other request is dropped.
    pub async fn snapshot(&self) -> Result<Snapshot, GatewayError> {
        let (messages, members) = tokio::try_join!(self.channel_history(), self.list_users())?;
        Ok(Snapshot { messages, members })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}/{}", self.config.api_base.trim_end_matches('/'), method);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.config.token)
            .query(query)
            .send()
            .await
            .map_err(|source| {
                error!("{} request failed: {}", method, source);
                GatewayError::Transport { method, source }
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!("{} returned HTTP {}", method, status);
            return Err(GatewayError::Status { method, status });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|source| GatewayError::Transport { method, source })?;

        let envelope: SlackResponse<T> = serde_json::from_slice(&body).map_err(|source| {
            error!("{} returned an unreadable body: {}", method, source);
            GatewayError::Decode { method, source }
        })?;

        if !envelope.ok {
            let error = envelope.error.unwrap_or_else(|| "unknown_error".into());
            error!("{} failed: {}", method, error);
            return Err(GatewayError::Api { method, error });
        }

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode, header},
        routing::get,
    };
    use serde_json::{Value, json};

    use super::*;

    const TOKEN: &str = "xoxb-test";

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn client(api_base: String) -> SlackClient {
        let mut config = SlackConfig::new(TOKEN, "C1");
        config.api_base = api_base;
        config.history_limit = 7;
        config.timeout = Duration::from_millis(300);
        SlackClient::new(config).unwrap()
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"))
    }

    async fn users(headers: HeaderMap) -> Json<Value> {
        if !authorized(&headers) {
            return Json(json!({"ok": false, "error": "not_authed"}));
        }
        Json(json!({
            "ok": true,
            "members": [
                {"id": "U1", "profile": {"display_name": "Ann", "image_72": "a.png", "image_192": "a2.png"}},
                {"id": "U2", "profile": {"display_name": "Bob", "image_72": "b.png", "image_192": "b2.png"}}
            ]
        }))
    }

    async fn history(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        if !authorized(&headers) {
            return Json(json!({"ok": false, "error": "not_authed"}));
        }
        if q.get("channel").map(String::as_str) != Some("C1")
            || q.get("limit").map(String::as_str) != Some("7")
        {
            return Json(json!({"ok": false, "error": "bad_query"}));
        }
        Json(json!({
            "ok": true,
            "messages": [
                {"type": "message", "user": "U1", "text": "newest", "ts": "2.0"},
                {"type": "message", "user": "U2", "text": "oldest", "ts": "1.0"}
            ],
            "has_more": false
        }))
    }

    fn healthy_api() -> Router {
        Router::new()
            .route("/users.list", get(users))
            .route("/conversations.history", get(history))
    }

    #[tokio::test]
    async fn snapshot_fetches_both_lists() {
        let base = serve(healthy_api()).await;
        let snapshot = client(base).snapshot().await.unwrap();

        assert_eq!(snapshot.members.len(), 2);
        assert_eq!(snapshot.members[1].profile.display_name, "Bob");
        let texts: Vec<_> = snapshot.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["newest", "oldest"]);
    }

    #[tokio::test]
    async fn trailing_slash_in_base_is_tolerated() {
        let base = serve(healthy_api()).await;
        let users = client(format!("{base}/")).list_users().await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn api_error_envelope() {
        let router = Router::new().route(
            "/conversations.history",
            get(|| async { Json(json!({"ok": false, "error": "channel_not_found"})) }),
        );
        let base = serve(router).await;

        match client(base).channel_history().await {
            Err(GatewayError::Api { method, error }) => {
                assert_eq!(method, "conversations.history");
                assert_eq!(error, "channel_not_found");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_error_status() {
        let router = Router::new().route(
            "/users.list",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = serve(router).await;

        match client(base).list_users().await {
            Err(GatewayError::Status { status, .. }) => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body() {
        let router = Router::new().route("/users.list", get(|| async { "<html>nope</html>" }));
        let base = serve(router).await;

        assert!(matches!(
            client(base).list_users().await,
            Err(GatewayError::Decode { method: "users.list", .. })
        ));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let router = Router::new().route(
            "/users.list",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"ok": true, "members": []}))
            }),
        );
        let base = serve(router).await;

        let err = client(base).list_users().await.unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
    }

    #[tokio::test]
    async fn snapshot_fails_when_either_call_fails() {
        let router = Router::new()
            .route("/users.list", get(users))
            .route(
                "/conversations.history",
                get(|| async { Json(json!({"ok": false, "error": "ratelimited"})) }),
            );
        let base = serve(router).await;

        assert!(matches!(
            client(base).snapshot().await,
            Err(GatewayError::Api { method: "conversations.history", .. })
        ));
    }

    #[tokio::test]
    async fn wrong_token_is_reported() {
        let base = serve(healthy_api()).await;
        let mut config = SlackConfig::new("xoxb-wrong", "C1");
        config.api_base = base;
        let client = SlackClient::new(config).unwrap();

        assert!(matches!(
            client.list_users().await,
            Err(GatewayError::Api { error, .. }) if error == "not_authed"
        ));
    }
}
