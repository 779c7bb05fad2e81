use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{TrustError, TrustResult};

/// What came back over the wire, before any interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    /// `None` when the status line arrived but the body could not be read
    pub body: Option<String>,
}

/// Abstraction over the outbound HTTP client.
///
/// Implementations do not apply timeouts of their own; callers bound each
/// call with `tokio::time::timeout` and drop the future on expiry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as `application/json`
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> TrustResult<HttpReply>;

    async fn get(&self, url: &str) -> TrustResult<HttpReply>;
}

/// reqwest-backed transport used in production
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> TrustResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TrustError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> HttpReply {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("Failed to read response body (HTTP {}): {}", status, e);
                None
            }
        };
        HttpReply { status, body }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> TrustResult<HttpReply> {
        let response = self.client.post(url).json(body).send().await?;
        Ok(Self::read(response).await)
    }

    async fn get(&self, url: &str) -> TrustResult<HttpReply> {
        let response = self.client.get(url).send().await?;
        Ok(Self::read(response).await)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;

    /// Canned behaviour for one kind of call
    #[derive(Debug, Clone)]
    pub(crate) enum Scripted {
        Reply(u16, Option<String>),
        Fail(String),
        /// Never completes; only a caller-side timeout gets out of this
        Hang,
    }

    /// Deterministic in-memory transport. Pair with `start_paused` tokio tests
    /// so `delay` translates into exact measured latency.
    pub(crate) struct ScriptedTransport {
        post: Scripted,
        delay: Duration,
        gets: Vec<(String, Scripted)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(post: Scripted) -> Self {
            Self {
                post,
                delay: Duration::ZERO,
                gets: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(status: u16, body: &str) -> Self {
            Self::new(Scripted::Reply(status, Some(body.to_string())))
        }

        pub(crate) fn with_delay_ms(mut self, ms: u64) -> Self {
            self.delay = Duration::from_millis(ms);
            self
        }

        /// Reply for any GET whose URL contains `fragment` (first match wins)
        pub(crate) fn with_get(mut self, fragment: &str, reply: Scripted) -> Self {
            self.gets.push((fragment.to_string(), reply));
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        async fn play(&self, scripted: &Scripted) -> TrustResult<HttpReply> {
            match scripted {
                Scripted::Reply(status, body) => Ok(HttpReply {
                    status: *status,
                    body: body.clone(),
                }),
                Scripted::Fail(msg) => Err(TrustError::Transport(msg.clone())),
                Scripted::Hang => std::future::pending().await,
            }
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn post_json(&self, url: &str, _body: &serde_json::Value) -> TrustResult<HttpReply> {
            self.calls.lock().push(format!("POST {}", url));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.play(&self.post).await
        }

        async fn get(&self, url: &str) -> TrustResult<HttpReply> {
            self.calls.lock().push(format!("GET {}", url));
            let scripted = self
                .gets
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, s)| s.clone())
                .unwrap_or_else(|| Scripted::Fail(format!("no scripted reply for {}", url)));
            self.play(&scripted).await
        }
    }
}
