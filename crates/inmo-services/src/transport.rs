//! HTTP transport against a WhatsApp-style messaging gateway.
//!
//! Inbound messages are long-polled from the gateway's queue endpoint with
//! exponential backoff on transient failures; outbound texts go through a
//! single send endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inmo_core::config::TransportConfig;
use inmo_core::error::InmoError;
use inmo_core::message::{InboundText, SendReceipt};
use inmo_core::traits::TransportConnector;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
    stopped: Arc<AtomicBool>,
}

// --- Gateway wire types ---

#[derive(Deserialize)]
struct GatewayMessage {
    id: String,
    from: String,
    #[serde(default)]
    name: Option<String>,
    body: String,
    timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct PollResponse {
    #[serde(default)]
    messages: Vec<GatewayMessage>,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    body: &'a str,
    sender: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    message_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    ready: bool,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, InmoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| InmoError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            stopped: Arc::new(AtomicBool::new(false)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TransportConnector for HttpTransport {
    async fn start(&self) -> Result<mpsc::Receiver<InboundText>, InmoError> {
        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let poll_url = self.url("/messages");
        let api_key = self.config.api_key.clone();
        let poll_interval = Duration::from_secs(self.config.poll_interval_secs.max(1));
        let stopped = self.stopped.clone();

        info!("transport polling {poll_url}");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;
            let mut last_id: Option<String> = None;

            loop {
                if stopped.load(Ordering::Relaxed) {
                    info!("transport polling stopped");
                    break;
                }

                let mut request = client.get(&poll_url);
                if !api_key.is_empty() {
                    request = request.bearer_auth(&api_key);
                }
                if let Some(ref id) = last_id {
                    request = request.query(&[("after", id.as_str())]);
                }

                let response = match request.send().await {
                    Ok(r) => r,
                    Err(e) => {
                        error!("gateway poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: PollResponse = match response.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("gateway parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                backoff_secs = 1;

                for msg in body.messages {
                    last_id = Some(msg.id.clone());
                    debug!("inbound text from {}", msg.from);
                    let inbound = InboundText {
                        id: Uuid::new_v4(),
                        sender_id: msg.from,
                        sender_name: msg.name,
                        text: msg.body,
                        timestamp: msg.timestamp,
                    };
                    if tx.send(inbound).await.is_err() {
                        info!("inbound receiver dropped, stopping poll loop");
                        return;
                    }
                }

                tokio::time::sleep(poll_interval).await;
            }
        });

        Ok(rx)
    }

    async fn send_text(&self, recipient: &str, text: &str) -> Result<SendReceipt, InmoError> {
        let mut request = self.client.post(self.url("/send")).json(&SendRequest {
            to: recipient,
            body: text,
            sender: &self.config.sender_id,
        });
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InmoError::upstream("send_text", "tiempo de espera agotado")
            } else {
                InmoError::upstream("send_text", e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(InmoError::upstream(
                "send_text",
                format!("{status}: {detail}"),
            ));
        }

        let body: SendResponse = response
            .json()
            .await
            .map_err(|e| InmoError::upstream("send_text", e))?;
        Ok(SendReceipt {
            message_id: body.message_id,
        })
    }

    async fn session_ready(&self) -> bool {
        let mut request = self.client.get(self.url("/status"));
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }
        match request.send().await {
            Ok(r) => r
                .json::<StatusResponse>()
                .await
                .map(|s| s.ready)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn stop(&self) -> Result<(), InmoError> {
        self.stopped.store(true, Ordering::Relaxed);
        Ok(())
    }
}
