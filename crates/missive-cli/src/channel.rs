use crate::error::invalid_input;
use anyhow::Result;
use missive_config::{ChannelBackend, ChannelConfig};
use missive_core::channel::{DeliveryError, DeliveryReceipt, MessageChannel};
use std::io::{self, Write};

const WA_ME_BASE: &str = "https://wa.me/";

/// Writes each message to the terminal. Uses stderr when stdout carries JSON.
pub struct ConsoleChannel {
    to_stderr: bool,
}

impl ConsoleChannel {
    pub fn new(to_stderr: bool) -> Self {
        Self { to_stderr }
    }
}

impl MessageChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, phone: &str, text: &str) -> std::result::Result<DeliveryReceipt, DeliveryError> {
        let written = if self.to_stderr {
            writeln!(io::stderr().lock(), "{phone}: {text}")
        } else {
            writeln!(io::stdout().lock(), "{phone}: {text}")
        };
        written.map_err(|err| DeliveryError::new(format!("write failed: {err}")))?;
        Ok(DeliveryReceipt::new(self.name()))
    }
}

/// Manual fallback: produces a click-to-chat link per contact instead of sending.
pub struct LinkChannel;

impl MessageChannel for LinkChannel {
    fn name(&self) -> &str {
        "link"
    }

    fn send(&self, phone: &str, text: &str) -> std::result::Result<DeliveryReceipt, DeliveryError> {
        let link = click_to_chat_link(phone, text)?;
        Ok(DeliveryReceipt::new(self.name()).with_reference(link))
    }
}

pub fn click_to_chat_link(phone: &str, text: &str) -> std::result::Result<String, DeliveryError> {
    if phone.is_empty() || !phone.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(DeliveryError::new(format!("invalid phone number: {phone:?}")));
    }
    Ok(format!(
        "{WA_ME_BASE}{phone}?text={}",
        urlencoding::encode(text)
    ))
}

#[cfg(feature = "webhook")]
pub struct WebhookChannel {
    url: url::Url,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "webhook")]
impl WebhookChannel {
    pub fn new(config: &missive_config::WebhookConfig) -> Result<Self> {
        use std::env;
        use std::time::Duration;

        let token = match config.token_env.as_deref() {
            Some(name) => {
                let value = env::var(name)
                    .map_err(|_| invalid_input(format!("missing env var {name}")))?;
                let value = value.trim();
                if value.is_empty() {
                    return Err(invalid_input(format!("env var {name} is empty")));
                }
                Some(value.to_string())
            }
            None => None,
        };

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("missive/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            url: config.url.clone(),
            token,
            client,
        })
    }
}

#[cfg(feature = "webhook")]
impl MessageChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    fn send(&self, phone: &str, text: &str) -> std::result::Result<DeliveryReceipt, DeliveryError> {
        let mut request = self
            .client
            .post(self.url.clone())
            .json(&serde_json::json!({ "phone": phone, "message": text }));
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|err| DeliveryError::new(format!("webhook request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::new(format!("webhook returned {status}")));
        }

        let body = response.text().unwrap_or_default();
        let reference = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("id").and_then(|id| id.as_str()).map(str::to_string));

        let receipt = DeliveryReceipt::new(self.name());
        Ok(match reference {
            Some(reference) => receipt.with_reference(reference),
            None => receipt,
        })
    }
}

pub fn build_channel(
    backend: ChannelBackend,
    config: &ChannelConfig,
    json_output: bool,
) -> Result<Box<dyn MessageChannel>> {
    match backend {
        ChannelBackend::Stdout => Ok(Box::new(ConsoleChannel::new(json_output))),
        ChannelBackend::Link => Ok(Box::new(LinkChannel)),
        ChannelBackend::Webhook => build_webhook(config),
    }
}

#[cfg(feature = "webhook")]
fn build_webhook(config: &ChannelConfig) -> Result<Box<dyn MessageChannel>> {
    let webhook = config
        .webhook
        .as_ref()
        .ok_or_else(|| invalid_input("webhook channel requires [channel.webhook] in config"))?;
    Ok(Box::new(WebhookChannel::new(webhook)?))
}

#[cfg(not(feature = "webhook"))]
fn build_webhook(_config: &ChannelConfig) -> Result<Box<dyn MessageChannel>> {
    Err(invalid_input(
        "webhook channel not available (built without the webhook feature)",
    ))
}
