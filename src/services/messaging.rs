//! Route notifications over SMS and WhatsApp
//!
//! Formatting is a one-way display transform: stops render in sequence
//! order with location, address and estimated time when present. The
//! hand-off goes through a [`Messenger`]; without Twilio credentials a
//! mock provider logs the message and fabricates an id, matching how the
//! integration ran before credentials existed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::RouteStop;

/// Twilio credentials
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// Twilio phone number (sender)
    pub from_number: String,
}

impl TwilioConfig {
    pub fn new(account_sid: &str, auth_token: &str, from_number: &str) -> Self {
        Self {
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok()?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN").ok()?;
        let from_number = std::env::var("TWILIO_FROM_NUMBER").ok()?;

        Some(Self::new(&account_sid, &auth_token, &from_number))
    }
}

/// Messaging channel, which also decides the formatting variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Sms,
    WhatsApp,
}

impl Channel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::WhatsApp => "whatsapp",
        }
    }
}

/// Render stops as a plain-text SMS body
pub fn format_sms(stops: &[RouteStop]) -> String {
    let mut text = String::from("Your optimized route:\n\n");

    if stops.is_empty() {
        text.push_str("No route information available");
        return text;
    }

    for (index, stop) in in_sequence(stops).iter().enumerate() {
        text.push_str(&format!(
            "{}. {}: {}\n",
            index + 1,
            display_location(stop),
            display_address(stop)
        ));
        if let Some(time) = &stop.estimated_time {
            text.push_str(&format!("   Estimated time: {}\n", time));
        }
        text.push('\n');
    }

    text
}

/// Render stops with WhatsApp's lightweight markup
pub fn format_whatsapp(stops: &[RouteStop]) -> String {
    let mut text = String::from("*Your Optimized Route*\n\n");

    if stops.is_empty() {
        text.push_str("No route information available");
        return text;
    }

    for (index, stop) in in_sequence(stops).iter().enumerate() {
        text.push_str(&format!(
            "*{}.* {}: {}\n",
            index + 1,
            display_location(stop),
            display_address(stop)
        ));
        if let Some(time) = &stop.estimated_time {
            text.push_str(&format!("   _Estimated time:_ {}\n", time));
        }
        text.push('\n');
    }

    text
}

fn in_sequence(stops: &[RouteStop]) -> Vec<&RouteStop> {
    let mut ordered: Vec<&RouteStop> = stops.iter().collect();
    ordered.sort_by_key(|s| s.sequence);
    ordered
}

fn display_location(stop: &RouteStop) -> &str {
    if stop.location.is_empty() {
        "Stop"
    } else {
        &stop.location
    }
}

fn display_address(stop: &RouteStop) -> &str {
    if stop.address.is_empty() {
        "N/A"
    } else {
        &stop.address
    }
}

/// Delivers a formatted message, returning a provider message id
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Twilio-backed messenger for one channel
pub struct TwilioMessenger {
    client: Client,
    config: TwilioConfig,
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct TwilioResponse {
    sid: String,
}

impl TwilioMessenger {
    pub fn new(config: TwilioConfig, channel: Channel) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            channel,
        }
    }

    fn address(&self, number: &str) -> String {
        match self.channel {
            Channel::Sms => number.to_string(),
            Channel::WhatsApp => format!("whatsapp:{}", number),
        }
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let params = [
            ("To", self.address(to)),
            ("From", self.address(&self.config.from_number)),
            ("Body", body.to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notification(format!(
                "Twilio returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: TwilioResponse = response.json().await?;
        info!("Sent {} message {}", self.channel.as_str(), parsed.sid);
        Ok(parsed.sid)
    }

    fn name(&self) -> &str {
        match self.channel {
            Channel::Sms => "twilio-sms",
            Channel::WhatsApp => "twilio-whatsapp",
        }
    }
}

/// Logs the message and returns a fabricated id
pub struct MockMessenger {
    channel: Channel,
}

impl MockMessenger {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<String> {
        info!("Would send {} to {}: {} bytes", self.channel.as_str(), to, body.len());
        let message_id = match self.channel {
            Channel::Sms => format!("mock-message-id-{}", Utc::now().timestamp_millis()),
            Channel::WhatsApp => {
                format!("mock-whatsapp-message-id-{}", Utc::now().timestamp_millis())
            }
        };
        Ok(message_id)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Pick the Twilio messenger when credentials exist, the mock otherwise
pub fn create_messenger(channel: Channel, config: Option<&TwilioConfig>) -> Arc<dyn Messenger> {
    match config {
        Some(config) => Arc::new(TwilioMessenger::new(config.clone(), channel)),
        None => {
            warn!(
                "No Twilio configuration - {} messages will not actually be sent",
                channel.as_str()
            );
            Arc::new(MockMessenger::new(channel))
        }
    }
}
