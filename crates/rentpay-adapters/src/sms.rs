//! SMS invoice delivery via Africa's Talking.

use async_trait::async_trait;
use rentpay_core::money::format_kes;
use rentpay_core::Tenant;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://api.africastalking.com/version1/messaging";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub api_key: String,
    pub username: String,
    pub sender_id: String,
    pub api_url: String,
}

impl SmsConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.username.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("SMS transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("SMS provider rejected the message: {0}")]
    Provider(String),
}

#[derive(Debug, Clone)]
pub struct SmsReceipt {
    pub message_id: Option<String>,
    pub provider: &'static str,
}

/// Outbound SMS collaborator used by the operator invoice endpoints. The
/// USSD session flow itself never sends SMS.
#[async_trait]
pub trait SmsSender: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn send(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError>;
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AtRecipient {
    #[serde(rename = "messageId")]
    message_id: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AtMessageData {
    #[serde(rename = "Recipients")]
    recipients: Vec<AtRecipient>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AtResponse {
    #[serde(rename = "SMSMessageData")]
    message_data: AtMessageData,
}

/// Africa's Talking messaging API client.
pub struct AfricasTalkingSms {
    config: SmsConfig,
    http: Client,
}

impl AfricasTalkingSms {
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SmsError::Client)?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl SmsSender for AfricasTalkingSms {
    fn provider(&self) -> &'static str {
        "africastalking"
    }

    async fn send(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let response: AtResponse = self
            .http
            .post(&self.config.api_url)
            .header("apiKey", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("username", self.config.username.as_str()),
                ("to", to),
                ("message", message),
                ("from", self.config.sender_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let recipient = response
            .message_data
            .recipients
            .into_iter()
            .next()
            .ok_or_else(|| SmsError::Provider("no recipients in response".to_string()))?;
        info!(to, status = ?recipient.status, "invoice SMS dispatched");
        Ok(SmsReceipt {
            message_id: recipient.message_id,
            provider: self.provider(),
        })
    }
}

/// Renders the rent invoice message for a tenant.
pub fn rent_invoice_message(tenant: &Tenant, amount: u64, due_date: &str, ussd_code: &str) -> String {
    format!(
        "RENT INVOICE\n\nDear {},\nHouse: {}\nEstate: {}\nRent Due: KES {}\nDue Date: {}\n\nTo pay, dial: {}\n\nThank you,\nRentPay Team",
        tenant.name,
        tenant.unit,
        tenant.property,
        format_kes(amount),
        due_date,
        ussd_code
    )
}
