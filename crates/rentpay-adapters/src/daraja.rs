//! Daraja (M-Pesa) push-payment client.
//!
//! Owns OAuth token acquisition with caching, STK password generation, and
//! the single push-payment call. Transport failures are logged here with
//! full detail and collapse to [`PaymentInitiation::TransportError`]; no raw
//! transport text ever reaches a subscriber screen.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use rentpay_core::{PaymentGateway, PaymentInitiation, StkPushRequest};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error};

pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

/// Bounded timeout on every outbound call; past it the push is a transport
/// error and the subscriber must re-dial.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Cached tokens are refreshed once 80% of the provider lifetime has
/// elapsed, keeping authentication latency off the session path.
const TOKEN_LIFETIME_FRACTION: f64 = 0.8;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct DarajaConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub shortcode: String,
    pub passkey: String,
    pub sandbox: bool,
    pub callback_url: String,
}

impl DarajaConfig {
    pub fn base_url(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.consumer_key.is_empty()
            && !self.consumer_secret.is_empty()
            && !self.shortcode.is_empty()
            && !self.passkey.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum DarajaError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("OAuth response carried no access token")]
    MissingToken,
    #[error("Daraja transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed Daraja response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct OauthResponse {
    access_token: Option<String>,
    /// The sandbox returns this as a string, production as a number.
    expires_in: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StkResponse {
    #[serde(rename = "ResponseCode")]
    response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    response_description: Option<String>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

struct CachedToken {
    token: String,
    refresh_after: Instant,
}

impl CachedToken {
    /// Caches a fresh token, scheduling its refresh at
    /// [`TOKEN_LIFETIME_FRACTION`] of the provider-reported lifetime.
    fn store(token: String, ttl_secs: u64, now: Instant) -> Self {
        Self {
            token,
            refresh_after: now
                + Duration::from_secs_f64(ttl_secs as f64 * TOKEN_LIFETIME_FRACTION),
        }
    }

    /// The cached token, as long as the refresh deadline has not passed.
    fn token_if_fresh(&self, now: Instant) -> Option<&str> {
        (now < self.refresh_after).then_some(self.token.as_str())
    }
}

/// Authenticated Daraja client implementing the payment collaborator seam.
pub struct DarajaClient {
    config: DarajaConfig,
    http: Client,
    token: Mutex<Option<CachedToken>>,
}

impl DarajaClient {
    pub fn new(config: DarajaConfig) -> Result<Self, DarajaError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DarajaError::Client)?;
        Ok(Self {
            config,
            http,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, DarajaError> {
        let mut cache = self.token.lock().await;
        if let Some(token) = cache
            .as_ref()
            .and_then(|cached| cached.token_if_fresh(Instant::now()))
        {
            return Ok(token.to_string());
        }

        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.config.base_url()
        );
        let body: OauthResponse = self
            .http
            .get(url)
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = body.access_token.ok_or(DarajaError::MissingToken)?;
        let ttl = parse_expires_in(body.expires_in.as_ref());
        *cache = Some(CachedToken::store(token.clone(), ttl, Instant::now()));
        debug!(ttl, "fetched fresh Daraja access token");
        Ok(token)
    }

    async fn send_push(&self, request: &StkPushRequest) -> Result<StkResponse, DarajaError> {
        let token = self.access_token().await?;
        let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let password = stk_password(&self.config.shortcode, &self.config.passkey, &timestamp);

        let payload = json!({
            "BusinessShortCode": self.config.shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": "CustomerPayBillOnline",
            "Amount": request.amount,
            "PartyA": request.phone,
            "PartyB": self.config.shortcode,
            "PhoneNumber": request.phone,
            "CallBackURL": self.config.callback_url,
            "AccountReference": request.account_ref,
            "TransactionDesc": request.description,
        });

        let response: StkResponse = self
            .http
            .post(format!(
                "{}/mpesa/stkpush/v1/processrequest",
                self.config.base_url()
            ))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl PaymentGateway for DarajaClient {
    fn label(&self) -> &'static str {
        "daraja"
    }

    async fn push_pay(&self, request: StkPushRequest) -> PaymentInitiation {
        match self.send_push(&request).await {
            Ok(response) => map_initiation(response),
            Err(err) => {
                error!(
                    trace_id = %request.trace_id,
                    error = %err,
                    "STK push transport failure"
                );
                PaymentInitiation::TransportError
            }
        }
    }
}

/// `base64(shortcode + passkey + timestamp)` as the STK endpoint requires.
pub fn stk_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    BASE64.encode(format!("{shortcode}{passkey}{timestamp}"))
}

/// `ResponseCode == "0"` is the provider's acceptance sentinel; anything
/// else in a parsed body is a rejection with the provider's own message.
fn map_initiation(response: StkResponse) -> PaymentInitiation {
    match response.response_code.as_deref() {
        Some("0") => PaymentInitiation::Accepted,
        _ => PaymentInitiation::Rejected {
            reason: response
                .error_message
                .or(response.response_description)
                .unwrap_or_else(|| "Unknown error".to_string()),
        },
    }
}

fn parse_expires_in(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        Some(Value::String(s)) => s.parse().unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        _ => DEFAULT_TOKEN_TTL_SECS,
    }
}
