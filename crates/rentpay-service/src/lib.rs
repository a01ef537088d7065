#![deny(unsafe_code)]

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rentpay_adapters::{
    AfricasTalkingSms, DarajaClient, DarajaConfig, DarajaError, InMemoryTenantStore, SmsConfig,
    SmsError, SmsSender,
};
use rentpay_adapters::sms::rent_invoice_message;
use rentpay_core::{PaymentGateway, Resolver, StoreError, Tenant, TenantStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_USSD_CODE: &str = "*384*11897#";

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// JSON tenant seed file; the built-in demo seed is used when absent.
    pub tenants_path: Option<PathBuf>,
    /// `None` or unconfigured credentials run with no payment gateway.
    pub daraja: Option<DarajaConfig>,
    pub sms: Option<SmsConfig>,
    pub ussd_code: Option<String>,
}

#[derive(Clone)]
pub struct ServiceState {
    pub resolver: Arc<Resolver>,
    pub store: Arc<dyn TenantStore>,
    pub sms: Option<Arc<dyn SmsSender>>,
    pub ussd_code: String,
}

impl ServiceState {
    pub fn bootstrap(config: ServiceConfig) -> Result<Self, ServiceError> {
        let store: Arc<dyn TenantStore> = Arc::new(match &config.tenants_path {
            Some(path) => InMemoryTenantStore::load(path)?,
            None => InMemoryTenantStore::demo_seed(),
        });

        let gateway: Option<Arc<dyn PaymentGateway>> = match config.daraja {
            Some(daraja) if daraja.is_configured() => {
                Some(Arc::new(DarajaClient::new(daraja)?) as Arc<dyn PaymentGateway>)
            }
            Some(_) | None => {
                warn!("Daraja credentials missing; push payments disabled");
                None
            }
        };

        let sms: Option<Arc<dyn SmsSender>> = match config.sms {
            Some(sms) if sms.is_configured() => {
                Some(Arc::new(AfricasTalkingSms::new(sms)?) as Arc<dyn SmsSender>)
            }
            Some(_) | None => {
                warn!("SMS credentials missing; invoice sending disabled");
                None
            }
        };

        Ok(Self::assemble(
            store,
            gateway,
            sms,
            config.ussd_code.unwrap_or_else(|| DEFAULT_USSD_CODE.to_string()),
        ))
    }

    /// Direct wiring seam for tests and embedded use.
    pub fn assemble(
        store: Arc<dyn TenantStore>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        sms: Option<Arc<dyn SmsSender>>,
        ussd_code: String,
    ) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(store.clone(), gateway)),
            store,
            sms,
            ussd_code,
        }
    }
}

pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/ussd", post(ussd))
        .route("/mpesa/callback", post(mpesa_callback))
        .route("/v1/health", get(health))
        .route("/v1/tenants", get(list_tenants))
        .route("/v1/invoices", post(send_invoices))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("tenant store error: {0}")]
    Store(#[from] StoreError),
    #[error("payment gateway error: {0}")]
    Gateway(#[from] DarajaError),
    #[error("SMS sender error: {0}")]
    Sms(#[from] SmsError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http { status: StatusCode, message: String },
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self::Http {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Http { status, message } => {
                (status, Json(serde_json::json!({ "error": message }))).into_response()
            }
        }
    }
}

/// Inbound gateway request; the gateway echoes the full keystroke trail in
/// `text` on every request.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayRequest {
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
    #[serde(rename = "serviceCode", default)]
    pub service_code: String,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
    #[serde(default)]
    pub text: String,
}

/// The one USSD endpoint. The response body is plain text and always starts
/// with `CON ` or `END `; anything else would be a protocol violation.
async fn ussd(State(state): State<ServiceState>, Form(request): Form<GatewayRequest>) -> String {
    info!(
        session_id = %request.session_id,
        service_code = %request.service_code,
        trail = %request.text,
        "gateway request"
    );
    state
        .resolver
        .resolve(&request.phone_number, &request.text)
        .await
        .render()
}

/// Asynchronous payment-completion callback. Receipt is acknowledged with a
/// fixed success body; no state update happens here.
async fn mpesa_callback(Json(payload): Json<serde_json::Value>) -> Json<serde_json::Value> {
    info!(payload = %payload, "payment callback received");
    Json(serde_json::json!({
        "status": "success",
        "message": "Callback received"
    }))
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    payment_gateway: &'static str,
    tenants: usize,
}

async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "rentpay-service",
        payment_gateway: state.resolver.gateway_label(),
        tenants: state.store.list().len(),
    })
}

async fn list_tenants(State(state): State<ServiceState>) -> Json<Vec<Tenant>> {
    Json(state.store.list())
}

#[derive(Debug, Clone, Deserialize)]
struct InvoiceRequest {
    phones: Vec<String>,
    /// Overrides the stored amount owed when present.
    amount: Option<u64>,
    due_date: String,
}

#[derive(Debug, Clone, Serialize)]
struct InvoiceOutcome {
    phone: String,
    sent: bool,
    message_id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct InvoiceSummary {
    total: usize,
    success_count: usize,
    failure_count: usize,
    results: Vec<InvoiceOutcome>,
}

/// Sends rent invoice SMS to one or more tenants.
async fn send_invoices(
    State(state): State<ServiceState>,
    Json(request): Json<InvoiceRequest>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    if request.phones.is_empty() {
        return Err(ApiError::bad_request("no tenants selected"));
    }
    let sms = state
        .sms
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("SMS sender is not configured"))?;

    let mut results = Vec::with_capacity(request.phones.len());
    for phone in &request.phones {
        let outcome = match state.store.lookup(phone) {
            None => InvoiceOutcome {
                phone: phone.clone(),
                sent: false,
                message_id: None,
                error: Some("tenant not registered".to_string()),
            },
            Some(tenant) => {
                let amount = request.amount.unwrap_or(tenant.rent_due);
                let message =
                    rent_invoice_message(&tenant, amount, &request.due_date, &state.ussd_code);
                match sms.send(&tenant.phone, &message).await {
                    Ok(receipt) => InvoiceOutcome {
                        phone: phone.clone(),
                        sent: true,
                        message_id: receipt.message_id,
                        error: None,
                    },
                    Err(err) => InvoiceOutcome {
                        phone: phone.clone(),
                        sent: false,
                        message_id: None,
                        error: Some(err.to_string()),
                    },
                }
            }
        };
        results.push(outcome);
    }

    let success_count = results.iter().filter(|r| r.sent).count();
    Ok(Json(InvoiceSummary {
        total: results.len(),
        success_count,
        failure_count: results.len() - success_count,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rentpay_adapters::{LoggingSmsSender, RecordingGateway};
    use rentpay_core::PaymentInitiation;
    use tower::ServiceExt;

    const JOHN_ENCODED: &str = "%2B254792138852";

    fn app_with(
        outcome: PaymentInitiation,
        sms: Option<Arc<dyn SmsSender>>,
    ) -> (Router, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::new(outcome));
        let state = ServiceState::assemble(
            Arc::new(InMemoryTenantStore::demo_seed()),
            Some(gateway.clone()),
            sms,
            DEFAULT_USSD_CODE.to_string(),
        );
        (build_router(state), gateway)
    }

    fn ussd_request(phone_encoded: &str, text: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ussd")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "sessionId=s1&serviceCode=%2A384%2A11897%23&phoneNumber={phone_encoded}&text={text}"
            )))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn root_request_greets_a_known_tenant() {
        let (app, _) = app_with(PaymentInitiation::Accepted, None);
        let response = app.oneshot(ussd_request(JOHN_ENCODED, "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.starts_with("CON Welcome, John"), "body: {body}");
    }

    #[tokio::test]
    async fn root_request_offers_registration_to_unknown_subscriber() {
        let (app, _) = app_with(PaymentInitiation::Accepted, None);
        let response = app
            .oneshot(ussd_request("%2B254700000000", ""))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.starts_with("CON Welcome to RentPay USSD"));
    }

    #[tokio::test]
    async fn every_response_carries_a_gateway_prefix() {
        let trails = ["", "0", "1", "2", "2*1", "2*1*1", "9", "garbage", "2*1*1%23"];
        for trail in trails {
            let (app, _) = app_with(PaymentInitiation::Accepted, None);
            let response = app.oneshot(ussd_request(JOHN_ENCODED, trail)).await.unwrap();
            let body = body_text(response).await;
            assert!(
                body.starts_with("CON ") || body.starts_with("END "),
                "trail {trail} produced: {body}"
            );
        }
    }

    #[tokio::test]
    async fn push_node_drives_the_gateway_and_reports_pin_prompt() {
        let (app, gateway) = app_with(PaymentInitiation::Accepted, None);
        let response = app
            .oneshot(ussd_request(JOHN_ENCODED, "2*1*1"))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.starts_with("CON M-Pesa STK Push Sent!"));

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].phone, "254792138852");
        assert_eq!(requests[0].amount, 5);
    }

    #[tokio::test]
    async fn rejected_push_terminates_with_the_provider_reason() {
        let (app, _) = app_with(
            PaymentInitiation::Rejected {
                reason: "Insufficient funds".to_string(),
            },
            None,
        );
        let response = app
            .oneshot(ussd_request(JOHN_ENCODED, "2*1*1"))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert_eq!(body, "END STK push failed: Insufficient funds");
    }

    #[tokio::test]
    async fn invalid_choice_terminates_cleanly() {
        let (app, _) = app_with(PaymentInitiation::Accepted, None);
        let response = app.oneshot(ussd_request(JOHN_ENCODED, "7")).await.unwrap();
        let body = body_text(response).await;
        assert_eq!(body, "END Invalid choice. Please dial again.");
    }

    #[tokio::test]
    async fn callback_always_acks_with_the_fixed_body() {
        let (app, _) = app_with(PaymentInitiation::Accepted, None);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mpesa/callback")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"Body": {"stkCallback": {"ResultCode": 0}}}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Callback received");
    }

    #[tokio::test]
    async fn health_reports_gateway_mode_and_tenant_count() {
        let (app, _) = app_with(PaymentInitiation::Accepted, None);
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["payment_gateway"], "recording");
        assert_eq!(body["tenants"], 2);
    }

    #[tokio::test]
    async fn tenants_endpoint_lists_the_seed() {
        let (app, _) = app_with(PaymentInitiation::Accepted, None);
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/tenants")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let tenants: Vec<Tenant> = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(tenants.len(), 2);
    }

    #[tokio::test]
    async fn invoices_summarize_per_tenant_outcomes() {
        let (app, _) = app_with(
            PaymentInitiation::Accepted,
            Some(Arc::new(LoggingSmsSender) as Arc<dyn SmsSender>),
        );
        let payload = serde_json::json!({
            "phones": ["+254792138852", "+254700000000"],
            "due_date": "2024-02-01"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/invoices")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["total"], 2);
        assert_eq!(body["success_count"], 1);
        assert_eq!(body["failure_count"], 1);
    }

    #[tokio::test]
    async fn invoices_require_a_configured_sender() {
        let (app, _) = app_with(PaymentInitiation::Accepted, None);
        let payload = serde_json::json!({
            "phones": ["+254792138852"],
            "due_date": "2024-02-01"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/invoices")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
