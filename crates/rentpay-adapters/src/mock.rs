//! Deterministic collaborator fixtures for tests and local runs.

use crate::sms::{SmsError, SmsReceipt, SmsSender};
use async_trait::async_trait;
use rentpay_core::{PaymentGateway, PaymentInitiation, StkPushRequest};
use std::sync::Mutex;
use tracing::info;

/// Gateway that accepts every push request.
#[derive(Debug, Clone, Default)]
pub struct AcceptAllGateway;

#[async_trait]
impl PaymentGateway for AcceptAllGateway {
    fn label(&self) -> &'static str {
        "accept-all"
    }

    async fn push_pay(&self, _request: StkPushRequest) -> PaymentInitiation {
        PaymentInitiation::Accepted
    }
}

/// Gateway that simulates an unreachable provider.
#[derive(Debug, Clone, Default)]
pub struct UnreachableGateway;

#[async_trait]
impl PaymentGateway for UnreachableGateway {
    fn label(&self) -> &'static str {
        "unreachable"
    }

    async fn push_pay(&self, _request: StkPushRequest) -> PaymentInitiation {
        PaymentInitiation::TransportError
    }
}

/// Gateway returning a scripted outcome while recording every request for
/// assertions.
pub struct RecordingGateway {
    outcome: PaymentInitiation,
    requests: Mutex<Vec<StkPushRequest>>,
}

impl RecordingGateway {
    pub fn new(outcome: PaymentInitiation) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self::new(PaymentInitiation::Rejected {
            reason: reason.into(),
        })
    }

    pub fn requests(&self) -> Vec<StkPushRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    fn label(&self) -> &'static str {
        "recording"
    }

    async fn push_pay(&self, request: StkPushRequest) -> PaymentInitiation {
        self.requests.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

/// SMS sender that only logs, for environments without provider credentials.
#[derive(Debug, Clone, Default)]
pub struct LoggingSmsSender;

#[async_trait]
impl SmsSender for LoggingSmsSender {
    fn provider(&self) -> &'static str {
        "logging"
    }

    async fn send(&self, to: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        info!(to, message, "SMS logged instead of sent");
        Ok(SmsReceipt {
            message_id: None,
            provider: self.provider(),
        })
    }
}
