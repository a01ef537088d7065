//! Payment trigger: push-request construction and outcome mapping.

use crate::msisdn::normalize_msisdn;
use crate::screens;
use crate::types::{PaymentInitiation, Screen, StkPushRequest, Tenant};
use async_trait::async_trait;

/// Provider-imposed limit on `TransactionDesc`; external protocol constraint.
pub const MAX_DESCRIPTION_CHARS: usize = 13;

/// Pluggable push-payment collaborator.
///
/// Implementations own authentication (token caching included) and the
/// bounded request timeout; the trigger only sees the discriminated outcome.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn label(&self) -> &'static str;

    async fn push_pay(&self, request: StkPushRequest) -> PaymentInitiation;
}

/// Builds the push request for a tenant's full amount owed.
///
/// No partial payments: the amount is always `rent_due`. The account
/// reference is derived from the unit identifier and the description is
/// truncated to the provider limit before it ever leaves the core.
pub fn build_push_request(phone: &str, tenant: &Tenant) -> StkPushRequest {
    StkPushRequest {
        trace_id: StkPushRequest::trace_id(),
        phone: normalize_msisdn(phone),
        amount: tenant.rent_due,
        account_ref: format!("RENT_{}", tenant.unit),
        description: truncate_description(&format!("Rent {}", tenant.property)),
    }
}

/// Char-boundary-safe truncation to [`MAX_DESCRIPTION_CHARS`].
pub fn truncate_description(description: &str) -> String {
    description.chars().take(MAX_DESCRIPTION_CHARS).collect()
}

/// Maps the collaborator outcome 1:1 to the next screen.
pub fn initiation_screen(outcome: &PaymentInitiation) -> Screen {
    match outcome {
        PaymentInitiation::Accepted => screens::stk_sent(),
        PaymentInitiation::Rejected { reason } => screens::stk_rejected(reason),
        PaymentInitiation::TransportError => screens::payment_failed(),
    }
}
