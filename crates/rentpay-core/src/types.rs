use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered tenant record as served by the tenant store.
///
/// Immutable for the duration of a session. `rent_due` is whole KES units;
/// partial payments are not supported anywhere in the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub phone: String,
    pub name: String,
    pub unit: String,
    pub property: String,
    pub rent_due: u64,
    /// Opaque display string from the billing system.
    pub last_payment: String,
}

/// Whether the gateway should keep the session open after this screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Continue,
    Terminate,
}

/// Resolver output: a disposition paired with prompt text. No other session
/// state exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub disposition: Disposition,
    pub text: String,
}

impl Screen {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Continue,
            text: text.into(),
        }
    }

    pub fn terminal(text: impl Into<String>) -> Self {
        Self {
            disposition: Disposition::Terminate,
            text: text.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.disposition == Disposition::Terminate
    }

    /// Wire rendering for the carrier gateway.
    ///
    /// Every gateway response body starts with `CON ` or `END `; a body
    /// lacking the prefix is a protocol violation, so this is the only way a
    /// screen leaves the core.
    pub fn render(&self) -> String {
        match self.disposition {
            Disposition::Continue => format!("CON {}", self.text),
            Disposition::Terminate => format!("END {}", self.text),
        }
    }
}

/// Push-payment request handed to the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StkPushRequest {
    pub trace_id: String,
    /// Normalized MSISDN, no leading `+`.
    pub phone: String,
    /// Whole KES units; always the tenant's full amount owed.
    pub amount: u64,
    pub account_ref: String,
    /// Already truncated to the provider's 13-character limit.
    pub description: String,
}

impl StkPushRequest {
    pub fn trace_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Discriminated outcome of a push-payment initiation, mapped 1:1 to a
/// screen by the payment trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInitiation {
    Accepted,
    /// Provider declined; the reason is the provider's own message and is
    /// shown to the subscriber verbatim.
    Rejected { reason: String },
    /// Timeout, non-2xx, or malformed body. Detail is logged by the adapter
    /// and never reaches a subscriber screen.
    TransportError,
}
