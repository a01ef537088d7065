//! RentPay USSD core.
//!
//! The whole session protocol is stateless per request: the carrier gateway
//! echoes back the full keystroke trail on every request, and the resolver
//! recomputes the current screen from (phone, trail) alone. The only side
//! effect anywhere in the core is the single push-payment call behind the
//! [`PaymentGateway`] seam.

#![deny(unsafe_code)]

pub mod menu;
pub mod money;
pub mod msisdn;
pub mod payment;
pub mod resolver;
pub mod screens;
pub mod store;
pub mod types;

pub use menu::{NodeId, Walk};
pub use msisdn::normalize_msisdn;
pub use payment::{PaymentGateway, MAX_DESCRIPTION_CHARS};
pub use resolver::Resolver;
pub use store::{StoreError, TenantStore};
pub use types::{Disposition, PaymentInitiation, Screen, StkPushRequest, Tenant};
