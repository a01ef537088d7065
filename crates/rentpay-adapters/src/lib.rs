//! Collaborator adapters for RentPay.

#![deny(unsafe_code)]

pub mod daraja;
pub mod mock;
pub mod sms;
pub mod tenants;

pub use daraja::{DarajaClient, DarajaConfig, DarajaError};
pub use mock::{AcceptAllGateway, LoggingSmsSender, RecordingGateway, UnreachableGateway};
pub use sms::{AfricasTalkingSms, SmsConfig, SmsError, SmsReceipt, SmsSender};
pub use tenants::InMemoryTenantStore;
