//! Tenant store collaborator seam.

use crate::types::Tenant;
use thiserror::Error;

/// Errors raised while hydrating a tenant store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("tenant store IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tenant store serialization error: {0}")]
    Serialization(String),
}

/// Read-only subscriber lookup, keyed by the phone number string the gateway
/// presents. An absent record is an expected outcome (unregistered
/// subscriber), never an error.
pub trait TenantStore: Send + Sync {
    fn lookup(&self, phone: &str) -> Option<Tenant>;

    /// Full listing for the operator surface.
    fn list(&self) -> Vec<Tenant>;
}
