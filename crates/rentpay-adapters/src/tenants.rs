//! In-memory tenant store, optionally hydrated from a JSON seed file.

use rentpay_core::{StoreError, Tenant, TenantStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read-only tenant records keyed by the phone number string the gateway
/// presents. Persistent multi-tenant storage is out of scope; this store is
/// the documented black-box contract only.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTenantStore {
    tenants: BTreeMap<String, Tenant>,
}

impl InMemoryTenantStore {
    pub fn new(records: impl IntoIterator<Item = Tenant>) -> Self {
        Self {
            tenants: records
                .into_iter()
                .map(|tenant| (tenant.phone.clone(), tenant))
                .collect(),
        }
    }

    /// Loads a JSON array of tenant records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let bytes = fs::read(path)?;
        let records: Vec<Tenant> = serde_json::from_slice(&bytes)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        Ok(Self::new(records))
    }

    /// The built-in demo seed used when no seed file is supplied.
    pub fn demo_seed() -> Self {
        Self::new([
            Tenant {
                phone: "+254792138852".to_string(),
                name: "John".to_string(),
                unit: "HSe no. 4".to_string(),
                property: "Killimani estate".to_string(),
                rent_due: 5,
                last_payment: "2024-01-15".to_string(),
            },
            Tenant {
                phone: "+254715035359".to_string(),
                name: "Kenn".to_string(),
                unit: "HSe no. 12".to_string(),
                property: "Westlands".to_string(),
                rent_due: 30_000,
                last_payment: "2024-01-10".to_string(),
            },
        ])
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

impl TenantStore for InMemoryTenantStore {
    fn lookup(&self, phone: &str) -> Option<Tenant> {
        self.tenants.get(phone).cloned()
    }

    fn list(&self) -> Vec<Tenant> {
        self.tenants.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn demo_seed_serves_the_known_records() {
        let store = InMemoryTenantStore::demo_seed();
        assert_eq!(store.len(), 2);
        let kenn = store.lookup("+254715035359").unwrap();
        assert_eq!(kenn.name, "Kenn");
        assert_eq!(kenn.rent_due, 30_000);
        assert!(store.lookup("+254700000000").is_none());
    }

    #[test]
    fn seed_file_round_trips() {
        let path = std::env::temp_dir().join(format!("rentpay-tenants-{}.json", Uuid::new_v4()));
        let records = InMemoryTenantStore::demo_seed().list();
        fs::write(&path, serde_json::to_vec(&records).unwrap()).unwrap();

        let store = InMemoryTenantStore::load(&path).unwrap();
        assert_eq!(store.list(), records);
        fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_seed_file_is_a_serialization_error() {
        let path = std::env::temp_dir().join(format!("rentpay-bad-seed-{}.json", Uuid::new_v4()));
        fs::write(&path, b"{not json").unwrap();
        let err = InMemoryTenantStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        fs::remove_file(path).ok();
    }
}
