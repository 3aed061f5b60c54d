//! Persistence boundary for per-charge-point settings.
//!
//! The trait is the contract; this crate ships only an in-memory backend
//! since a real database is out of scope for the core gateway. Swapping in
//! a Postgres-backed implementation means implementing this trait, nothing
//! upstream changes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ChargePointSettings;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn upsert(&self, charge_point_id: &str, settings: ChargePointSettings);
    async fn load_all(&self) -> HashMap<String, ChargePointSettings>;
}

pub type SharedSettingsRepository = Arc<dyn SettingsRepository>;

#[derive(Default)]
pub struct InMemorySettingsRepository {
    store: RwLock<HashMap<String, ChargePointSettings>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn upsert(&self, charge_point_id: &str, settings: ChargePointSettings) {
        self.store.write().await.insert(charge_point_id.to_string(), settings);
    }

    async fn load_all(&self) -> HashMap<String, ChargePointSettings> {
        self.store.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OcppVersion;

    #[tokio::test]
    async fn upsert_then_load_all_roundtrips() {
        let repo = InMemorySettingsRepository::new();
        repo.upsert("CP1", ChargePointSettings::new(OcppVersion::V16)).await;
        let all = repo.load_all().await;
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("CP1"));
    }
}
