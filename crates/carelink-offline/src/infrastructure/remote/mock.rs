//! Recording test double for the remote data service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entry::WriteKind;

use super::{RemoteDataService, RemoteWriteError};

/// Mock remote service that records every delivered write and can be told
/// to fail all deliveries or only specific entry ids.
#[derive(Default)]
pub struct MockRemoteService {
    fail_all: AtomicBool,
    fail_ids: Mutex<Vec<String>>,
    delivered: Mutex<Vec<(WriteKind, serde_json::Value)>>,
}

impl MockRemoteService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent delivery fail with a network error.
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Makes deliveries whose payload `id` field matches fail with a
    /// network error. Other deliveries succeed.
    pub fn fail_id(&self, id: &str) {
        self.fail_ids
            .lock()
            .expect("mock remote lock poisoned")
            .push(id.to_string());
    }

    /// Writes accepted so far, in delivery order.
    pub fn delivered(&self) -> Vec<(WriteKind, serde_json::Value)> {
        self.delivered
            .lock()
            .expect("mock remote lock poisoned")
            .clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered
            .lock()
            .expect("mock remote lock poisoned")
            .len()
    }
}

#[async_trait]
impl RemoteDataService for MockRemoteService {
    async fn write(
        &self,
        kind: WriteKind,
        payload: &serde_json::Value,
    ) -> Result<(), RemoteWriteError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(RemoteWriteError::Network("service unreachable".into()));
        }
        if let Some(id) = payload.get("id").and_then(|v| v.as_str()) {
            let fail_ids = self.fail_ids.lock().expect("mock remote lock poisoned");
            if fail_ids.iter().any(|f| f == id) {
                return Err(RemoteWriteError::Network(format!(
                    "delivery of {id} timed out"
                )));
            }
        }
        self.delivered
            .lock()
            .expect("mock remote lock poisoned")
            .push((kind, payload.clone()));
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_records_successful_deliveries() {
        let remote = MockRemoteService::new();

        remote
            .write(WriteKind::Appointment, &json!({"id": "a1"}))
            .await
            .unwrap();

        assert_eq!(remote.delivered_count(), 1);
        assert_eq!(remote.delivered()[0].0, WriteKind::Appointment);
    }

    #[tokio::test]
    async fn test_fail_all_turns_every_delivery_into_a_network_error() {
        let remote = MockRemoteService::new();
        remote.set_fail_all(true);

        let result = remote.write(WriteKind::Message, &json!({"id": "m1"})).await;

        assert!(matches!(result, Err(RemoteWriteError::Network(_))));
        assert_eq!(remote.delivered_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_id_only_affects_the_matching_entry() {
        let remote = MockRemoteService::new();
        remote.fail_id("m2");

        let ok = remote.write(WriteKind::Message, &json!({"id": "m1"})).await;
        let failed = remote.write(WriteKind::Message, &json!({"id": "m2"})).await;

        assert!(ok.is_ok());
        assert!(failed.is_err());
        assert_eq!(remote.delivered_count(), 1);
    }
}
