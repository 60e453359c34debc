use crate::error::{Result, TreasuryError};
use crate::schema::{FinancialRecord, OperationState};
use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

/// Partial update for an already-persisted record. Only the set fields are
/// written; everything else keeps its stored value.
#[derive(Debug, Clone, Default)]
pub struct RecordChanges {
    pub operation_state: Option<OperationState>,
    pub is_paid: Option<bool>,
    pub drive_url: Option<String>,
    pub approved_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub description: Option<String>,
}

/// Sink A: the structured record store.
///
/// Failures are returned as values and caught by the gateway; nothing
/// panics across this boundary.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &FinancialRecord) -> Result<()>;

    /// All records, newest creation first.
    async fn fetch_all(&self) -> Result<Vec<FinancialRecord>>;

    async fn update(&self, id: Uuid, changes: RecordChanges) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

fn store_error(reason: impl Into<String>) -> TreasuryError {
    TreasuryError::Persistence {
        sink: "store".to_string(),
        reason: reason.into(),
    }
}

/// In-memory `RecordStore`. Backs tests and the offline working set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<FinancialRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &FinancialRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| store_error("store lock poisoned"))?;
        records.push(record.clone());
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<FinancialRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| store_error("store lock poisoned"))?;
        let mut all = records.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update(&self, id: Uuid, changes: RecordChanges) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| store_error("store lock poisoned"))?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| store_error(format!("record {} not found", id)))?;

        if let Some(state) = changes.operation_state {
            record.operation_state = state;
        }
        if let Some(is_paid) = changes.is_paid {
            record.is_paid = is_paid;
        }
        if let Some(drive_url) = changes.drive_url {
            record.drive_url = Some(drive_url);
        }
        if let Some(approved_by) = changes.approved_by {
            record.approved_by = Some(approved_by);
        }
        if let Some(rejection_reason) = changes.rejection_reason {
            record.rejection_reason = Some(rejection_reason);
        }
        if let Some(description) = changes.description {
            record.description = description;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| store_error("store lock poisoned"))?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(store_error(format!("record {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftSession;
    use crate::finalizer::finalize;
    use crate::schema::Category;
    use futures::executor::block_on;

    fn record(vendor: &str) -> FinancialRecord {
        let mut session = DraftSession::new(Category::Expense);
        let fields = session.fields_mut();
        fields.vendor = vendor.to_string();
        fields.tax_id = "123".to_string();
        fields.date = "2024-03-10".to_string();
        fields.amount = 100.0;
        fields.invoice_number = "F001-1".to_string();
        session.resolve();
        finalize(session.draft()).unwrap()
    }

    #[test]
    fn test_fetch_all_orders_newest_first() {
        let store = MemoryStore::new();
        let mut first = record("Primero");
        let mut second = record("Segundo");
        first.created_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        second.created_at = chrono::Utc::now();

        block_on(store.insert(&first)).unwrap();
        block_on(store.insert(&second)).unwrap();

        let all = block_on(store.fetch_all()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].vendor, "Segundo");
        assert_eq!(all[1].vendor, "Primero");
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let store = MemoryStore::new();
        let stored = record("ACME");
        block_on(store.insert(&stored)).unwrap();

        block_on(store.update(
            stored.id,
            RecordChanges {
                drive_url: Some("https://drive.example/doc".to_string()),
                ..Default::default()
            },
        ))
        .unwrap();

        let all = block_on(store.fetch_all()).unwrap();
        assert_eq!(all[0].drive_url.as_deref(), Some("https://drive.example/doc"));
        assert_eq!(all[0].vendor, "ACME");
        assert_eq!(all[0].operation_state, stored.operation_state);
    }

    #[test]
    fn test_update_unknown_id_is_a_persistence_error() {
        let store = MemoryStore::new();
        let err = block_on(store.update(Uuid::new_v4(), RecordChanges::default())).unwrap_err();
        assert!(matches!(err, TreasuryError::Persistence { .. }));
    }

    #[test]
    fn test_delete_removes_record() {
        let store = MemoryStore::new();
        let stored = record("ACME");
        block_on(store.insert(&stored)).unwrap();
        block_on(store.delete(stored.id)).unwrap();
        assert!(store.is_empty());
    }
}
