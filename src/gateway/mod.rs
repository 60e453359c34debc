pub mod ledger;
pub mod store;

#[cfg(feature = "webhook")]
pub mod relay;

pub use ledger::{parse_ledger_response, LedgerAck, LedgerAction, LedgerEnvelope, LedgerSink};
pub use store::{MemoryStore, RecordChanges, RecordStore};

#[cfg(feature = "webhook")]
pub use ledger::LedgerWebhook;
#[cfg(feature = "webhook")]
pub use relay::LedgerRelay;

use crate::schema::{DocumentPayload, FinancialRecord};

/// Result of a dual-sink persist. The record is always retained, whatever
/// the sinks did; per-sink errors are carried for the caller to surface as
/// a sync notice.
#[derive(Debug, Clone)]
pub struct PersistOutcome {
    pub record: FinancialRecord,
    pub drive_url: Option<String>,
    pub store_error: Option<String>,
    pub ledger_error: Option<String>,
}

impl PersistOutcome {
    pub fn fully_synced(&self) -> bool {
        self.store_error.is_none() && self.ledger_error.is_none()
    }

    pub fn sync_errors(&self) -> Vec<&str> {
        self.store_error
            .iter()
            .chain(self.ledger_error.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Writes each finalized record to the two sinks as independent best-effort
/// operations. There is no transaction between them: one sink failing never
/// rolls back the other, and the caller keeps the record either way.
pub struct PersistenceGateway<S, L> {
    store: S,
    ledger: L,
}

impl<S: RecordStore, L: LedgerSink> PersistenceGateway<S, L> {
    pub fn new(store: S, ledger: L) -> Self {
        Self { store, ledger }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn persist(
        &self,
        record: FinancialRecord,
        source_file: Option<&DocumentPayload>,
    ) -> PersistOutcome {
        let (store_result, ledger_result) = futures::join!(
            self.store.insert(&record),
            self.ledger.save(&record, source_file)
        );

        let store_error = store_result.err().map(|e| e.to_string());
        let (drive_url, ledger_error) = match ledger_result {
            Ok(ack) if ack.ok => (ack.drive_url, None),
            Ok(ack) => (
                None,
                Some(
                    ack.message
                        .unwrap_or_else(|| "ledger rejected the record".to_string()),
                ),
            ),
            Err(err) => (None, Some(err.to_string())),
        };

        if let Some(err) = &store_error {
            log::warn!("record {} not written to store: {}", record.id, err);
        }
        if let Some(err) = &ledger_error {
            log::warn!("record {} not synced to ledger: {}", record.id, err);
        }

        let mut record = record;
        if let Some(url) = &drive_url {
            record.drive_url = Some(url.clone());
            // Best-effort backfill of the document link on the stored copy.
            if store_error.is_none() {
                if let Err(err) = self
                    .store
                    .update(
                        record.id,
                        RecordChanges {
                            drive_url: Some(url.clone()),
                            ..Default::default()
                        },
                    )
                    .await
                {
                    log::warn!("drive link not backfilled for {}: {}", record.id, err);
                }
            }
        }

        PersistOutcome {
            record,
            drive_url,
            store_error,
            ledger_error,
        }
    }
}
