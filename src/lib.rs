//! # Treasury Intake
//!
//! The document classification and record derivation core of a treasury
//! tracker: raw invoice/receipt bytes plus AI-extracted fields become a
//! fully-classified, internally-consistent [`FinancialRecord`], persisted to
//! two independent sinks.
//!
//! ## Core Concepts
//!
//! - **Draft**: the one in-flight upload, mutable until submission
//! - **Extraction**: best-effort structured field guesses from an external
//!   classifier; wrong or absent values never block the flow
//! - **Resolution**: pure, idempotent category defaults (income vs expense)
//! - **Voucher**: a proof-of-payment document folded into an expense draft
//! - **Finalization**: validation, identity, payment state and filing path,
//!   producing an immutable record
//! - **Dual-sink persistence**: best-effort writes to a structured store and
//!   a spreadsheet-ledger webhook, partial failure reported, never rolled
//!   back
//!
//! ## Example
//!
//! ```rust,ignore
//! use treasury_intake::*;
//!
//! let mut session = DraftSession::new(Category::Expense);
//! let fields = session.fields_mut();
//! fields.vendor = "ACME SAC".to_string();
//! fields.tax_id = "20123456789".to_string();
//! fields.date = "2024-03-10".to_string();
//! fields.amount = 500.0;
//! fields.invoice_number = "F001-100".to_string();
//! session.resolve();
//!
//! let mut pipeline = IntakePipeline::new(MemoryStore::new(), my_ledger);
//! let outcome = pipeline.submit(session.draft(), None).await?;
//! assert!(outcome.fully_synced());
//! ```

pub mod config;
pub mod draft;
pub mod error;
pub mod filing;
pub mod finalizer;
pub mod gateway;
pub mod resolver;
pub mod schema;

#[cfg(feature = "gemini")]
pub mod llm;

pub use config::*;
pub use draft::*;
pub use error::*;
pub use filing::*;
pub use finalizer::*;
pub use gateway::*;
pub use resolver::*;
pub use schema::*;

use log::{info, warn};

/// Ties the flow together: finalize a draft, persist it through the
/// gateway, and keep the record in the local working set whatever the sinks
/// did, so nothing the user classified is silently lost.
pub struct IntakePipeline<S, L> {
    gateway: PersistenceGateway<S, L>,
    working_set: Vec<FinancialRecord>,
}

impl<S: RecordStore, L: LedgerSink> IntakePipeline<S, L> {
    pub fn new(store: S, ledger: L) -> Self {
        Self {
            gateway: PersistenceGateway::new(store, ledger),
            working_set: Vec::new(),
        }
    }

    pub fn gateway(&self) -> &PersistenceGateway<S, L> {
        &self.gateway
    }

    /// The user's local working set, newest first.
    pub fn records(&self) -> &[FinancialRecord] {
        &self.working_set
    }

    /// Finalizes and persists the draft. A validation failure aborts before
    /// any sink is touched; sink failures are reported in the outcome while
    /// the record still joins the working set.
    pub async fn submit(
        &mut self,
        draft: &Draft,
        source_file: Option<&DocumentPayload>,
    ) -> Result<PersistOutcome> {
        let record = finalize(draft)?;
        info!(
            "submitting record {} ({:?}, {} {:?})",
            record.id,
            record.category(),
            record.amount,
            record.currency
        );

        let outcome = self.gateway.persist(record, source_file).await;
        if !outcome.fully_synced() {
            warn!(
                "record {} kept locally with sync errors: {:?}",
                outcome.record.id,
                outcome.sync_errors()
            );
        }
        self.working_set.insert(0, outcome.record.clone());
        Ok(outcome)
    }
}
