use crate::error::{Result, TreasuryError};
use crate::resolver::resolve_defaults;
use crate::schema::{
    Category, CategoryDetails, DocumentPayload, DocumentScan, ExtractedFields, VoucherScan,
};

/// An in-progress, not-yet-persisted classification record. The category is
/// fixed at creation and immutable for the draft's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub category: Category,
    pub fields: ExtractedFields,
    pub details: CategoryDetails,
}

impl Draft {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            fields: ExtractedFields::default(),
            details: CategoryDetails::defaults_for(category),
        }
    }
}

/// Opaque handle identifying the draft an asynchronous operation was started
/// against. Results carrying a stale token are discarded silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftToken(u64);

/// Owns the single active draft and the version token that guards every
/// asynchronous callback against mutating a torn-down draft.
#[derive(Debug)]
pub struct DraftSession {
    draft: Draft,
    version: u64,
}

impl DraftSession {
    pub fn new(category: Category) -> Self {
        Self {
            draft: Draft::new(category),
            version: 0,
        }
    }

    /// Discards the current draft and starts a fresh one. Any extraction
    /// still in flight for the previous draft becomes stale.
    pub fn start_draft(&mut self, category: Category) -> DraftToken {
        self.version += 1;
        self.draft = Draft::new(category);
        self.token()
    }

    pub fn token(&self) -> DraftToken {
        DraftToken(self.version)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Direct access for user edits. Any value is accepted, including
    /// logically inconsistent ones; only finalization validates.
    pub fn fields_mut(&mut self) -> &mut ExtractedFields {
        &mut self.draft.fields
    }

    /// Replaces the classification detail. Rejected (returns false) when the
    /// detail's category does not match the draft's immutable category.
    pub fn set_details(&mut self, details: CategoryDetails) -> bool {
        if details.category() != self.draft.category {
            return false;
        }
        self.draft.details = details;
        true
    }

    /// Applies category defaults to the current draft. Idempotent.
    pub fn resolve(&mut self) {
        let (fields, details) = resolve_defaults(
            self.draft.fields.clone(),
            Some(self.draft.details),
            self.draft.category,
        );
        self.draft.fields = fields;
        self.draft.details = details;
    }

    /// Merges a primary-extraction result into the draft.
    ///
    /// Returns false without touching anything when the token is stale. The
    /// merge is non-destructive: a field is only filled while the draft
    /// still holds its blank value, so edits made during the wait survive.
    pub fn apply_extraction(&mut self, token: DraftToken, scan: DocumentScan) -> bool {
        if token != self.token() {
            log::debug!("discarding extraction result for a superseded draft");
            return false;
        }

        let fields = &mut self.draft.fields;
        fill_string(&mut fields.vendor, scan.fields.vendor);
        fill_string(&mut fields.tax_id, scan.fields.tax_id);
        fill_string(&mut fields.date, scan.fields.date);
        fill_string(&mut fields.invoice_number, scan.fields.invoice_number);
        fill_string(&mut fields.description, scan.fields.description);
        if fields.amount == 0.0 {
            fields.amount = scan.fields.amount;
        }
        if fields.detraction_amount == 0.0 {
            fields.detraction_amount = scan.fields.detraction_amount;
        }
        fill_option(&mut fields.currency, scan.fields.currency);
        fill_option(&mut fields.payment_mode, scan.fields.payment_mode);
        fill_option(&mut fields.credit_date, scan.fields.credit_date);
        fill_option(&mut fields.flow_type, scan.fields.flow_type);
        fill_option(&mut fields.service_line, scan.fields.service_line);
        fill_option(&mut fields.target_folder, scan.fields.target_folder);

        if let (CategoryDetails::Expense { cost_type, .. }, Some(detected)) =
            (&mut self.draft.details, scan.cost_type)
        {
            *cost_type = detected;
        }

        true
    }

    /// Stores the raw voucher file on the draft immediately, before any
    /// extraction of it runs, and hands back the token to apply the result
    /// with. Only expense drafts accept vouchers.
    pub fn attach_voucher_file(&mut self, payload: DocumentPayload) -> Result<DraftToken> {
        if self.draft.category != Category::Expense {
            return Err(TreasuryError::Validation {
                details: "voucher attachment is only available for expense drafts".to_string(),
            });
        }
        self.draft.fields.voucher_file = Some(payload);
        Ok(self.token())
    }

    /// Folds a voucher-extraction outcome back into the draft.
    ///
    /// On success the detected amount replaces `voucher_amount` and a note
    /// with the detected date (or a "no disponible" marker) is appended to
    /// the description. On failure nothing changes: the amount keeps its
    /// value and the stored file stays attached for manual correction.
    pub fn apply_voucher_result(
        &mut self,
        token: DraftToken,
        outcome: Result<VoucherScan>,
    ) -> bool {
        if token != self.token() {
            log::debug!("discarding voucher result for a superseded draft");
            return false;
        }

        match outcome {
            Ok(scan) => {
                self.draft.fields.voucher_amount = scan.amount;
                let note = if scan.date.is_empty() {
                    "Pago verificado (fecha no disponible)".to_string()
                } else {
                    format!("Pago verificado el {}", scan.date)
                };
                let description = &mut self.draft.fields.description;
                if description.is_empty() {
                    *description = note;
                } else {
                    *description = format!("{} | {}", description, note);
                }
                true
            }
            Err(err) => {
                log::warn!("voucher extraction failed, keeping manual values: {}", err);
                false
            }
        }
    }
}

fn fill_string(current: &mut String, candidate: String) {
    if current.is_empty() && !candidate.is_empty() {
        *current = candidate;
    }
}

fn fill_option<T>(current: &mut Option<T>, candidate: Option<T>) {
    if current.is_none() {
        *current = candidate;
    }
}
