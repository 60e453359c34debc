use crate::draft::Draft;
use crate::error::{Result, TreasuryError};
use crate::filing;
use crate::schema::{Category, Currency, FinancialRecord, OperationState};
use chrono::Utc;
use uuid::Uuid;

/// Converts a validated draft into an immutable, persistence-ready record.
///
/// Validation runs before anything else; on violation no identity is
/// generated and no partial record exists. The payment-state rules carry a
/// deliberate asymmetry inherited from the treasury workflow: an expense is
/// marked `PAGADO` as soon as any voucher amount was captured, while
/// `is_paid` demands full coverage of the invoice amount. A partially paid
/// expense is therefore `PAGADO` with `is_paid == false`.
pub fn finalize(draft: &Draft) -> Result<FinancialRecord> {
    validate_required_fields(draft)?;

    let fields = &draft.fields;
    let category = draft.category;

    let operation_state = match category {
        Category::Income => OperationState::Pendiente,
        Category::Expense => {
            if fields.voucher_amount > 0.0 {
                OperationState::Pagado
            } else {
                OperationState::Pendiente
            }
        }
    };

    // Income is never paid at classification time; marking it paid is a
    // later treasury action outside this pipeline.
    let is_paid = match category {
        Category::Income => false,
        Category::Expense => fields.voucher_amount >= fields.amount,
    };

    let folder_path = filing::folder_path(&fields.date, fields.target_folder, category);

    Ok(FinancialRecord {
        id: Uuid::new_v4(),
        details: draft.details,
        vendor: fields.vendor.clone(),
        tax_id: fields.tax_id.clone(),
        date: fields.date.clone(),
        amount: fields.amount,
        currency: fields.currency.unwrap_or(Currency::PEN),
        invoice_number: fields.invoice_number.clone(),
        description: fields.description.clone(),
        detraction_amount: fields.detraction_amount,
        payment_mode: fields.payment_mode.unwrap_or_default(),
        credit_date: fields.credit_date.clone(),
        flow_type: fields.flow_type.unwrap_or_default(),
        service_line: fields
            .service_line
            .unwrap_or_else(|| category.default_service_line()),
        target_folder: fields
            .target_folder
            .unwrap_or_else(|| category.default_folder()),
        voucher_amount: fields.voucher_amount,
        operation_state,
        is_paid,
        created_at: Utc::now(),
        folder_path,
        drive_url: None,
        approved_by: None,
        rejection_reason: None,
    })
}

fn validate_required_fields(draft: &Draft) -> Result<()> {
    let fields = &draft.fields;
    let mut missing = Vec::new();

    if fields.vendor.trim().is_empty() {
        missing.push("vendor");
    }
    if fields.tax_id.trim().is_empty() {
        missing.push("taxId");
    }
    if fields.date.trim().is_empty() {
        missing.push("date");
    }
    // Zero counts as missing: an invoice without an amount was not read.
    if fields.amount <= 0.0 {
        missing.push("amount");
    }
    if fields.invoice_number.trim().is_empty() {
        missing.push("invoiceNumber");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TreasuryError::missing_fields(&missing))
    }
}
