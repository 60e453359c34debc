use crate::draft::DraftSession;
use crate::error::{Result, TreasuryError};
use crate::llm::client::GeminiClient;
use crate::llm::prompts::{
    SYSTEM_PROMPT_EXPENSE_DOCUMENT, SYSTEM_PROMPT_INCOME_DOCUMENT, SYSTEM_PROMPT_VOUCHER,
};
use crate::llm::types::Content;
use crate::schema::{
    Category, CostType, Currency, DocumentPayload, DocumentScan, ExtractedFields, FlowType,
    PaymentMode, ServiceLine, VoucherScan,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response schema for a primary-document extraction. Only used to derive
/// the `responseSchema` sent to the model; the reply itself is normalized
/// field-by-field so a partially wrong answer still yields usable data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentExtraction {
    #[schemars(description = "Legal name of the counterparty (income) or issuer (expense)")]
    pub vendor: String,

    #[schemars(description = "Tax identifier (RUC) of the same party")]
    pub tax_id: String,

    #[schemars(description = "Issue date in YYYY-MM-DD format")]
    pub date: String,

    #[schemars(description = "Full invoice identifier, series and number")]
    pub invoice_number: String,

    pub currency: Currency,

    #[schemars(description = "Document total as a plain number")]
    pub amount: f64,

    #[schemars(description = "Detraction/SPOT withholding amount, 0 when absent")]
    pub detraction_amount: Option<f64>,

    pub payment_mode: Option<PaymentMode>,

    #[schemars(description = "Credit due date, only when paymentMode is CREDITO")]
    pub credit_date: Option<String>,

    pub flow_type: Option<FlowType>,

    pub cost_type: Option<CostType>,

    #[schemars(description = "Business line the document appears to belong to")]
    pub service_line: Option<ServiceLine>,

    #[schemars(description = "Best-effort guess whether this is INGRESO or EGRESO")]
    pub category_suggest: Option<Category>,
}

/// Response schema for a voucher extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VoucherExtraction {
    #[schemars(description = "Paid amount as a plain number, 0 if unreadable")]
    pub amount: f64,

    #[schemars(description = "Payment date in YYYY-MM-DD format, empty if unreadable")]
    pub date: String,
}

pub struct DocumentExtractor {
    client: GeminiClient,
    model: String,
}

impl DocumentExtractor {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Classifies a primary document. No retry: any failure surfaces
    /// immediately so the caller can fall back to manual entry.
    pub async fn extract_document(
        &self,
        bytes: &[u8],
        mime_type: &str,
        category: Category,
    ) -> Result<DocumentScan> {
        let system_prompt = match category {
            Category::Income => SYSTEM_PROMPT_INCOME_DOCUMENT,
            Category::Expense => SYSTEM_PROMPT_EXPENSE_DOCUMENT,
        };

        let schema = schemars::schema_for!(DocumentExtraction);
        let messages = vec![Content::user_with_document(
            "Extract the structured fields from the attached document.",
            mime_type,
            bytes,
        )];

        let raw = self
            .client
            .generate_content(
                &self.model,
                system_prompt,
                messages,
                Some(serde_json::to_value(&schema)?),
            )
            .await?;

        let value: Value = serde_json::from_str(clean_json_output(&raw)).map_err(|e| {
            TreasuryError::Extraction(format!("classifier returned non-JSON output: {}", e))
        })?;

        Ok(normalize_document(&value))
    }

    /// Reads a proof-of-payment voucher. Same error semantics as
    /// `extract_document`; absent values normalize to zero/empty.
    pub async fn extract_voucher(&self, bytes: &[u8], mime_type: &str) -> Result<VoucherScan> {
        let schema = schemars::schema_for!(VoucherExtraction);
        let messages = vec![Content::user_with_document(
            "Extract the paid amount and payment date from the attached voucher.",
            mime_type,
            bytes,
        )];

        let raw = self
            .client
            .generate_content(
                &self.model,
                SYSTEM_PROMPT_VOUCHER,
                messages,
                Some(serde_json::to_value(&schema)?),
            )
            .await?;

        let value: Value = serde_json::from_str(clean_json_output(&raw)).map_err(|e| {
            TreasuryError::Extraction(format!("classifier returned non-JSON output: {}", e))
        })?;

        Ok(normalize_voucher(&value))
    }

    /// Runs the primary extraction against the session's current draft and
    /// resolves defaults afterwards. On failure the draft still ends up
    /// resolved (blank defaults), so the form stays usable for manual
    /// entry, and the error is returned for the caller to surface.
    pub async fn scan_primary(
        &self,
        session: &mut DraftSession,
        payload: &DocumentPayload,
    ) -> Result<()> {
        let token = session.token();
        let category = session.draft().category;

        match self
            .extract_document(&payload.bytes, &payload.mime_type, category)
            .await
        {
            Ok(scan) => {
                session.apply_extraction(token, scan);
                session.resolve();
                Ok(())
            }
            Err(err) => {
                log::warn!("primary extraction failed, falling back to manual entry: {}", err);
                session.resolve();
                Err(err)
            }
        }
    }

    /// The voucher sub-flow: stores the file on the draft immediately, then
    /// extracts and folds the result back in. Extraction failures are
    /// swallowed here; the user keeps the attached file and can type the
    /// amount manually.
    pub async fn attach_voucher(
        &self,
        session: &mut DraftSession,
        payload: DocumentPayload,
    ) -> Result<()> {
        let token = session.attach_voucher_file(payload.clone())?;
        let outcome = self
            .extract_voucher(&payload.bytes, &payload.mime_type)
            .await;
        session.apply_voucher_result(token, outcome);
        Ok(())
    }
}

/// Field-by-field coercion of the classifier's reply. Required identity
/// fields are never the wrong type: numbers default to 0, strings to empty,
/// enums are dropped unless they parse exactly.
pub fn normalize_document(value: &Value) -> DocumentScan {
    let fields = ExtractedFields {
        vendor: string_field(value, "vendor"),
        tax_id: string_field(value, "taxId"),
        date: string_field(value, "date"),
        amount: number_field(value, "amount"),
        currency: enum_field(value, "currency"),
        invoice_number: string_field(value, "invoiceNumber"),
        description: String::new(),
        detraction_amount: number_field(value, "detractionAmount"),
        payment_mode: enum_field(value, "paymentMode"),
        credit_date: optional_string_field(value, "creditDate"),
        flow_type: enum_field(value, "flowType"),
        service_line: enum_field(value, "serviceLine"),
        target_folder: None,
        voucher_amount: 0.0,
        voucher_file: None,
    };

    DocumentScan {
        fields,
        cost_type: enum_field(value, "costType"),
        category_suggest: enum_field(value, "categorySuggest"),
    }
}

pub fn normalize_voucher(value: &Value) -> VoucherScan {
    VoucherScan {
        amount: number_field(value, "amount"),
        date: string_field(value, "date"),
    }
}

/// Strips markdown fences or prose around the JSON object a model
/// occasionally wraps its answer in.
fn clean_json_output(raw: &str) -> &str {
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start <= end {
            return &raw[start..=end];
        }
    }
    raw.trim()
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn optional_string_field(value: &Value, key: &str) -> Option<String> {
    let text = string_field(value, key);
    (!text.is_empty()).then_some(text)
}

fn number_field(value: &Value, key: &str) -> f64 {
    let number = match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        // Models sometimes return formatted amounts as strings.
        Some(Value::String(s)) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    number.max(0.0)
}

fn enum_field<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value
        .get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_generation_carries_wire_field_names() {
        let schema = schemars::schema_for!(DocumentExtraction);
        let schema_json = serde_json::to_string(&schema).unwrap();
        assert!(schema_json.contains("taxId"));
        assert!(schema_json.contains("invoiceNumber"));
        assert!(schema_json.contains("detractionAmount"));
        assert!(schema_json.contains("categorySuggest"));
    }

    #[test]
    fn test_normalize_full_reply() {
        let value = json!({
            "vendor": " ACME SAC ",
            "taxId": "20123456789",
            "date": "2024-03-10",
            "invoiceNumber": "F001-100",
            "currency": "PEN",
            "amount": 500.0,
            "detractionAmount": 60.0,
            "paymentMode": "CREDITO",
            "creditDate": "2024-04-10",
            "flowType": "CFO",
            "costType": "FIJO",
            "categorySuggest": "EGRESO"
        });

        let scan = normalize_document(&value);
        assert_eq!(scan.fields.vendor, "ACME SAC");
        assert_eq!(scan.fields.amount, 500.0);
        assert_eq!(scan.fields.currency, Some(Currency::PEN));
        assert_eq!(scan.fields.payment_mode, Some(PaymentMode::Credito));
        assert_eq!(scan.fields.credit_date.as_deref(), Some("2024-04-10"));
        assert_eq!(scan.cost_type, Some(CostType::Fijo));
        assert_eq!(scan.category_suggest, Some(Category::Expense));
    }

    #[test]
    fn test_normalize_tolerates_missing_and_wrongly_typed_fields() {
        let value = json!({
            "vendor": 42,
            "amount": "1,500.50",
            "detractionAmount": null,
            "paymentMode": "AL TOQUE",
            "currency": "SOLES"
        });

        let scan = normalize_document(&value);
        assert_eq!(scan.fields.vendor, "");
        assert_eq!(scan.fields.amount, 1500.5);
        assert_eq!(scan.fields.detraction_amount, 0.0);
        assert_eq!(scan.fields.payment_mode, None);
        assert_eq!(scan.fields.currency, None);
    }

    #[test]
    fn test_negative_amounts_clamp_to_zero() {
        let scan = normalize_document(&json!({ "amount": -120.0 }));
        assert_eq!(scan.fields.amount, 0.0);
    }

    #[test]
    fn test_normalize_voucher_defaults() {
        let scan = normalize_voucher(&json!({}));
        assert_eq!(scan, VoucherScan { amount: 0.0, date: String::new() });

        let scan = normalize_voucher(&json!({ "amount": 350.0, "date": "2024-03-12" }));
        assert_eq!(scan.amount, 350.0);
        assert_eq!(scan.date, "2024-03-12");
    }

    #[test]
    fn test_clean_json_output_strips_fences() {
        let wrapped = "```json\n{\"amount\": 10}\n```";
        assert_eq!(clean_json_output(wrapped), "{\"amount\": 10}");
        assert_eq!(clean_json_output("  plain  "), "plain");
    }
}
