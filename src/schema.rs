use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level document category, fixed at upload time and immutable for the
/// lifetime of a draft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum Category {
    #[serde(rename = "INGRESO")]
    Income,
    #[serde(rename = "EGRESO")]
    Expense,
}

impl Category {
    pub fn default_folder(self) -> TargetFolder {
        match self {
            Category::Income => TargetFolder::Ventas,
            Category::Expense => TargetFolder::Compras,
        }
    }

    pub fn default_service_line(self) -> ServiceLine {
        match self {
            Category::Income => ServiceLine::AuditoriaTradicional,
            Category::Expense => ServiceLine::EccosGasto,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum Currency {
    #[schemars(description = "Peruvian sol")]
    PEN,
    #[schemars(description = "US dollar")]
    USD,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum PaymentMode {
    #[serde(rename = "CONTADO")]
    #[schemars(description = "Paid immediately on issue")]
    Contado,
    #[serde(rename = "CREDITO")]
    #[schemars(description = "Deferred payment; a credit due date applies")]
    Credito,
}

impl Default for PaymentMode {
    fn default() -> Self {
        Self::Contado
    }
}

/// Cash-flow statement classification of the movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum FlowType {
    #[serde(rename = "CFO")]
    #[schemars(description = "Operating cash flow")]
    Operating,
    #[serde(rename = "CFI")]
    #[schemars(description = "Investing cash flow")]
    Investing,
    #[serde(rename = "CFF")]
    #[schemars(description = "Financing cash flow")]
    Financing,
}

impl Default for FlowType {
    fn default() -> Self {
        Self::Operating
    }
}

/// Income origin, only meaningful for `Category::Income` records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum IncomeType {
    #[serde(rename = "VENTAS")]
    Ventas,
    #[serde(rename = "PRÉSTAMOS")]
    Prestamos,
    #[serde(rename = "CAMBIO DE MONEDA")]
    CambioDeMoneda,
    #[serde(rename = "INGRESOS FINANCIEROS")]
    IngresosFinancieros,
}

impl Default for IncomeType {
    fn default() -> Self {
        Self::Ventas
    }
}

/// Business line the movement belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum ServiceLine {
    #[serde(rename = "Auditoría Tradicional")]
    AuditoriaTradicional,
    #[serde(rename = "Auditoría de Sistemas")]
    AuditoriaDeSistemas,
    #[serde(rename = "Consultoría")]
    Consultoria,
    #[serde(rename = "Outsourcing")]
    Outsourcing,
    #[serde(rename = "ECCOS GASTO")]
    EccosGasto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum CostType {
    #[serde(rename = "FIJO")]
    #[schemars(description = "Fixed recurring cost (rent, payroll, subscriptions)")]
    Fijo,
    #[serde(rename = "VARIABLE")]
    #[schemars(description = "Variable cost tied to activity")]
    Variable,
}

impl Default for CostType {
    fn default() -> Self {
        Self::Variable
    }
}

/// Where an expense payment was deposited or settled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum DepositAccount {
    #[serde(rename = "PAGO DIRECTO")]
    PagoDirecto,
    #[serde(rename = "BCP SOLES")]
    BcpSoles,
    #[serde(rename = "BCP DÓLARES")]
    BcpDolares,
    #[serde(rename = "INTERBANK SOLES")]
    InterbankSoles,
    #[serde(rename = "EFECTIVO")]
    Efectivo,
}

impl Default for DepositAccount {
    fn default() -> Self {
        Self::PagoDirecto
    }
}

/// Destination folder for the filed source document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum TargetFolder {
    #[serde(rename = "VENTAS")]
    Ventas,
    #[serde(rename = "COMPRAS")]
    Compras,
    #[serde(rename = "SERVICIOS")]
    Servicios,
}

impl TargetFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetFolder::Ventas => "VENTAS",
            TargetFolder::Compras => "COMPRAS",
            TargetFolder::Servicios => "SERVICIOS",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum OperationState {
    #[serde(rename = "PENDIENTE")]
    Pendiente,
    #[serde(rename = "EN_REVISION")]
    EnRevision,
    #[serde(rename = "APROBADO")]
    Aprobado,
    #[serde(rename = "RECHAZADO")]
    Rechazado,
    #[serde(rename = "CONCILIADO")]
    Conciliado,
    #[serde(rename = "PAGADO")]
    Pagado,
}

/// Raw document bytes plus their MIME type, as received from the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl DocumentPayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Category-independent working data of an in-flight upload.
///
/// Optional fields are `None` until either the extractor or the resolver
/// fills them; the distinction lets a late extraction result merge without
/// clobbering values the user already entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub vendor: String,
    pub tax_id: String,
    /// ISO `YYYY-MM-DD`; may be empty or malformed, filing falls back softly.
    pub date: String,
    pub amount: f64,
    pub currency: Option<Currency>,
    pub invoice_number: String,
    pub description: String,
    pub detraction_amount: f64,
    pub payment_mode: Option<PaymentMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_date: Option<String>,
    pub flow_type: Option<FlowType>,
    pub service_line: Option<ServiceLine>,
    pub target_folder: Option<TargetFolder>,
    pub voucher_amount: f64,
    #[serde(skip)]
    pub voucher_file: Option<DocumentPayload>,
}

/// Category-gated classification detail. Exactly one side exists per draft,
/// keyed by the category chosen at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum CategoryDetails {
    #[serde(rename = "INGRESO", rename_all = "camelCase")]
    Income { income_type: IncomeType },
    #[serde(rename = "EGRESO", rename_all = "camelCase")]
    Expense {
        cost_type: CostType,
        deposited_to: DepositAccount,
    },
}

impl CategoryDetails {
    pub fn category(&self) -> Category {
        match self {
            CategoryDetails::Income { .. } => Category::Income,
            CategoryDetails::Expense { .. } => Category::Expense,
        }
    }

    pub fn defaults_for(category: Category) -> Self {
        match category {
            Category::Income => CategoryDetails::Income {
                income_type: IncomeType::default(),
            },
            Category::Expense => CategoryDetails::Expense {
                cost_type: CostType::default(),
                deposited_to: DepositAccount::default(),
            },
        }
    }
}

/// Normalized result of a primary-document extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentScan {
    pub fields: ExtractedFields,
    /// Cost-type hint, only applicable to expense drafts.
    pub cost_type: Option<CostType>,
    /// The extractor's own guess at the category; informational only, the
    /// user-chosen category is never re-derived from it.
    pub category_suggest: Option<Category>,
}

/// Normalized result of a voucher extraction. Absent values arrive as
/// zero/empty rather than failing the sub-flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoucherScan {
    pub amount: f64,
    pub date: String,
}

/// Derived filing location: `[year, month name, folder]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderPath(pub [String; 3]);

impl FolderPath {
    pub fn year(&self) -> &str {
        &self.0[0]
    }

    pub fn month(&self) -> &str {
        &self.0[1]
    }

    pub fn folder(&self) -> &str {
        &self.0[2]
    }
}

/// A finalized, persistence-ready record. Immutable once produced; later
/// treasury edits happen through a separate update path, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: CategoryDetails,
    pub vendor: String,
    pub tax_id: String,
    pub date: String,
    pub amount: f64,
    pub currency: Currency,
    pub invoice_number: String,
    pub description: String,
    pub detraction_amount: f64,
    pub payment_mode: PaymentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_date: Option<String>,
    pub flow_type: FlowType,
    pub service_line: ServiceLine,
    pub target_folder: TargetFolder,
    pub voucher_amount: f64,
    pub operation_state: OperationState,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub folder_path: FolderPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl FinancialRecord {
    pub fn category(&self) -> Category {
        self.details.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_details_are_mutually_exclusive_on_the_wire() {
        let expense = CategoryDetails::Expense {
            cost_type: CostType::Fijo,
            deposited_to: DepositAccount::BcpSoles,
        };
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["category"], "EGRESO");
        assert_eq!(json["costType"], "FIJO");
        assert_eq!(json["depositedTo"], "BCP SOLES");
        assert!(json.get("incomeType").is_none());

        let income = CategoryDetails::Income {
            income_type: IncomeType::CambioDeMoneda,
        };
        let json = serde_json::to_value(&income).unwrap();
        assert_eq!(json["category"], "INGRESO");
        assert_eq!(json["incomeType"], "CAMBIO DE MONEDA");
        assert!(json.get("costType").is_none());
        assert!(json.get("depositedTo").is_none());
    }

    #[test]
    fn test_ledger_vocabulary_round_trip() {
        for (value, expected) in [
            (serde_json::to_value(IncomeType::Prestamos).unwrap(), "PRÉSTAMOS"),
            (serde_json::to_value(ServiceLine::EccosGasto).unwrap(), "ECCOS GASTO"),
            (serde_json::to_value(DepositAccount::PagoDirecto).unwrap(), "PAGO DIRECTO"),
            (serde_json::to_value(OperationState::EnRevision).unwrap(), "EN_REVISION"),
        ] {
            assert_eq!(value, serde_json::Value::String(expected.to_string()));
        }

        let parsed: IncomeType = serde_json::from_str("\"PRÉSTAMOS\"").unwrap();
        assert_eq!(parsed, IncomeType::Prestamos);
    }

    #[test]
    fn test_folder_path_serializes_as_ordered_triple() {
        let path = FolderPath([
            "2024".to_string(),
            "MARZO".to_string(),
            "COMPRAS".to_string(),
        ]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["2024","MARZO","COMPRAS"]"#);
        assert_eq!(path.year(), "2024");
        assert_eq!(path.month(), "MARZO");
        assert_eq!(path.folder(), "COMPRAS");
    }
}
