use crate::error::Result;
use crate::schema::{DocumentPayload, FinancialRecord};
use async_trait::async_trait;
use serde::Serialize;

/// Routing discriminator the ledger service switches on. Only `Save` is
/// issued by this pipeline; the auth actions belong to the login flow that
/// shares the same endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerAction {
    Save,
    Login,
    Register,
}

/// JSON envelope posted to the ledger webhook: all record fields flattened
/// at the top level plus the action and an optional source-document payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEnvelope<'a> {
    #[serde(flatten)]
    pub record: &'a FinancialRecord,
    pub action: LedgerAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_mime_type: Option<String>,
}

/// Outcome of a ledger write as reported by the remote service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerAck {
    pub ok: bool,
    pub message: Option<String>,
    pub drive_url: Option<String>,
}

/// Sink B: the spreadsheet-ledger webhook.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    async fn save(
        &self,
        record: &FinancialRecord,
        source_file: Option<&DocumentPayload>,
    ) -> Result<LedgerAck>;
}

/// Bodies longer than this that are not JSON are error pages, not acks.
const SHORT_RESPONSE_MAX: usize = 200;

/// Defensive parse of the ledger's reply, which is plain text that may or
/// may not be JSON: valid JSON is used as-is, short plain text counts as a
/// success with a message, anything else is a failure.
pub fn parse_ledger_response(body: &str) -> LedgerAck {
    let trimmed = body.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let ok = value.get("error").is_none()
            && value.get("status").and_then(|s| s.as_str()) != Some("error");
        let message = value
            .get("message")
            .or_else(|| value.get("status"))
            .or_else(|| value.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string);
        let drive_url = value
            .get("driveUrl")
            .and_then(|u| u.as_str())
            .map(str::to_string);
        return LedgerAck {
            ok,
            message,
            drive_url,
        };
    }

    if trimmed.len() <= SHORT_RESPONSE_MAX {
        return LedgerAck {
            ok: true,
            message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            drive_url: None,
        };
    }

    LedgerAck {
        ok: false,
        message: Some("unrecognized ledger response".to_string()),
        drive_url: None,
    }
}

#[cfg(feature = "webhook")]
pub use webhook::LedgerWebhook;

#[cfg(feature = "webhook")]
mod webhook {
    use super::*;
    use crate::error::TreasuryError;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    fn ledger_error(reason: impl Into<String>) -> TreasuryError {
        TreasuryError::Persistence {
            sink: "ledger".to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP implementation of sink B. Posts through the secured relay so the
    /// client never holds the ledger token itself.
    #[derive(Clone)]
    pub struct LedgerWebhook {
        http: reqwest::Client,
        url: String,
    }

    impl LedgerWebhook {
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                http: reqwest::Client::new(),
                url: url.into(),
            }
        }

        pub fn endpoint(&self) -> &str {
            &self.url
        }
    }

    #[async_trait]
    impl LedgerSink for LedgerWebhook {
        async fn save(
            &self,
            record: &FinancialRecord,
            source_file: Option<&DocumentPayload>,
        ) -> Result<LedgerAck> {
            let envelope = LedgerEnvelope {
                record,
                action: LedgerAction::Save,
                file_base64: source_file.map(|f| STANDARD.encode(&f.bytes)),
                file_mime_type: source_file.map(|f| f.mime_type.clone()),
            };

            let response = self
                .http
                .post(&self.url)
                .json(&envelope)
                .send()
                .await
                .map_err(|e| ledger_error(format!("webhook unreachable: {}", e)))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ledger_error(format!("unreadable webhook response: {}", e)))?;

            if !status.is_success() {
                return Err(ledger_error(format!(
                    "webhook rejected the record (status {}): {}",
                    status, body
                )));
            }

            Ok(parse_ledger_response(&body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftSession;
    use crate::finalizer::finalize;
    use crate::schema::Category;

    #[test]
    fn test_json_body_with_drive_url() {
        let ack =
            parse_ledger_response(r#"{"status":"ok","driveUrl":"https://drive.example/doc"}"#);
        assert!(ack.ok);
        assert_eq!(ack.drive_url.as_deref(), Some("https://drive.example/doc"));
        assert_eq!(ack.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_json_error_body_is_a_failure() {
        let ack = parse_ledger_response(r#"{"status":"error","message":"sheet is locked"}"#);
        assert!(!ack.ok);
        assert_eq!(ack.message.as_deref(), Some("sheet is locked"));
    }

    #[test]
    fn test_short_plain_text_is_success_with_message() {
        let ack = parse_ledger_response("Registro guardado");
        assert!(ack.ok);
        assert_eq!(ack.message.as_deref(), Some("Registro guardado"));
        assert!(ack.drive_url.is_none());
    }

    #[test]
    fn test_long_garbage_is_a_generic_failure() {
        let html = format!("<html><body>{}</body></html>", "error ".repeat(100));
        let ack = parse_ledger_response(&html);
        assert!(!ack.ok);
        assert_eq!(ack.message.as_deref(), Some("unrecognized ledger response"));
    }

    #[test]
    fn test_envelope_flattens_record_fields_with_action() {
        let mut session = DraftSession::new(Category::Expense);
        let fields = session.fields_mut();
        fields.vendor = "ACME".to_string();
        fields.tax_id = "123".to_string();
        fields.date = "2024-03-10".to_string();
        fields.amount = 500.0;
        fields.invoice_number = "F001-100".to_string();
        session.resolve();
        let record = finalize(session.draft()).unwrap();

        let envelope = LedgerEnvelope {
            record: &record,
            action: LedgerAction::Save,
            file_base64: None,
            file_mime_type: None,
        };
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["action"], "save");
        assert_eq!(json["vendor"], "ACME");
        assert_eq!(json["category"], "EGRESO");
        assert_eq!(json["costType"], "VARIABLE");
        assert!(json.get("fileBase64").is_none());
    }
}
