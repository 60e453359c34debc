use std::env;

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const LEDGER_WEBHOOK_URL_VAR: &str = "LEDGER_WEBHOOK_URL";
pub const LEDGER_ACCESS_TOKEN_VAR: &str = "LEDGER_ACCESS_TOKEN";

/// Runtime configuration, read once from the environment.
///
/// Missing values never abort startup. A missing AI key disables extraction
/// while the manual-entry path stays fully usable; missing ledger settings
/// disable sink B. Callers surface `warnings()` as a degraded-mode banner
/// instead of crashing.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub ledger_webhook_url: Option<String>,
    pub ledger_access_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: non_empty_var(GEMINI_API_KEY_VAR),
            ledger_webhook_url: non_empty_var(LEDGER_WEBHOOK_URL_VAR),
            ledger_access_token: non_empty_var(LEDGER_ACCESS_TOKEN_VAR),
        }
    }

    pub fn extraction_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn ledger_enabled(&self) -> bool {
        self.ledger_webhook_url.is_some() && self.ledger_access_token.is_some()
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.extraction_enabled() {
            warnings.push(format!(
                "{} is not set: document extraction is disabled, fields must be entered manually",
                GEMINI_API_KEY_VAR
            ));
        }
        if !self.ledger_enabled() {
            warnings.push(format!(
                "{} / {} are not set: records will not sync to the ledger",
                LEDGER_WEBHOOK_URL_VAR, LEDGER_ACCESS_TOKEN_VAR
            ));
        }
        warnings
    }

    pub fn log_warnings(&self) {
        for warning in self.warnings() {
            log::warn!("{}", warning);
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
