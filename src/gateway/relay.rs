use crate::config::AppConfig;
use crate::error::{Result, TreasuryError};
use serde_json::Value;

/// Server-side forwarder between the client and the ledger webhook.
///
/// The ledger token lives only here: the relay injects it into every
/// forwarded payload so the secret is never exposed to the client. A relay
/// without a configured token or target URL refuses to forward at all.
#[derive(Clone)]
pub struct LedgerRelay {
    http: reqwest::Client,
    target_url: Option<String>,
    token: Option<String>,
}

impl LedgerRelay {
    pub fn new(target_url: Option<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            target_url,
            token,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.ledger_webhook_url.clone(),
            config.ledger_access_token.clone(),
        )
    }

    /// Injects the held token into the payload. Split out from `forward` so
    /// the injection contract is testable without a live endpoint.
    pub fn authorize(&self, mut payload: Value) -> Result<Value> {
        let token = self.token.as_deref().ok_or_else(|| {
            TreasuryError::Configuration("ledger access token is not configured".to_string())
        })?;
        if self.target_url.is_none() {
            return Err(TreasuryError::Configuration(
                "ledger webhook URL is not configured".to_string(),
            ));
        }

        let object = payload.as_object_mut().ok_or_else(|| {
            TreasuryError::Persistence {
                sink: "relay".to_string(),
                reason: "forwarded payload must be a JSON object".to_string(),
            }
        })?;
        object.insert("token".to_string(), Value::String(token.to_string()));
        Ok(payload)
    }

    /// Forwards an authorized payload to the ledger. Only POST is accepted.
    pub async fn forward(&self, method: &str, payload: Value) -> Result<String> {
        if !method.eq_ignore_ascii_case("POST") {
            return Err(TreasuryError::Persistence {
                sink: "relay".to_string(),
                reason: format!("method {} not allowed, relay accepts POST only", method),
            });
        }

        let payload = self.authorize(payload)?;
        let url = self.target_url.as_deref().ok_or_else(|| {
            TreasuryError::Configuration("ledger webhook URL is not configured".to_string())
        })?;

        log::debug!("relaying ledger payload to {}", url);
        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TreasuryError::Persistence {
                sink: "relay".to_string(),
                reason: format!("ledger unreachable: {}", e),
            })?;

        response.text().await.map_err(|e| TreasuryError::Persistence {
            sink: "relay".to_string(),
            reason: format!("unreadable ledger response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unconfigured_relay_refuses() {
        let relay = LedgerRelay::new(None, None);
        let err = relay.authorize(json!({"action": "save"})).unwrap_err();
        assert!(matches!(err, TreasuryError::Configuration(_)));

        let relay = LedgerRelay::new(Some("https://ledger.example".to_string()), None);
        let err = relay.authorize(json!({"action": "save"})).unwrap_err();
        assert!(matches!(err, TreasuryError::Configuration(_)));
    }

    #[test]
    fn test_token_is_injected_into_payload() {
        let relay = LedgerRelay::new(
            Some("https://ledger.example".to_string()),
            Some("secreto".to_string()),
        );
        let payload = relay.authorize(json!({"action": "save"})).unwrap();
        assert_eq!(payload["token"], "secreto");
        assert_eq!(payload["action"], "save");
    }

    #[tokio::test]
    async fn test_non_post_is_rejected() {
        let relay = LedgerRelay::new(
            Some("https://ledger.example".to_string()),
            Some("secreto".to_string()),
        );
        let err = relay.forward("GET", json!({})).await.unwrap_err();
        assert!(matches!(err, TreasuryError::Persistence { .. }));
    }
}
