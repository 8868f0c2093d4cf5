//! Remote-account token check.
//!
//! `GET {check_url}` with the raw token in `Authorization`; the endpoint
//! answers `{"valid": bool}`.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::TokenError;

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    valid: bool,
}

#[derive(Debug, Clone)]
pub struct TokenValidator {
    client: reqwest::Client,
    check_url: Url,
}

impl TokenValidator {
    pub fn new(check_url: &str, timeout: Duration) -> Result<Self, TokenError> {
        let check_url = Url::parse(check_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, check_url })
    }

    pub fn check_url(&self) -> &Url {
        &self.check_url
    }

    /// `Ok(true)` for a valid token, `Ok(false)` for a rejected one. Transport
    /// errors, non-2xx answers and malformed bodies are
    /// [`TokenError::RemoteValidation`]. There is no retry.
    pub async fn check(&self, token: &str) -> Result<bool, TokenError> {
        debug!(url = %self.check_url, "Checking token");
        let response = self
            .client
            .get(self.check_url.clone())
            .header("Authorization", token.trim())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TokenError::RemoteValidation(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: CheckResponse = response.json().await?;
        info!(valid = body.valid, "Token checked");
        Ok(body.valid)
    }
}

/// What the token dialog shows after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Checking,
    Valid,
    Invalid,
    Failed,
}

impl TokenCheck {
    pub fn from_result(result: &Result<bool, TokenError>) -> Self {
        match result {
            Ok(true) => TokenCheck::Valid,
            Ok(false) => TokenCheck::Invalid,
            Err(_) => TokenCheck::Failed,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TokenCheck::Checking => "Проверяю...",
            TokenCheck::Valid => "✅ Токен валидный!",
            TokenCheck::Invalid => "❌ Неверный токен",
            TokenCheck::Failed => "⚠️ Ошибка валидации (проверь API)",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TokenCheck::Checking => "#FFBD00",
            TokenCheck::Valid => "#4caf50",
            TokenCheck::Invalid => "#f44336",
            TokenCheck::Failed => "orange",
        }
    }

    /// Only a validated token gets saved.
    pub fn should_save(&self) -> bool {
        *self == TokenCheck::Valid
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
