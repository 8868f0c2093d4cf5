//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// The first error as a [`ConfigError`], or the warnings when valid.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_cdp(config, &mut result);
        Self::validate_intervals(config, &mut result);
        Self::validate_token(config, &mut result);
        Self::validate_selectors(config, &mut result);

        Ok(result)
    }

    fn validate_cdp(config: &Config, result: &mut ValidationResult) {
        if !is_http_url(&config.cdp.endpoint) {
            result.add_error(ValidationError::new(
                "cdp.endpoint",
                "endpoint must be an http:// or https:// URL",
            ));
        }

        if config.cdp.page_match.iter().all(|m| m.trim().is_empty()) {
            result.add_error(ValidationError::new(
                "cdp.page_match",
                "page_match needs at least one non-empty pattern",
            ));
        }
    }

    fn validate_intervals(config: &Config, result: &mut ValidationResult) {
        let intervals = [
            ("cdp.reconnect_interval_ms", config.cdp.reconnect_interval_ms),
            ("cdp.request_timeout_ms", config.cdp.request_timeout_ms),
            ("observer.interval_ms", config.observer.interval_ms),
            ("host.retry_delay_ms", config.host.retry_delay_ms),
            ("token.timeout_ms", config.token.timeout_ms),
        ];
        for (path, value) in intervals {
            if value == 0 {
                result.add_error(ValidationError::new(path, "must be greater than 0"));
            }
        }

        if config.observer.interval_ms > 1000 {
            result.add_warning(ValidationWarning::new(
                "observer.interval_ms",
                "polling slower than once a second makes buttons lag behind the player",
            ));
        }

        if config.host.max_retries == 0 {
            result.add_warning(ValidationWarning::new(
                "host.max_retries",
                "max_retries is 0, the plugin exits on the first connection failure",
            ));
        }

        if config.logging.max_files == 0 {
            result.add_error(ValidationError::new(
                "logging.max_files",
                "must keep at least one log file",
            ));
        }
    }

    fn validate_token(config: &Config, result: &mut ValidationResult) {
        if !is_http_url(&config.token.check_url) {
            result.add_error(ValidationError::new(
                "token.check_url",
                "check_url must be an http:// or https:// URL",
            ));
        }
    }

    fn validate_selectors(config: &Config, result: &mut ValidationResult) {
        for (name, chain) in &config.selectors {
            if chain.is_empty() || chain.iter().any(|s| s.trim().is_empty()) {
                result.add_error(ValidationError::new(
                    format!("selectors.{}", name),
                    "selector chain cannot be empty or contain empty selectors",
                ));
            }
        }
    }
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
