//! Service configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays, retry budget, capacities)
//! - Detect duplicate watched files
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const MAX_RETRIES: u32 = 20;
const MAX_DELAY_MS: u64 = 60_000;

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.schema_dir.as_os_str().is_empty() {
        errors.push(ValidationError::new("schema_dir", "must not be empty"));
    }

    if config.loader.max_retries > MAX_RETRIES {
        errors.push(ValidationError::new(
            "loader.max_retries",
            format!("must be at most {}", MAX_RETRIES),
        ));
    }
    if config.loader.retry_delay_ms > MAX_DELAY_MS {
        errors.push(ValidationError::new(
            "loader.retry_delay_ms",
            format!("must be at most {}", MAX_DELAY_MS),
        ));
    }

    if config.watch.debounce_ms > MAX_DELAY_MS {
        errors.push(ValidationError::new(
            "watch.debounce_ms",
            format!("must be at most {}", MAX_DELAY_MS),
        ));
    }
    if config.watch.use_polling && config.watch.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "watch.poll_interval_ms",
            "must be greater than 0 when polling",
        ));
    }

    if config.events.capacity == 0 {
        errors.push(ValidationError::new("events.capacity", "must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("must be one of {}", LOG_LEVELS.join(", ")),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    let mut seen = HashSet::new();
    for (i, file) in config.files.iter().enumerate() {
        if file.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(format!("files[{}].path", i), "must not be empty"));
        } else if !seen.insert(&file.path) {
            errors.push(ValidationError::new(
                format!("files[{}].path", i),
                format!("'{}' is listed more than once", file.path.display()),
            ));
        }
        if matches!(file.schema.as_deref(), Some("")) {
            errors.push(ValidationError::new(
                format!("files[{}].schema", i),
                "must not be empty when set",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
