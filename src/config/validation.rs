//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (block size > 0, threshold finite)
//! - Check the palette is usable (non-empty, unique names)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("listener.backlog must be greater than zero")]
    ZeroBacklog,

    #[error("reader.block_size must be greater than zero")]
    ZeroBlockSize,

    #[error("classifier.reject_threshold must be a finite, non-negative number (got {0})")]
    InvalidThreshold(f64),

    #[error("classifier.palette must contain at least one color")]
    EmptyPalette,

    #[error("classifier.palette entry #{0} has an empty name")]
    UnnamedColor(usize),

    #[error("classifier.palette contains '{0}' more than once")]
    DuplicateColor(String),

    #[error("observability.metrics_address must not be empty when metrics are enabled")]
    EmptyMetricsAddress,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::ZeroBacklog);
    }
    if config.reader.block_size == 0 {
        errors.push(ValidationError::ZeroBlockSize);
    }

    let threshold = config.classifier.reject_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        errors.push(ValidationError::InvalidThreshold(threshold));
    }

    if config.classifier.palette.is_empty() {
        errors.push(ValidationError::EmptyPalette);
    }
    let mut seen = HashSet::new();
    for (i, entry) in config.classifier.palette.iter().enumerate() {
        if entry.name.is_empty() {
            errors.push(ValidationError::UnnamedColor(i));
        } else if !seen.insert(entry.name.as_str()) {
            errors.push(ValidationError::DuplicateColor(entry.name.clone()));
        }
    }

    if config.observability.metrics_enabled && config.observability.metrics_address.trim().is_empty() {
        errors.push(ValidationError::EmptyMetricsAddress);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
