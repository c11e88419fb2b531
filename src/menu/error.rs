use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every problem found with a candidate record, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Prefix every field with `scope`, e.g. the offending menu id when a
    /// whole defaults table is checked at once.
    pub fn scoped(self, scope: &str) -> Self {
        let violations = self
            .violations
            .into_iter()
            .map(|v| Violation::new(format!("{}.{}", scope, v.field), v.message))
            .collect();
        Self { violations }
    }

    pub fn merge(&mut self, other: ValidationError) {
        self.violations.extend(other.violations);
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{} {}", v.field, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Errors surfaced by the menu registry and its services.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Menu item '{0}' already exists")]
    DuplicateKey(String),

    #[error("Menu item '{0}' not found")]
    NotFound(String),

    #[error("Menu store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Defaults table declares '{0}' more than once")]
    DuplicateDefinition(String),

    #[error("Menu store error: {0}")]
    Internal(String),
}

impl MenuError {
    /// Only connectivity failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MenuError::StoreUnavailable(_))
    }
}

pub type MenuResult<T> = Result<T, MenuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_all_violations() {
        let err = ValidationError::new(vec![
            Violation::new("label", "must not be empty"),
            Violation::new("order", "must be non-negative, got -1"),
        ]);
        assert_eq!(err.to_string(), "label must not be empty; order must be non-negative, got -1");
    }

    #[test]
    fn scoped_prefixes_fields() {
        let err = ValidationError::new(vec![Violation::new("path", "is required")]).scoped("reports");
        assert_eq!(err.violations()[0].field, "reports.path");
    }

    #[test]
    fn only_store_unavailable_is_retryable() {
        assert!(MenuError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!MenuError::NotFound("x".into()).is_retryable());
        assert!(!MenuError::DuplicateKey("x".into()).is_retryable());
    }
}
