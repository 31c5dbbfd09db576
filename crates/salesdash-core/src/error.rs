//! Error types for salesdash-core
//!
//! This module provides error handling for the core sales logic,
//! including error codes, detailed messages, and suggestions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Customer not found
    CustomerNotFound,
    /// Employee not found
    EmployeeNotFound,
    /// Product not found
    ProductNotFound,
    /// Sale not found
    SaleNotFound,
    /// User not found
    UserNotFound,
    /// Validation error
    ValidationError,
    /// Duplicate entry
    DuplicateEntry,
    /// Unauthorized access
    Unauthorized,
    /// Store error
    StoreError,
    /// Invalid data format
    InvalidFormat,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::CustomerNotFound => write!(f, "CUSTOMER_NOT_FOUND"),
            ErrorCode::EmployeeNotFound => write!(f, "EMPLOYEE_NOT_FOUND"),
            ErrorCode::ProductNotFound => write!(f, "PRODUCT_NOT_FOUND"),
            ErrorCode::SaleNotFound => write!(f, "SALE_NOT_FOUND"),
            ErrorCode::UserNotFound => write!(f, "USER_NOT_FOUND"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::StoreError => write!(f, "STORE_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Field path (for validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add field information
    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
        }
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Debug information
    Debug,
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for salesdash-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Customer not found: {custno}")]
    CustomerNotFound { custno: String },

    #[error("Employee not found: {empno}")]
    EmployeeNotFound { empno: String },

    #[error("Product not found: {prodcode}")]
    ProductNotFound { prodcode: String },

    #[error("Sale not found: {transno}")]
    SaleNotFound { transno: String },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Duplicate entry: {entry}")]
    DuplicateEntry { entry: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: &str, message: &str) -> Self {
        CoreError::ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::CustomerNotFound { .. } => ErrorCode::CustomerNotFound,
            CoreError::EmployeeNotFound { .. } => ErrorCode::EmployeeNotFound,
            CoreError::ProductNotFound { .. } => ErrorCode::ProductNotFound,
            CoreError::SaleNotFound { .. } => ErrorCode::SaleNotFound,
            CoreError::UserNotFound { .. } => ErrorCode::UserNotFound,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::StoreError { .. } => ErrorCode::StoreError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::CustomerNotFound { .. } => ErrorSeverity::Info,
            CoreError::EmployeeNotFound { .. } => ErrorSeverity::Info,
            CoreError::ProductNotFound { .. } => ErrorSeverity::Info,
            CoreError::SaleNotFound { .. } => ErrorSeverity::Info,
            CoreError::UserNotFound { .. } => ErrorSeverity::Info,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::DuplicateEntry { .. } => ErrorSeverity::Warning,
            CoreError::Unauthorized => ErrorSeverity::Warning,
            CoreError::StoreError { .. } => ErrorSeverity::Error,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::CustomerNotFound { custno } => {
                details = details.with_suggestion(format!(
                    "Check if the customer '{}' exists.",
                    custno
                ));
                details = details.with_suggestion(
                    "Use the /api/customers endpoint to list all customers.".to_string(),
                );
            }
            CoreError::SaleNotFound { transno } => {
                details = details.with_suggestion(format!(
                    "Check if the transaction number '{}' is correct.",
                    transno
                ));
                details = details.with_suggestion(
                    "Use the /api/sales endpoint to list all sales.".to_string(),
                );
            }
            CoreError::ValidationError { field, message } => {
                details = details.with_field(field.clone());
                details =
                    details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::DuplicateEntry { entry } => {
                details = details.with_suggestion(format!(
                    "An entry with key '{}' already exists.",
                    entry
                ));
            }
            CoreError::Unauthorized => {
                details = details.with_suggestion(
                    "This action requires the admin role.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::SaleNotFound.to_string(), "SALE_NOT_FOUND");
        assert_eq!(ErrorCode::ValidationError.to_string(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::DuplicateEntry.to_string(), "DUPLICATE_ENTRY");
    }

    #[test]
    fn test_error_severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
        assert_eq!(ErrorSeverity::Error.to_string(), "error");
        assert_eq!(ErrorSeverity::Critical.to_string(), "critical");
    }

    #[test]
    fn test_core_error_code() {
        let error = CoreError::SaleNotFound {
            transno: "TR00001".to_string(),
        };
        assert_eq!(error.code(), ErrorCode::SaleNotFound);

        let error = CoreError::Unauthorized;
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn test_core_error_severity() {
        let error = CoreError::Unauthorized;
        assert_eq!(error.severity(), ErrorSeverity::Warning);

        let error = CoreError::StoreError {
            message: "test".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_error_details_sale_not_found() {
        let error = CoreError::SaleNotFound {
            transno: "TR00042".to_string(),
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::SaleNotFound);
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("TR00042"));
    }

    #[test]
    fn test_error_details_validation() {
        let error = CoreError::validation("custno", "customer is required");
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::ValidationError);
        assert_eq!(details.field, Some("custno".to_string()));
        assert!(details.details.is_some());
    }

    #[test]
    fn test_error_details_builder() {
        let details = ErrorDetails::new(
            ErrorCode::ValidationError,
            "Validation failed".to_string(),
        )
        .with_field("quantity".to_string())
        .with_detail(serde_json::json!({"expected": "positive integer"}))
        .with_suggestion("Check the value".to_string());

        assert_eq!(details.code, ErrorCode::ValidationError);
        assert!(details.details.is_some());
        assert_eq!(details.suggestions.len(), 1);
        assert_eq!(details.field, Some("quantity".to_string()));
    }
}
