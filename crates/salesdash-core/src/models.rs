//! Core data models for the sales dashboard

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Customer number (primary key)
    pub custno: String,
    /// Display name
    pub custname: String,
}

/// Employee reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Employee number (primary key)
    pub empno: String,
    /// First name
    pub firstname: String,
    /// Last name
    pub lastname: String,
}

impl Employee {
    /// Full display name ("First Last")
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Product reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product code (primary key)
    pub prodcode: String,
    /// Product description
    pub description: String,
}

/// Product enriched with its current unit price
///
/// The current price is the unit price of the most recent price-history
/// entry by effective date, or zero if the product has no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedProduct {
    pub prodcode: String,
    pub description: String,
    pub current_price: Decimal,
}

/// Price-history entry (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHist {
    /// Product code
    pub prodcode: String,
    /// Effective date of this price
    pub effdate: NaiveDate,
    /// Unit price from this date onward
    pub unitprice: Decimal,
}

/// Sale transaction header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Transaction number (primary key, e.g. "TR00001")
    pub transno: String,
    /// Sale date
    pub salesdate: NaiveDate,
    /// Customer number
    pub custno: String,
    /// Employee number
    pub empno: String,
    /// Soft-delete timestamp (None while active)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// User id of the deleting actor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
    /// Free-text deletion reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_reason: Option<String>,
}

impl Sale {
    /// Check whether this sale carries soft-delete markers
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Sale line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDetail {
    /// Owning transaction number
    pub transno: String,
    /// Product code
    pub prodcode: String,
    /// Quantity sold (positive integer)
    pub quantity: u32,
    /// Soft-delete timestamp (set together with the header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// User id of the deleting actor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

/// Resolved line item with pricing (derived, not persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineView {
    pub prodcode: String,
    /// Product description ("Unknown" when the lookup misses)
    pub description: String,
    pub quantity: u32,
    /// Current unit price at computation time
    pub unit_price: Decimal,
    /// quantity x unit_price
    pub subtotal: Decimal,
}

/// Denormalized sale for display (derived, not persisted)
///
/// Prices are never snapshotted at sale time: every view recomputes
/// subtotals from the latest price history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleView {
    pub transno: String,
    pub salesdate: NaiveDate,
    pub custno: String,
    /// Resolved customer name ("Unknown" when the lookup misses)
    pub customer_name: String,
    pub empno: String,
    /// Resolved employee full name ("Unknown" when the lookup misses)
    pub employee_name: String,
    pub lines: Vec<SaleLineView>,
    /// Sum of all line subtotals
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_reason: Option<String>,
}

impl SaleView {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Per-customer aggregate over non-deleted sales (derived, not persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub custno: String,
    pub custname: String,
    /// Sum of totals over this customer's non-deleted sales
    pub total_sales: Decimal,
    /// Count of this customer's non-deleted sales
    pub sale_count: usize,
}

/// Audit log entry recorded alongside every soft delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionLog {
    /// Table the deleted record lives in (e.g. "sales")
    pub table_name: String,
    /// Primary key of the deleted record
    pub record_id: String,
    /// Generated id for the deletion event ("DEL-<millis>-<record>")
    pub transaction_id: String,
    /// User id of the deleting actor
    pub deleted_by: String,
    /// Display name of the deleting actor
    pub deleted_by_name: String,
    /// Free-text reason provided at the prompt
    pub reason: String,
    /// Snapshot of the sale at deletion time
    pub metadata: serde_json::Value,
    /// When the deletion happened
    pub deleted_at: DateTime<Utc>,
}

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Elevated role: may soft-delete and see deleted records
    Admin,
    /// Regular user
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Role assignment row (absent row means regular user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: String,
    pub role: Role,
}

/// Registered user account
///
/// The identity provider of the original system is an external
/// collaborator; this record carries only what the dashboard needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Demo-grade credential; a production deployment delegates
    /// verification to the identity provider.
    #[serde(skip_serializing)]
    pub password: String,
}

/// Current-session user as exposed by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&UserAccount> for SessionUser {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
        }
    }
}

/// User with resolved role, as listed on the admin page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRole {
    pub id: String,
    pub email: String,
    pub role: Role,
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_employee_full_name() {
        let emp = Employee {
            empno: "E001".to_string(),
            firstname: "Jane".to_string(),
            lastname: "Doe".to_string(),
        };
        assert_eq!(emp.full_name(), "Jane Doe");
    }

    #[test]
    fn test_sale_is_deleted() {
        let mut sale = Sale {
            transno: "TR00001".to_string(),
            salesdate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            custno: "C001".to_string(),
            empno: "E001".to_string(),
            deleted_at: None,
            deleted_by: None,
            delete_reason: None,
        };
        assert!(!sale.is_deleted());

        sale.deleted_at = Some(Utc::now());
        assert!(sale.is_deleted());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_session_user_from_account() {
        let account = UserAccount {
            id: "U1".to_string(),
            email: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            password: "secret".to_string(),
        };
        let session = SessionUser::from(&account);
        assert_eq!(session.id, "U1");
        assert_eq!(session.email, "jane@example.com");
    }

    #[test]
    fn test_decimal_line_math() {
        let line = SaleLineView {
            prodcode: "P001".to_string(),
            description: "Widget".to_string(),
            quantity: 3,
            unit_price: dec("10.00"),
            subtotal: dec("30.00"),
        };
        assert_eq!(line.unit_price * Decimal::from(line.quantity), line.subtotal);
    }
}
