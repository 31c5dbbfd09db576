//! Store abstraction over the relational tables
//!
//! The original system talks to a hosted relational store; here the
//! persistence engine is an external collaborator reached through the
//! [`SalesStore`] trait. [`MemoryStore`] is the bundled implementation:
//! plain tables behind a lock, with every write method holding the write
//! lock for the whole operation so multi-row writes are atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::error::{CoreError, CoreResult};
use crate::models::{
    Customer, DeletionLog, Employee, PriceHist, Product, Role, Sale, SaleDetail, UserAccount,
    UserRole,
};

/// Store reference type
pub type StoreRef = Arc<dyn SalesStore>;

/// Generic store contract for the dashboard tables
///
/// Tables: `customer`, `employee`, `product`, `pricehist`, `sales`,
/// `salesdetail`, `user_roles`, `deletion_logs`, plus the user accounts
/// the identity provider would own.
#[async_trait]
pub trait SalesStore: Send + Sync {
    // ---- reference tables ----
    async fn customers(&self) -> CoreResult<Vec<Customer>>;
    async fn customer(&self, custno: &str) -> CoreResult<Option<Customer>>;
    async fn insert_customer(&self, customer: Customer) -> CoreResult<()>;
    async fn update_customer(&self, customer: Customer) -> CoreResult<()>;
    async fn delete_customer(&self, custno: &str) -> CoreResult<()>;

    async fn employees(&self) -> CoreResult<Vec<Employee>>;
    async fn employee(&self, empno: &str) -> CoreResult<Option<Employee>>;
    async fn insert_employee(&self, employee: Employee) -> CoreResult<()>;
    async fn update_employee(&self, employee: Employee) -> CoreResult<()>;
    async fn delete_employee(&self, empno: &str) -> CoreResult<()>;

    async fn products(&self) -> CoreResult<Vec<Product>>;
    async fn product(&self, prodcode: &str) -> CoreResult<Option<Product>>;
    async fn insert_product(&self, product: Product) -> CoreResult<()>;
    async fn update_product(&self, product: Product) -> CoreResult<()>;
    async fn delete_product(&self, prodcode: &str) -> CoreResult<()>;

    /// Full price history for one product
    async fn price_history(&self, prodcode: &str) -> CoreResult<Vec<PriceHist>>;
    /// Every price-history row (for batched joins)
    async fn all_price_history(&self) -> CoreResult<Vec<PriceHist>>;
    async fn add_price(&self, price: PriceHist) -> CoreResult<()>;

    // ---- sales ----
    async fn sales(&self) -> CoreResult<Vec<Sale>>;
    async fn sale(&self, transno: &str) -> CoreResult<Option<Sale>>;
    async fn sale_details(&self, transno: &str) -> CoreResult<Vec<SaleDetail>>;
    /// Every detail row (for batched joins)
    async fn all_sale_details(&self) -> CoreResult<Vec<SaleDetail>>;
    /// Highest existing transaction number, if any
    async fn max_transno(&self) -> CoreResult<Option<String>>;
    /// Insert a header and its details in one transaction boundary.
    /// Fails with `DuplicateEntry` when the transaction number is taken.
    async fn insert_sale(&self, sale: Sale, details: Vec<SaleDetail>) -> CoreResult<()>;
    /// Update the header and replace all detail rows in one boundary.
    async fn update_sale(&self, sale: Sale, details: Vec<SaleDetail>) -> CoreResult<()>;
    /// Mark the header and every detail row with deletion markers and
    /// append the audit log entry, all in one boundary.
    async fn soft_delete_sale(
        &self,
        transno: &str,
        deleted_at: DateTime<Utc>,
        deleted_by: &str,
        reason: &str,
        log: DeletionLog,
    ) -> CoreResult<()>;
    async fn deletion_logs(&self) -> CoreResult<Vec<DeletionLog>>;

    // ---- users and roles ----
    async fn role(&self, user_id: &str) -> CoreResult<Option<Role>>;
    /// Upsert a role assignment
    async fn set_role(&self, user_id: &str, role: Role) -> CoreResult<()>;
    async fn users(&self) -> CoreResult<Vec<UserAccount>>;
    async fn user_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>>;
    async fn insert_user(&self, user: UserAccount) -> CoreResult<()>;
}

/// In-memory table data
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pricehist: Vec<PriceHist>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub salesdetail: Vec<SaleDetail>,
    #[serde(default)]
    pub user_roles: Vec<UserRole>,
    #[serde(default)]
    pub deletion_logs: Vec<DeletionLog>,
    #[serde(default)]
    pub users: Vec<UserAccount>,
}

/// In-memory store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<TableData>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with seed data
    pub fn with_data(data: TableData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }
}

#[async_trait]
impl SalesStore for MemoryStore {
    async fn customers(&self) -> CoreResult<Vec<Customer>> {
        Ok(self.data.read().unwrap().customers.clone())
    }

    async fn customer(&self, custno: &str) -> CoreResult<Option<Customer>> {
        let data = self.data.read().unwrap();
        Ok(data.customers.iter().find(|c| c.custno == custno).cloned())
    }

    async fn insert_customer(&self, customer: Customer) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        if data.customers.iter().any(|c| c.custno == customer.custno) {
            return Err(CoreError::DuplicateEntry {
                entry: customer.custno,
            });
        }
        data.customers.push(customer);
        Ok(())
    }

    async fn update_customer(&self, customer: Customer) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        match data.customers.iter_mut().find(|c| c.custno == customer.custno) {
            Some(existing) => {
                *existing = customer;
                Ok(())
            }
            None => Err(CoreError::CustomerNotFound {
                custno: customer.custno,
            }),
        }
    }

    async fn delete_customer(&self, custno: &str) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        let before = data.customers.len();
        data.customers.retain(|c| c.custno != custno);
        if data.customers.len() == before {
            return Err(CoreError::CustomerNotFound {
                custno: custno.to_string(),
            });
        }
        Ok(())
    }

    async fn employees(&self) -> CoreResult<Vec<Employee>> {
        Ok(self.data.read().unwrap().employees.clone())
    }

    async fn employee(&self, empno: &str) -> CoreResult<Option<Employee>> {
        let data = self.data.read().unwrap();
        Ok(data.employees.iter().find(|e| e.empno == empno).cloned())
    }

    async fn insert_employee(&self, employee: Employee) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        if data.employees.iter().any(|e| e.empno == employee.empno) {
            return Err(CoreError::DuplicateEntry {
                entry: employee.empno,
            });
        }
        data.employees.push(employee);
        Ok(())
    }

    async fn update_employee(&self, employee: Employee) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        match data.employees.iter_mut().find(|e| e.empno == employee.empno) {
            Some(existing) => {
                *existing = employee;
                Ok(())
            }
            None => Err(CoreError::EmployeeNotFound {
                empno: employee.empno,
            }),
        }
    }

    async fn delete_employee(&self, empno: &str) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        let before = data.employees.len();
        data.employees.retain(|e| e.empno != empno);
        if data.employees.len() == before {
            return Err(CoreError::EmployeeNotFound {
                empno: empno.to_string(),
            });
        }
        Ok(())
    }

    async fn products(&self) -> CoreResult<Vec<Product>> {
        Ok(self.data.read().unwrap().products.clone())
    }

    async fn product(&self, prodcode: &str) -> CoreResult<Option<Product>> {
        let data = self.data.read().unwrap();
        Ok(data.products.iter().find(|p| p.prodcode == prodcode).cloned())
    }

    async fn insert_product(&self, product: Product) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        if data.products.iter().any(|p| p.prodcode == product.prodcode) {
            return Err(CoreError::DuplicateEntry {
                entry: product.prodcode,
            });
        }
        data.products.push(product);
        Ok(())
    }

    async fn update_product(&self, product: Product) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        match data.products.iter_mut().find(|p| p.prodcode == product.prodcode) {
            Some(existing) => {
                *existing = product;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound {
                prodcode: product.prodcode,
            }),
        }
    }

    async fn delete_product(&self, prodcode: &str) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        let before = data.products.len();
        data.products.retain(|p| p.prodcode != prodcode);
        if data.products.len() == before {
            return Err(CoreError::ProductNotFound {
                prodcode: prodcode.to_string(),
            });
        }
        Ok(())
    }

    async fn price_history(&self, prodcode: &str) -> CoreResult<Vec<PriceHist>> {
        let data = self.data.read().unwrap();
        Ok(data
            .pricehist
            .iter()
            .filter(|p| p.prodcode == prodcode)
            .cloned()
            .collect())
    }

    async fn all_price_history(&self) -> CoreResult<Vec<PriceHist>> {
        Ok(self.data.read().unwrap().pricehist.clone())
    }

    async fn add_price(&self, price: PriceHist) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        if !data.products.iter().any(|p| p.prodcode == price.prodcode) {
            return Err(CoreError::ProductNotFound {
                prodcode: price.prodcode,
            });
        }
        data.pricehist.push(price);
        Ok(())
    }

    async fn sales(&self) -> CoreResult<Vec<Sale>> {
        Ok(self.data.read().unwrap().sales.clone())
    }

    async fn sale(&self, transno: &str) -> CoreResult<Option<Sale>> {
        let data = self.data.read().unwrap();
        Ok(data.sales.iter().find(|s| s.transno == transno).cloned())
    }

    async fn sale_details(&self, transno: &str) -> CoreResult<Vec<SaleDetail>> {
        let data = self.data.read().unwrap();
        Ok(data
            .salesdetail
            .iter()
            .filter(|d| d.transno == transno)
            .cloned()
            .collect())
    }

    async fn all_sale_details(&self) -> CoreResult<Vec<SaleDetail>> {
        Ok(self.data.read().unwrap().salesdetail.clone())
    }

    async fn max_transno(&self) -> CoreResult<Option<String>> {
        let data = self.data.read().unwrap();
        Ok(data.sales.iter().map(|s| s.transno.clone()).max())
    }

    async fn insert_sale(&self, sale: Sale, details: Vec<SaleDetail>) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        if data.sales.iter().any(|s| s.transno == sale.transno) {
            return Err(CoreError::DuplicateEntry {
                entry: sale.transno,
            });
        }
        data.sales.push(sale);
        data.salesdetail.extend(details);
        Ok(())
    }

    async fn update_sale(&self, sale: Sale, details: Vec<SaleDetail>) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        let transno = sale.transno.clone();
        let existing = data
            .sales
            .iter_mut()
            .find(|s| s.transno == transno)
            .ok_or_else(|| CoreError::SaleNotFound {
                transno: transno.clone(),
            })?;
        *existing = sale;
        data.salesdetail.retain(|d| d.transno != transno);
        data.salesdetail.extend(details);
        Ok(())
    }

    async fn soft_delete_sale(
        &self,
        transno: &str,
        deleted_at: DateTime<Utc>,
        deleted_by: &str,
        reason: &str,
        log: DeletionLog,
    ) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        let sale = data
            .sales
            .iter_mut()
            .find(|s| s.transno == transno)
            .ok_or_else(|| CoreError::SaleNotFound {
                transno: transno.to_string(),
            })?;
        if sale.deleted_at.is_some() {
            return Err(CoreError::validation("transno", "sale is already deleted"));
        }
        sale.deleted_at = Some(deleted_at);
        sale.deleted_by = Some(deleted_by.to_string());
        sale.delete_reason = Some(reason.to_string());

        for detail in data.salesdetail.iter_mut().filter(|d| d.transno == transno) {
            detail.deleted_at = Some(deleted_at);
            detail.deleted_by = Some(deleted_by.to_string());
        }

        data.deletion_logs.push(log);
        Ok(())
    }

    async fn deletion_logs(&self) -> CoreResult<Vec<DeletionLog>> {
        Ok(self.data.read().unwrap().deletion_logs.clone())
    }

    async fn role(&self, user_id: &str) -> CoreResult<Option<Role>> {
        let data = self.data.read().unwrap();
        Ok(data
            .user_roles
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.role))
    }

    async fn set_role(&self, user_id: &str, role: Role) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        match data.user_roles.iter_mut().find(|r| r.user_id == user_id) {
            Some(existing) => existing.role = role,
            None => data.user_roles.push(UserRole {
                user_id: user_id.to_string(),
                role,
            }),
        }
        Ok(())
    }

    async fn users(&self) -> CoreResult<Vec<UserAccount>> {
        Ok(self.data.read().unwrap().users.clone())
    }

    async fn user_by_email(&self, email: &str) -> CoreResult<Option<UserAccount>> {
        let data = self.data.read().unwrap();
        Ok(data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_user(&self, user: UserAccount) -> CoreResult<()> {
        let mut data = self.data.write().unwrap();
        if data
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CoreError::DuplicateEntry { entry: user.email });
        }
        data.users.push(user);
        Ok(())
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn sale(transno: &str) -> Sale {
        Sale {
            transno: transno.to_string(),
            salesdate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            custno: "C001".to_string(),
            empno: "E001".to_string(),
            deleted_at: None,
            deleted_by: None,
            delete_reason: None,
        }
    }

    fn detail(transno: &str, prodcode: &str, quantity: u32) -> SaleDetail {
        SaleDetail {
            transno: transno.to_string(),
            prodcode: prodcode.to_string(),
            quantity,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[tokio::test]
    async fn test_insert_sale_rejects_duplicate_transno() {
        let store = MemoryStore::new();
        store
            .insert_sale(sale("TR00001"), vec![detail("TR00001", "P001", 1)])
            .await
            .unwrap();

        let err = store
            .insert_sale(sale("TR00001"), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntry { .. }));
    }

    #[tokio::test]
    async fn test_update_sale_replaces_details() {
        let store = MemoryStore::new();
        store
            .insert_sale(
                sale("TR00001"),
                vec![detail("TR00001", "P001", 1), detail("TR00001", "P002", 2)],
            )
            .await
            .unwrap();

        store
            .update_sale(sale("TR00001"), vec![detail("TR00001", "P003", 5)])
            .await
            .unwrap();

        let details = store.sale_details("TR00001").await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].prodcode, "P003");
        assert_eq!(details[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_rows_with_markers() {
        let store = MemoryStore::new();
        store
            .insert_sale(sale("TR00001"), vec![detail("TR00001", "P001", 3)])
            .await
            .unwrap();

        let stamp = Utc::now();
        let log = DeletionLog {
            table_name: "sales".to_string(),
            record_id: "TR00001".to_string(),
            transaction_id: "DEL-1-TR00001".to_string(),
            deleted_by: "A1".to_string(),
            deleted_by_name: "Admin One".to_string(),
            reason: "duplicate entry".to_string(),
            metadata: serde_json::json!({}),
            deleted_at: stamp,
        };
        store
            .soft_delete_sale("TR00001", stamp, "A1", "duplicate entry", log)
            .await
            .unwrap();

        let header = store.sale("TR00001").await.unwrap().unwrap();
        assert!(header.is_deleted());
        assert_eq!(header.deleted_by.as_deref(), Some("A1"));
        assert_eq!(header.delete_reason.as_deref(), Some("duplicate entry"));

        let details = store.sale_details("TR00001").await.unwrap();
        assert!(!details.is_empty());
        assert!(details.iter().all(|d| d.deleted_at.is_some()));

        let logs = store.deletion_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].record_id, "TR00001");
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_rejected() {
        let store = MemoryStore::new();
        store.insert_sale(sale("TR00001"), vec![]).await.unwrap();

        let stamp = Utc::now();
        let log = DeletionLog {
            table_name: "sales".to_string(),
            record_id: "TR00001".to_string(),
            transaction_id: "DEL-1-TR00001".to_string(),
            deleted_by: "A1".to_string(),
            deleted_by_name: "Admin One".to_string(),
            reason: "dup".to_string(),
            metadata: serde_json::json!({}),
            deleted_at: stamp,
        };
        store
            .soft_delete_sale("TR00001", stamp, "A1", "dup", log.clone())
            .await
            .unwrap();

        let err = store
            .soft_delete_sale("TR00001", stamp, "A1", "dup", log)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_max_transno() {
        let store = MemoryStore::new();
        assert_eq!(store.max_transno().await.unwrap(), None);

        store.insert_sale(sale("TR00007"), vec![]).await.unwrap();
        store.insert_sale(sale("TR00042"), vec![]).await.unwrap();
        store.insert_sale(sale("TR00013"), vec![]).await.unwrap();

        assert_eq!(
            store.max_transno().await.unwrap(),
            Some("TR00042".to_string())
        );
    }

    #[tokio::test]
    async fn test_role_upsert() {
        let store = MemoryStore::new();
        assert_eq!(store.role("U1").await.unwrap(), None);

        store.set_role("U1", Role::Admin).await.unwrap();
        assert_eq!(store.role("U1").await.unwrap(), Some(Role::Admin));

        store.set_role("U1", Role::User).await.unwrap();
        assert_eq!(store.role("U1").await.unwrap(), Some(Role::User));
    }

    #[tokio::test]
    async fn test_add_price_requires_product() {
        let store = MemoryStore::new();
        let err = store
            .add_price(PriceHist {
                prodcode: "P404".to_string(),
                effdate: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                unitprice: Decimal::new(1000, 2),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let store = MemoryStore::new();
        store
            .insert_user(UserAccount {
                id: "U1".to_string(),
                email: "jane@example.com".to_string(),
                name: "Jane".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();

        let err = store
            .insert_user(UserAccount {
                id: "U2".to_string(),
                email: "JANE@example.com".to_string(),
                name: "Other Jane".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEntry { .. }));
    }
}
