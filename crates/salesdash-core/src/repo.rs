//! Sales repository: reference data, denormalized reads, and writes
//!
//! The original client resolved every name and price with per-row point
//! lookups (an N+1 fan-out). Here each listing loads the reference tables
//! once and joins in memory, which is the same observable result in one
//! round trip per table.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::models::{
    Customer, Employee, PriceHist, PricedProduct, Sale, SaleDetail, SaleLineView, SaleView,
};
use crate::store::StoreRef;

/// Placeholder for names whose point lookup misses
pub const UNKNOWN: &str = "Unknown";

/// Transaction number prefix
const TRANSNO_PREFIX: &str = "TR";
/// Zero-padded width of the numeric part
const TRANSNO_WIDTH: usize = 5;
/// Attempts before giving up on a conflicting transaction number
const TRANSNO_RETRIES: usize = 3;

/// Pick the current unit price from a product's history rows: the price
/// of the most recent entry by effective date, or zero with no history.
pub fn current_price(history: &[PriceHist]) -> Decimal {
    history
        .iter()
        .max_by_key(|p| p.effdate)
        .map(|p| p.unitprice)
        .unwrap_or_default()
}

/// Wholesale snapshot of the reference tables
///
/// State is only populated once every table has resolved; any store
/// error aborts the whole load with nothing partial surfaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
    pub customers: Vec<Customer>,
    pub employees: Vec<Employee>,
    pub products: Vec<PricedProduct>,
}

impl ReferenceData {
    /// Current price for a product from the loaded list
    pub fn product_price(&self, prodcode: &str) -> Option<Decimal> {
        self.products
            .iter()
            .find(|p| p.prodcode == prodcode)
            .map(|p| p.current_price)
    }
}

/// Draft line item as submitted by the form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    pub prodcode: String,
    pub quantity: u32,
}

/// Draft sale as submitted by the form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDraft {
    pub salesdate: chrono::NaiveDate,
    pub custno: String,
    pub empno: String,
    pub lines: Vec<DraftLine>,
}

/// Repository over the sales tables
#[derive(Clone)]
pub struct SalesRepository {
    store: StoreRef,
}

impl SalesRepository {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    /// Load customers, employees, and products with current prices
    pub async fn load_reference(&self) -> CoreResult<ReferenceData> {
        let customers = self.store.customers().await?;
        let employees = self.store.employees().await?;
        let products = self.store.products().await?;
        let history = self.store.all_price_history().await?;

        let prices = latest_prices(&history);
        let products = products
            .into_iter()
            .map(|p| {
                let current_price = prices.get(&p.prodcode).copied().unwrap_or_default();
                PricedProduct {
                    prodcode: p.prodcode,
                    description: p.description,
                    current_price,
                }
            })
            .collect();

        Ok(ReferenceData {
            customers,
            employees,
            products,
        })
    }

    /// List sales as denormalized views, newest first
    ///
    /// Deleted sales are excluded unless `include_deleted` is set.
    pub async fn list_sales(&self, include_deleted: bool) -> CoreResult<Vec<SaleView>> {
        let sales = self.store.sales().await?;
        let join = self.load_join_maps().await?;

        let mut by_transno: HashMap<String, Vec<SaleDetail>> = HashMap::new();
        for detail in self.store.all_sale_details().await? {
            by_transno
                .entry(detail.transno.clone())
                .or_default()
                .push(detail);
        }

        let mut views: Vec<SaleView> = Vec::new();
        for sale in sales {
            if sale.is_deleted() && !include_deleted {
                continue;
            }
            let details = by_transno.remove(&sale.transno).unwrap_or_default();
            views.push(resolve_sale(&sale, &details, &join));
        }

        views.sort_by(|a, b| b.salesdate.cmp(&a.salesdate).then(b.transno.cmp(&a.transno)));
        Ok(views)
    }

    /// Resolve a single sale to its denormalized view
    pub async fn sale_view(&self, transno: &str) -> CoreResult<SaleView> {
        let sale = self
            .store
            .sale(transno)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound {
                transno: transno.to_string(),
            })?;
        let details = self.store.sale_details(transno).await?;
        let join = self.load_join_maps().await?;
        Ok(resolve_sale(&sale, &details, &join))
    }

    /// Create a sale from a validated draft, generating the transaction
    /// number. The header and detail rows land in one store boundary;
    /// a number conflict is retried with a timestamp-derived fallback.
    pub async fn create_sale(&self, draft: SaleDraft) -> CoreResult<SaleView> {
        self.validate_draft(&draft).await?;

        let mut last_err = None;
        for attempt in 0..TRANSNO_RETRIES {
            let transno = if attempt == 0 {
                self.next_transno().await?
            } else {
                fallback_transno()
            };

            let sale = Sale {
                transno: transno.clone(),
                salesdate: draft.salesdate,
                custno: draft.custno.clone(),
                empno: draft.empno.clone(),
                deleted_at: None,
                deleted_by: None,
                delete_reason: None,
            };
            let details = draft_details(&transno, &draft.lines);

            match self.store.insert_sale(sale, details).await {
                Ok(()) => return self.sale_view(&transno).await,
                Err(CoreError::DuplicateEntry { entry }) => {
                    log::warn!(
                        "transaction number conflict on {}, retrying (attempt {})",
                        entry,
                        attempt + 1
                    );
                    last_err = Some(CoreError::DuplicateEntry { entry });
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or(CoreError::InternalError {
            message: "transaction number generation failed".to_string(),
        }))
    }

    /// Update header fields and replace the detail set in one boundary
    pub async fn update_sale(&self, transno: &str, draft: SaleDraft) -> CoreResult<SaleView> {
        self.validate_draft(&draft).await?;

        let existing = self
            .store
            .sale(transno)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound {
                transno: transno.to_string(),
            })?;

        let sale = Sale {
            transno: transno.to_string(),
            salesdate: draft.salesdate,
            custno: draft.custno.clone(),
            empno: draft.empno.clone(),
            deleted_at: existing.deleted_at,
            deleted_by: existing.deleted_by,
            delete_reason: existing.delete_reason,
        };
        let details = draft_details(transno, &draft.lines);

        self.store.update_sale(sale, details).await?;
        self.sale_view(transno).await
    }

    /// Next sequential transaction number from the highest existing one
    pub async fn next_transno(&self) -> CoreResult<String> {
        let max = self.store.max_transno().await?;
        Ok(bump_transno(max.as_deref()).unwrap_or_else(fallback_transno))
    }

    /// Underlying store handle
    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    async fn load_join_maps(&self) -> CoreResult<JoinMaps> {
        let reference = self.load_reference().await?;
        Ok(JoinMaps::from_reference(&reference))
    }

    /// Server-side draft validation, mirroring the form-level checks
    /// plus referential lookups the client cannot do.
    async fn validate_draft(&self, draft: &SaleDraft) -> CoreResult<()> {
        if draft.custno.is_empty() {
            return Err(CoreError::validation("custno", "customer is required"));
        }
        if draft.empno.is_empty() {
            return Err(CoreError::validation("empno", "employee is required"));
        }
        if draft.lines.is_empty() {
            return Err(CoreError::validation("lines", "at least one line is required"));
        }
        for (idx, line) in draft.lines.iter().enumerate() {
            if line.prodcode.is_empty() {
                return Err(CoreError::validation(
                    "lines",
                    &format!("line {} has no product selected", idx + 1),
                ));
            }
            if line.quantity == 0 {
                return Err(CoreError::validation(
                    "lines",
                    &format!("line {} quantity must be positive", idx + 1),
                ));
            }
        }

        if self.store.customer(&draft.custno).await?.is_none() {
            return Err(CoreError::CustomerNotFound {
                custno: draft.custno.clone(),
            });
        }
        if self.store.employee(&draft.empno).await?.is_none() {
            return Err(CoreError::EmployeeNotFound {
                empno: draft.empno.clone(),
            });
        }
        for line in &draft.lines {
            if self.store.product(&line.prodcode).await?.is_none() {
                return Err(CoreError::ProductNotFound {
                    prodcode: line.prodcode.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Join maps built once per listing
struct JoinMaps {
    customer_names: HashMap<String, String>,
    employee_names: HashMap<String, String>,
    products: HashMap<String, (String, Decimal)>,
}

impl JoinMaps {
    fn from_reference(reference: &ReferenceData) -> Self {
        let customer_names = reference
            .customers
            .iter()
            .map(|c| (c.custno.clone(), c.custname.clone()))
            .collect();
        let employee_names = reference
            .employees
            .iter()
            .map(|e| (e.empno.clone(), e.full_name()))
            .collect();
        let products = reference
            .products
            .iter()
            .map(|p| {
                (
                    p.prodcode.clone(),
                    (p.description.clone(), p.current_price),
                )
            })
            .collect();
        Self {
            customer_names,
            employee_names,
            products,
        }
    }
}

fn resolve_sale(sale: &Sale, details: &[SaleDetail], join: &JoinMaps) -> SaleView {
    let mut lines = Vec::with_capacity(details.len());
    let mut total = Decimal::ZERO;

    for detail in details {
        let (description, unit_price) = join
            .products
            .get(&detail.prodcode)
            .cloned()
            .unwrap_or_else(|| (UNKNOWN.to_string(), Decimal::ZERO));
        let subtotal = unit_price * Decimal::from(detail.quantity);
        total += subtotal;
        lines.push(SaleLineView {
            prodcode: detail.prodcode.clone(),
            description,
            quantity: detail.quantity,
            unit_price,
            subtotal,
        });
    }

    SaleView {
        transno: sale.transno.clone(),
        salesdate: sale.salesdate,
        custno: sale.custno.clone(),
        customer_name: join
            .customer_names
            .get(&sale.custno)
            .cloned()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        empno: sale.empno.clone(),
        employee_name: join
            .employee_names
            .get(&sale.empno)
            .cloned()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        lines,
        total,
        deleted_at: sale.deleted_at,
        deleted_by: sale.deleted_by.clone(),
        delete_reason: sale.delete_reason.clone(),
    }
}

/// Latest unit price per product code
fn latest_prices(history: &[PriceHist]) -> HashMap<String, Decimal> {
    let mut latest: HashMap<String, &PriceHist> = HashMap::new();
    for entry in history {
        match latest.get(&entry.prodcode) {
            Some(existing) if existing.effdate >= entry.effdate => {}
            _ => {
                latest.insert(entry.prodcode.clone(), entry);
            }
        }
    }
    latest
        .into_iter()
        .map(|(code, entry)| (code, entry.unitprice))
        .collect()
}

fn draft_details(transno: &str, lines: &[DraftLine]) -> Vec<SaleDetail> {
    lines
        .iter()
        .map(|line| SaleDetail {
            transno: transno.to_string(),
            prodcode: line.prodcode.clone(),
            quantity: line.quantity,
            deleted_at: None,
            deleted_by: None,
        })
        .collect()
}

/// Increment the numeric part of the highest transaction number:
/// strip non-digits, add one, zero-pad to five with the "TR" prefix.
/// Returns None when the numeric part cannot be parsed.
pub fn bump_transno(max: Option<&str>) -> Option<String> {
    let next = match max {
        None => 1,
        Some(max) => {
            let digits: String = max.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return None;
            }
            digits.parse::<u64>().ok()? + 1
        }
    };
    Some(format!(
        "{}{:0width$}",
        TRANSNO_PREFIX,
        next,
        width = TRANSNO_WIDTH
    ))
}

/// Timestamp-derived fallback number for when the sequence cannot be read
pub fn fallback_transno() -> String {
    format!("{}{}", TRANSNO_PREFIX, Utc::now().timestamp_millis())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Employee, Product};
    use crate::store::{MemoryStore, SalesStore};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded_repo() -> SalesRepository {
        let store = MemoryStore::new();
        store
            .insert_customer(Customer {
                custno: "C001".to_string(),
                custname: "Acme".to_string(),
            })
            .await
            .unwrap();
        store
            .insert_employee(Employee {
                empno: "E001".to_string(),
                firstname: "Jane".to_string(),
                lastname: "Doe".to_string(),
            })
            .await
            .unwrap();
        store
            .insert_product(Product {
                prodcode: "P001".to_string(),
                description: "Widget".to_string(),
            })
            .await
            .unwrap();
        store
            .add_price(PriceHist {
                prodcode: "P001".to_string(),
                effdate: date(2024, 1, 1),
                unitprice: dec("8.00"),
            })
            .await
            .unwrap();
        store
            .add_price(PriceHist {
                prodcode: "P001".to_string(),
                effdate: date(2024, 4, 1),
                unitprice: dec("10.00"),
            })
            .await
            .unwrap();
        SalesRepository::new(Arc::new(store))
    }

    fn draft(custno: &str, empno: &str, lines: Vec<DraftLine>) -> SaleDraft {
        SaleDraft {
            salesdate: date(2024, 5, 1),
            custno: custno.to_string(),
            empno: empno.to_string(),
            lines,
        }
    }

    fn line(prodcode: &str, quantity: u32) -> DraftLine {
        DraftLine {
            prodcode: prodcode.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_current_price_latest_by_effdate() {
        let history = vec![
            PriceHist {
                prodcode: "P001".to_string(),
                effdate: date(2024, 4, 1),
                unitprice: dec("10.00"),
            },
            PriceHist {
                prodcode: "P001".to_string(),
                effdate: date(2024, 1, 1),
                unitprice: dec("8.00"),
            },
        ];
        assert_eq!(current_price(&history), dec("10.00"));
    }

    #[test]
    fn test_current_price_defaults_to_zero() {
        assert_eq!(current_price(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_bump_transno() {
        assert_eq!(bump_transno(Some("TR00042")).unwrap(), "TR00043");
        assert_eq!(bump_transno(None).unwrap(), "TR00001");
        assert_eq!(bump_transno(Some("TR99999")).unwrap(), "TR100000");
        assert_eq!(bump_transno(Some("TRXYZ")), None);
    }

    #[test]
    fn test_fallback_transno_is_prefixed() {
        let no = fallback_transno();
        assert!(no.starts_with("TR"));
        assert!(no.len() > 7);
    }

    #[tokio::test]
    async fn test_load_reference_attaches_current_prices() {
        let repo = seeded_repo().await;
        let reference = repo.load_reference().await.unwrap();

        assert_eq!(reference.customers.len(), 1);
        assert_eq!(reference.employees.len(), 1);
        assert_eq!(reference.products.len(), 1);
        assert_eq!(reference.products[0].current_price, dec("10.00"));
        assert_eq!(reference.product_price("P001"), Some(dec("10.00")));
    }

    #[tokio::test]
    async fn test_create_sale_computes_totals() {
        let repo = seeded_repo().await;
        let view = repo
            .create_sale(draft("C001", "E001", vec![line("P001", 3)]))
            .await
            .unwrap();

        assert_eq!(view.transno, "TR00001");
        assert_eq!(view.customer_name, "Acme");
        assert_eq!(view.employee_name, "Jane Doe");
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].subtotal, dec("30.00"));
        assert_eq!(view.total, dec("30.00"));
    }

    #[tokio::test]
    async fn test_transno_sequence_increments() {
        let repo = seeded_repo().await;
        let first = repo
            .create_sale(draft("C001", "E001", vec![line("P001", 1)]))
            .await
            .unwrap();
        let second = repo
            .create_sale(draft("C001", "E001", vec![line("P001", 1)]))
            .await
            .unwrap();

        assert_eq!(first.transno, "TR00001");
        assert_eq!(second.transno, "TR00002");
    }

    #[tokio::test]
    async fn test_subtotal_follows_latest_price() {
        let repo = seeded_repo().await;
        let view = repo
            .create_sale(draft("C001", "E001", vec![line("P001", 2)]))
            .await
            .unwrap();
        assert_eq!(view.total, dec("20.00"));

        // A newer price-history row retroactively changes the displayed
        // total, since prices are never snapshotted.
        repo.store()
            .add_price(PriceHist {
                prodcode: "P001".to_string(),
                effdate: date(2024, 6, 1),
                unitprice: dec("12.50"),
            })
            .await
            .unwrap();

        let view = repo.sale_view(&view.transno).await.unwrap();
        assert_eq!(view.total, dec("25.00"));
    }

    #[tokio::test]
    async fn test_unknown_names_for_missing_lookups() {
        let repo = seeded_repo().await;
        let view = repo
            .create_sale(draft("C001", "E001", vec![line("P001", 1)]))
            .await
            .unwrap();

        repo.store().delete_customer("C001").await.unwrap();
        repo.store().delete_employee("E001").await.unwrap();

        let view = repo.sale_view(&view.transno).await.unwrap();
        assert_eq!(view.customer_name, UNKNOWN);
        assert_eq!(view.employee_name, UNKNOWN);
    }

    #[tokio::test]
    async fn test_validation_rejects_missing_customer() {
        let repo = seeded_repo().await;

        let err = repo
            .create_sale(draft("", "E001", vec![line("P001", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let err = repo
            .create_sale(draft("C404", "E001", vec![line("P001", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::CustomerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_lines() {
        let repo = seeded_repo().await;

        let err = repo
            .create_sale(draft("C001", "E001", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let err = repo
            .create_sale(draft("C001", "E001", vec![line("", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let err = repo
            .create_sale(draft("C001", "E001", vec![line("P001", 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_update_sale_replaces_lines() {
        let repo = seeded_repo().await;
        let view = repo
            .create_sale(draft("C001", "E001", vec![line("P001", 3)]))
            .await
            .unwrap();

        let updated = repo
            .update_sale(&view.transno, draft("C001", "E001", vec![line("P001", 5)]))
            .await
            .unwrap();
        assert_eq!(updated.lines.len(), 1);
        assert_eq!(updated.lines[0].quantity, 5);
        assert_eq!(updated.total, dec("50.00"));
    }

    #[tokio::test]
    async fn test_list_sales_sorted_newest_first() {
        let repo = seeded_repo().await;
        let mut early = draft("C001", "E001", vec![line("P001", 1)]);
        early.salesdate = date(2024, 3, 1);
        repo.create_sale(early).await.unwrap();

        let mut late = draft("C001", "E001", vec![line("P001", 1)]);
        late.salesdate = date(2024, 5, 1);
        repo.create_sale(late).await.unwrap();

        let views = repo.list_sales(false).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].salesdate, date(2024, 5, 1));
        assert_eq!(views[1].salesdate, date(2024, 3, 1));
    }
}
