//! Analytics aggregates over non-deleted sales
//!
//! Everything here is derived on demand from the active sales list;
//! nothing is persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreResult;
use crate::models::CustomerSummary;
use crate::repo::SalesRepository;

/// Dashboard overview numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewStats {
    /// Sum of totals over all non-deleted sales
    pub total_revenue: Decimal,
    /// Count of non-deleted sales
    pub sale_count: usize,
    /// Customers with at least one non-deleted sale
    pub active_customers: usize,
}

/// One month's sales total ("YYYY-MM")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySales {
    pub month: String,
    pub total: Decimal,
    pub sale_count: usize,
}

/// Overview stats for the dashboard cards
pub async fn overview(repo: &SalesRepository) -> CoreResult<OverviewStats> {
    let sales = repo.list_sales(false).await?;
    let total_revenue = sales.iter().map(|s| s.total).sum();
    let active_customers = {
        let mut customers: Vec<&str> = sales.iter().map(|s| s.custno.as_str()).collect();
        customers.sort_unstable();
        customers.dedup();
        customers.len()
    };
    Ok(OverviewStats {
        total_revenue,
        sale_count: sales.len(),
        active_customers,
    })
}

/// Monthly totals for the sales chart, oldest month first
pub async fn monthly_sales(repo: &SalesRepository) -> CoreResult<Vec<MonthlySales>> {
    let sales = repo.list_sales(false).await?;
    let mut months: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for sale in &sales {
        let month = sale.salesdate.format("%Y-%m").to_string();
        let entry = months.entry(month).or_insert((Decimal::ZERO, 0));
        entry.0 += sale.total;
        entry.1 += 1;
    }
    Ok(months
        .into_iter()
        .map(|(month, (total, sale_count))| MonthlySales {
            month,
            total,
            sale_count,
        })
        .collect())
}

/// Per-customer aggregates over non-deleted sales, covering every
/// customer (zero rows for customers without sales)
pub async fn customer_summaries(repo: &SalesRepository) -> CoreResult<Vec<CustomerSummary>> {
    let customers = repo.store().customers().await?;
    let sales = repo.list_sales(false).await?;

    let mut totals: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for sale in &sales {
        let entry = totals.entry(sale.custno.as_str()).or_insert((Decimal::ZERO, 0));
        entry.0 += sale.total;
        entry.1 += 1;
    }

    Ok(customers
        .into_iter()
        .map(|c| {
            let (total_sales, sale_count) = totals
                .get(c.custno.as_str())
                .copied()
                .unwrap_or((Decimal::ZERO, 0));
            CustomerSummary {
                custno: c.custno,
                custname: c.custname,
                total_sales,
                sale_count,
            }
        })
        .collect())
}

// ==================== Tests ====================
