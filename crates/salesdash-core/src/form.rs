//! In-memory sale form state
//!
//! Holds the header fields and the ordered line list while a sale is
//! being entered or edited, recomputing line subtotals and the grand
//! total on every edit. Prices come from the already-loaded reference
//! list, never from a fresh store round trip.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::SaleView;
use crate::repo::{DraftLine, ReferenceData, SaleDraft};

/// One editable line row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormLine {
    pub prodcode: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl FormLine {
    fn blank() -> Self {
        Self {
            prodcode: String::new(),
            quantity: 1,
            unit_price: Decimal::ZERO,
            subtotal: Decimal::ZERO,
        }
    }

    fn recompute(&mut self) {
        self.subtotal = self.unit_price * Decimal::from(self.quantity);
    }
}

/// Sale form controller
///
/// Invariant: the line list never drops below one row while the form
/// is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleForm {
    pub transno: Option<String>,
    pub salesdate: NaiveDate,
    pub custno: String,
    pub empno: String,
    pub lines: Vec<FormLine>,
}

impl SaleForm {
    /// Fresh form for a new sale, starting with one blank line
    pub fn new(salesdate: NaiveDate) -> Self {
        Self {
            transno: None,
            salesdate,
            custno: String::new(),
            empno: String::new(),
            lines: vec![FormLine::blank()],
        }
    }

    /// Form pre-filled from an existing sale view (edit mode)
    pub fn from_view(view: &SaleView) -> Self {
        let lines = view
            .lines
            .iter()
            .map(|l| FormLine {
                prodcode: l.prodcode.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
                subtotal: l.subtotal,
            })
            .collect::<Vec<_>>();
        Self {
            transno: Some(view.transno.clone()),
            salesdate: view.salesdate,
            custno: view.custno.clone(),
            empno: view.empno.clone(),
            lines: if lines.is_empty() {
                vec![FormLine::blank()]
            } else {
                lines
            },
        }
    }

    /// Append a blank row with quantity 1
    pub fn add_line(&mut self) {
        self.lines.push(FormLine::blank());
    }

    /// Select a product for a row and pull its current price from the
    /// loaded reference list
    pub fn set_line_product(
        &mut self,
        index: usize,
        prodcode: &str,
        reference: &ReferenceData,
    ) -> CoreResult<()> {
        let line = self.line_mut(index)?;
        line.prodcode = prodcode.to_string();
        line.unit_price = reference.product_price(prodcode).unwrap_or_default();
        line.recompute();
        Ok(())
    }

    /// Set a row's quantity from raw input and recompute the subtotal
    pub fn set_line_quantity(&mut self, index: usize, input: &str) -> CoreResult<()> {
        let quantity: u32 = input.trim().parse().map_err(|_| {
            CoreError::validation("quantity", "quantity must be a positive integer")
        })?;
        if quantity == 0 {
            return Err(CoreError::validation(
                "quantity",
                "quantity must be a positive integer",
            ));
        }
        let line = self.line_mut(index)?;
        line.quantity = quantity;
        line.recompute();
        Ok(())
    }

    /// Remove a row; rejected when exactly one row remains
    pub fn remove_line(&mut self, index: usize) -> CoreResult<()> {
        if self.lines.len() <= 1 {
            return Err(CoreError::validation(
                "lines",
                "a sale needs at least one line",
            ));
        }
        if index >= self.lines.len() {
            return Err(CoreError::validation("lines", "no such line"));
        }
        self.lines.remove(index);
        Ok(())
    }

    /// Grand total: sum of all line subtotals
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    /// Field-level validation before submit; the first failure aborts
    pub fn validate(&self) -> CoreResult<()> {
        if self.custno.is_empty() {
            return Err(CoreError::validation("custno", "customer is required"));
        }
        if self.empno.is_empty() {
            return Err(CoreError::validation("empno", "employee is required"));
        }
        for (idx, line) in self.lines.iter().enumerate() {
            if line.prodcode.is_empty() {
                return Err(CoreError::validation(
                    "lines",
                    &format!("line {} has no product selected", idx + 1),
                ));
            }
        }
        Ok(())
    }

    /// Convert the validated form into a submittable draft
    pub fn to_draft(&self) -> CoreResult<SaleDraft> {
        self.validate()?;
        Ok(SaleDraft {
            salesdate: self.salesdate,
            custno: self.custno.clone(),
            empno: self.empno.clone(),
            lines: self
                .lines
                .iter()
                .map(|l| DraftLine {
                    prodcode: l.prodcode.clone(),
                    quantity: l.quantity,
                })
                .collect(),
        })
    }

    fn line_mut(&mut self, index: usize) -> CoreResult<&mut FormLine> {
        self.lines
            .get_mut(index)
            .ok_or_else(|| CoreError::validation("lines", "no such line"))
    }
}

// ==================== Tests ====================
