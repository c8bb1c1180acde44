//! Consumed ledger shapes.
//!
//! The analytics engine does not own these records; they mirror the schema
//! of the external store. Monetary fields are `f64`: every
//! output of this engine is ratio/average math over aggregates, not postable
//! ledger amounts, and absent amounts are treated as zero when folding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{CompanyId, CustomerId, InvoiceId, ItemId};

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Pending,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = crate::error::AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(crate::error::AnalyticsError::invalid_filter(format!(
                "status must be one of draft, pending, paid, overdue, cancelled (got {other})"
            ))),
        }
    }
}

/// Invoice row as read from the external store.
///
/// Lifecycle: created in `draft`/`pending`; once `paid`, `paid_date` and
/// `payment_method` are expected non-null (assumed, not enforced here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub company_id: CompanyId,
    pub customer_id: CustomerId,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub subtotal: f64,
    /// Central tax component.
    pub cgst: f64,
    /// State tax component.
    pub sgst: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

impl Invoice {
    pub fn tax_total(&self) -> f64 {
        self.cgst + self.sgst
    }

    /// Effective tax rate as a percentage of the subtotal, 0 when empty.
    pub fn tax_rate(&self) -> f64 {
        if self.subtotal > 0.0 {
            self.tax_total() / self.subtotal * 100.0
        } else {
            0.0
        }
    }

    /// Days between invoicing and collection; `None` until paid.
    pub fn payment_days(&self) -> Option<i64> {
        self.paid_date
            .map(|paid| (paid - self.invoice_date).num_days())
    }

    /// Days paid (or still outstanding) past the due date, never negative.
    pub fn delay_days(&self, today: NaiveDate) -> i64 {
        let settled = self.paid_date.unwrap_or(today);
        (settled - self.due_date).num_days().max(0)
    }

    pub fn is_outstanding(&self) -> bool {
        matches!(self.status, InvoiceStatus::Pending | InvoiceStatus::Overdue)
    }
}

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub invoice_id: InvoiceId,
    pub item_id: ItemId,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

/// Customer master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub segment: Option<String>,
}

/// Company master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub established: Option<NaiveDate>,
}

/// Catalog item master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub selling_price: f64,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn invoice() -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            company_id: CompanyId::new(),
            customer_id: CustomerId::new(),
            invoice_date: d(2024, 1, 10),
            due_date: d(2024, 2, 10),
            paid_date: None,
            status: InvoiceStatus::Pending,
            subtotal: 1000.0,
            cgst: 90.0,
            sgst: 90.0,
            discount_amount: 0.0,
            total_amount: 1180.0,
            payment_method: None,
            payment_reference: None,
            notes: None,
        }
    }

    #[test]
    fn tax_rate_is_percentage_of_subtotal() {
        let inv = invoice();
        assert!((inv.tax_rate() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn tax_rate_guards_empty_subtotal() {
        let mut inv = invoice();
        inv.subtotal = 0.0;
        assert_eq!(inv.tax_rate(), 0.0);
    }

    #[test]
    fn delay_days_never_negative() {
        let mut inv = invoice();
        inv.paid_date = Some(d(2024, 2, 1));
        inv.status = InvoiceStatus::Paid;
        assert_eq!(inv.delay_days(d(2024, 3, 1)), 0);

        inv.paid_date = Some(d(2024, 2, 20));
        assert_eq!(inv.delay_days(d(2024, 3, 1)), 10);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in InvoiceStatus::ALL {
            assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), status);
        }
        assert!("void".parse::<InvoiceStatus>().is_err());
    }
}
