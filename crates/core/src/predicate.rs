//! Predicate tree built from a `FilterSpec`.
//!
//! A `Predicate` is a conjunctive list of tagged clauses, engine-agnostic: a
//! SQL adapter can render it to WHERE fragments, the in-memory store
//! evaluates it directly via `matches`. Construction is deterministic:
//! identical specs produce identical clause lists and therefore identical
//! serialized forms.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{Invoice, InvoiceStatus};
use crate::filter::FilterSpec;
use crate::id::{CompanyId, CustomerId};

/// Field a clause applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    InvoiceDate,
    CompanyId,
    CustomerId,
    Status,
}

/// One conjunct of the predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Clause {
    /// `field >= min AND field <= max` (either bound may be open).
    Range {
        field: Field,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<NaiveDate>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<NaiveDate>,
    },
    /// `field = value`.
    Eq { field: Field, value: String },
}

/// Conjunction of clauses; empty predicate matches all rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Translate a filter into clauses, in fixed field order.
    pub fn build(spec: &FilterSpec) -> Predicate {
        let mut clauses = Vec::new();

        if spec.start_date.is_some() || spec.end_date.is_some() {
            clauses.push(Clause::Range {
                field: Field::InvoiceDate,
                min: spec.start_date,
                max: spec.end_date,
            });
        }
        if let Some(company_id) = spec.company_id {
            clauses.push(Clause::Eq {
                field: Field::CompanyId,
                value: company_id.to_string(),
            });
        }
        if let Some(customer_id) = spec.customer_id {
            clauses.push(Clause::Eq {
                field: Field::CustomerId,
                value: customer_id.to_string(),
            });
        }
        if let Some(status) = spec.status {
            clauses.push(Clause::Eq {
                field: Field::Status,
                value: status.as_str().to_string(),
            });
        }

        Predicate { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the conjunction against one invoice row.
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.clauses.iter().all(|clause| clause.matches(invoice))
    }
}

impl Clause {
    fn matches(&self, invoice: &Invoice) -> bool {
        match self {
            Clause::Range { field, min, max } => {
                debug_assert_eq!(*field, Field::InvoiceDate);
                let date = invoice.invoice_date;
                min.map_or(true, |m| date >= m) && max.map_or(true, |m| date <= m)
            }
            Clause::Eq { field, value } => match field {
                Field::CompanyId => invoice.company_id.to_string() == *value,
                Field::CustomerId => invoice.customer_id.to_string() == *value,
                Field::Status => invoice.status.as_str() == value,
                Field::InvoiceDate => invoice
                    .invoice_date
                    .format("%Y-%m-%d")
                    .to_string()
                    == *value,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::InvoiceId;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn invoice(date: NaiveDate, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            company_id: CompanyId::new(),
            customer_id: CustomerId::new(),
            invoice_date: date,
            due_date: date + chrono::Duration::days(30),
            paid_date: None,
            status,
            subtotal: 100.0,
            cgst: 9.0,
            sgst: 9.0,
            discount_amount: 0.0,
            total_amount: 118.0,
            payment_method: None,
            payment_reference: None,
            notes: None,
        }
    }

    #[test]
    fn empty_spec_matches_everything() {
        let pred = Predicate::build(&FilterSpec::default());
        assert!(pred.is_empty());
        assert!(pred.matches(&invoice(d(2024, 6, 1), InvoiceStatus::Draft)));
    }

    #[test]
    fn clauses_are_conjunctive() {
        let inv = invoice(d(2024, 6, 1), InvoiceStatus::Paid);
        let spec = FilterSpec {
            start_date: Some(d(2024, 5, 1)),
            end_date: Some(d(2024, 6, 30)),
            customer_id: Some(inv.customer_id),
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        };
        let pred = Predicate::build(&spec);
        assert!(pred.matches(&inv));

        let mut wrong_status = inv.clone();
        wrong_status.status = InvoiceStatus::Pending;
        assert!(!pred.matches(&wrong_status));

        let mut outside = inv.clone();
        outside.invoice_date = d(2024, 7, 1);
        assert!(!pred.matches(&outside));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let spec = FilterSpec {
            start_date: Some(d(2024, 1, 1)),
            end_date: Some(d(2024, 1, 31)),
            ..Default::default()
        };
        let pred = Predicate::build(&spec);
        assert!(pred.matches(&invoice(d(2024, 1, 1), InvoiceStatus::Pending)));
        assert!(pred.matches(&invoice(d(2024, 1, 31), InvoiceStatus::Pending)));
        assert!(!pred.matches(&invoice(d(2023, 12, 31), InvoiceStatus::Pending)));
    }

    proptest! {
        /// Identical filters serialize to byte-identical predicates (and so
        /// byte-identical cache keys).
        #[test]
        fn build_is_pure(
            start in proptest::option::of(0i64..20_000),
            span in 0i64..400,
            status_ix in proptest::option::of(0usize..5),
        ) {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            let spec = FilterSpec {
                start_date: start.map(|n| epoch + chrono::Duration::days(n)),
                end_date: start.map(|n| epoch + chrono::Duration::days(n + span)),
                company_id: None,
                customer_id: None,
                status: status_ix.map(|i| InvoiceStatus::ALL[i]),
            };
            let a = serde_json::to_string(&Predicate::build(&spec)).unwrap();
            let b = serde_json::to_string(&Predicate::build(&spec.clone())).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
