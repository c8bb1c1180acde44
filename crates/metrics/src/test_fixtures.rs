//! Shared invoice builders for aggregator tests.

use chrono::NaiveDate;

use ledgeriq_core::{
    Company, CompanyId, Customer, CustomerId, Invoice, InvoiceId, InvoiceStatus, Item, ItemId,
    LineItem,
};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Invoice with an 18% tax split and 30-day terms. Paid invoices settle 15
/// days after invoicing.
pub fn invoice(date: NaiveDate, status: InvoiceStatus, total: f64) -> Invoice {
    let subtotal = total / 1.18;
    let tax = total - subtotal;
    Invoice {
        id: InvoiceId::new(),
        company_id: CompanyId::new(),
        customer_id: CustomerId::new(),
        invoice_date: date,
        due_date: date + chrono::Duration::days(30),
        paid_date: (status == InvoiceStatus::Paid).then(|| date + chrono::Duration::days(15)),
        status,
        subtotal,
        cgst: tax / 2.0,
        sgst: tax / 2.0,
        discount_amount: 0.0,
        total_amount: total,
        payment_method: (status == InvoiceStatus::Paid).then(|| "bank".to_string()),
        payment_reference: None,
        notes: None,
    }
}

pub fn invoice_for(
    customer_id: CustomerId,
    company_id: CompanyId,
    date: NaiveDate,
    status: InvoiceStatus,
    total: f64,
) -> Invoice {
    Invoice {
        customer_id,
        company_id,
        ..invoice(date, status, total)
    }
}

pub fn customer(id: CustomerId, name: &str) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        segment: None,
    }
}

pub fn company(id: CompanyId, name: &str, established: Option<NaiveDate>) -> Company {
    Company {
        id,
        name: name.to_string(),
        established,
    }
}

pub fn item(id: ItemId, name: &str, selling_price: f64) -> Item {
    Item {
        id,
        name: name.to_string(),
        selling_price,
        category: None,
    }
}

pub fn line(invoice_id: InvoiceId, item_id: ItemId, quantity: f64, rate: f64) -> LineItem {
    LineItem {
        invoice_id,
        item_id,
        quantity,
        rate,
        amount: quantity * rate,
    }
}
