//! # mesa-reports
//!
//! Back-office views computed from the order history: the sales report and
//! the customer directory, plus a writer for report artifacts.

pub mod customers;
pub mod sales;

pub use customers::{CustomerDirectory, CustomerSummary};
pub use sales::{AgeRange, ProductSales, ReportFilter, SalesReport, age_on};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Writes `report.json` into `output_dir` and returns its path.
pub fn write_report_files(output_dir: &Path, report: &SalesReport) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join("report.json");
    std::fs::write(&path, serde_json::to_vec_pretty(report)?)?;
    tracing::info!(path = %path.display(), "sales report written");
    Ok(path)
}

/// Writes `customers.json` next to the report.
pub fn write_customer_file(output_dir: &Path, directory: &CustomerDirectory) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join("customers.json");
    std::fs::write(&path, serde_json::to_vec_pretty(directory.customers())?)?;
    Ok(path)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, TimeZone, Utc};
    use mesa_core::money::Money;
    use mesa_core::order::{Customer, Fulfillment, Order, OrderId, OrderLine, Payment};
    use mesa_core::status::OrderStatus;

    pub fn line(product_id: &str, quantity: u32, total: i64) -> OrderLine {
        OrderLine {
            product_id: product_id.into(),
            product_name: product_id.to_uppercase(),
            quantity,
            base_price: Money::from_cents(Money::from_major(total).cents() / i64::from(quantity)),
            options: Vec::new(),
            notes: None,
            line_total: Money::from_major(total),
        }
    }

    pub fn order(
        id: &str,
        phone: &str,
        status: OrderStatus,
        day: NaiveDate,
        total: i64,
        lines: Vec<OrderLine>,
    ) -> Order {
        let at = Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap());
        Order {
            id: OrderId::from(id),
            number: format!("ORD-{id:0>8}"),
            customer: Customer {
                name: "Cliente".into(),
                phone: phone.into(),
                email: None,
                birthday: None,
            },
            fulfillment: Fulfillment::Pickup,
            payment: Payment::Cash { tendered: None },
            lines,
            subtotal: Money::from_major(total),
            delivery_fee: Money::ZERO,
            total: Money::from_major(total),
            status,
            notes: None,
            created_at: at,
            updated_at: at,
            completed_at: None,
        }
    }
}
