//! `mesa report` - sales report and customer directory from the snapshot.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use mesa_core::status::OrderStatus;
use mesa_reports::{CustomerDirectory, ReportFilter, SalesReport, write_customer_file, write_report_files};
use mesa_store::Snapshot;
use std::path::Path;

pub struct ReportArgs<'a> {
    pub snapshot: &'a Path,
    pub out: &'a Path,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<&'a str>,
}

pub fn run_report_command(args: ReportArgs<'_>) -> Result<()> {
    let status = args
        .status
        .map(|raw| {
            OrderStatus::parse(raw).with_context(|| format!("Unknown order status: {raw}"))
        })
        .transpose()?;
    let filter = ReportFilter {
        from: args.from,
        to: args.to,
        status,
    };

    let snapshot = Snapshot::load(args.snapshot)
        .with_context(|| format!("Failed to load snapshot: {}", args.snapshot.display()))?;
    let report = SalesReport::build(&snapshot.orders, &filter, Utc::now().date_naive());
    let directory = CustomerDirectory::build(&snapshot.orders);

    let report_path = write_report_files(args.out, &report)?;
    let customers_path = write_customer_file(args.out, &directory)?;

    println!("Sales report for {}", report.generated_for);
    println!("  Orders:     {} ({} completed)", report.total_orders, report.completed_orders);
    println!("  Revenue:    {}", report.revenue);
    println!("  Avg ticket: {}", report.average_order_value);
    println!("  Customers:  {}", directory.customers().len());
    for product in &report.top_products {
        println!("    {:>4} x {}", product.quantity, product.name);
    }
    println!("\nReport saved to: {}", report_path.display());
    println!("Customers saved to: {}", customers_path.display());
    Ok(())
}
