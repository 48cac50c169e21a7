use chrono::{Datelike, Duration, NaiveDate};
use mesa_core::money::Money;
use mesa_core::order::Order;
use mesa_core::status::OrderStatus;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Which orders a report covers. Dates are inclusive calendar days (UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl ReportFilter {
    pub fn matches(&self, order: &Order) -> bool {
        let day = order.created_at.date_naive();
        self.status.is_none_or(|s| order.status == s)
            && self.from.is_none_or(|from| day >= from)
            && self.to.is_none_or(|to| day <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub revenue: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-55")]
    From46To55,
    #[serde(rename = "56+")]
    Over55,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AgeRange {
    pub const ALL: [AgeRange; 6] = [
        AgeRange::From18To25,
        AgeRange::From26To35,
        AgeRange::From36To45,
        AgeRange::From46To55,
        AgeRange::Over55,
        AgeRange::Unknown,
    ];

    /// `None` for ages below 18, which no bucket covers.
    pub fn of(age: Option<u32>) -> Option<AgeRange> {
        match age {
            None => Some(AgeRange::Unknown),
            Some(18..=25) => Some(AgeRange::From18To25),
            Some(26..=35) => Some(AgeRange::From26To35),
            Some(36..=45) => Some(AgeRange::From36To45),
            Some(46..=55) => Some(AgeRange::From46To55),
            Some(56..) => Some(AgeRange::Over55),
            Some(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRange::From18To25 => "18-25",
            AgeRange::From26To35 => "26-35",
            AgeRange::From36To45 => "36-45",
            AgeRange::From46To55 => "46-55",
            AgeRange::Over55 => "56+",
            AgeRange::Unknown => "unknown",
        }
    }
}

/// Whole years between `birthday` and `today`.
pub fn age_on(birthday: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birthday.year();
    if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub generated_for: NaiveDate,
    pub filter: ReportFilter,
    pub total_orders: usize,
    pub completed_orders: usize,
    /// Completed orders only.
    pub revenue: Money,
    pub average_order_value: Money,
    pub today_revenue: Money,
    pub week_revenue: Money,
    pub month_revenue: Money,
    pub by_status: BTreeMap<String, usize>,
    /// Pending, preparing or ready.
    pub in_progress: usize,
    pub top_products: Vec<ProductSales>,
    /// Distinct customers (by phone) per age range.
    pub age_ranges: BTreeMap<String, usize>,
}

impl SalesReport {
    pub const TOP_PRODUCTS: usize = 5;

    pub fn build(orders: &[Order], filter: &ReportFilter, today: NaiveDate) -> Self {
        let selected: Vec<&Order> = orders.iter().filter(|o| filter.matches(o)).collect();
        let completed: Vec<&Order> = selected
            .iter()
            .copied()
            .filter(|o| o.status == OrderStatus::Completed)
            .collect();

        let revenue: Money = completed.iter().map(|o| o.total).sum();
        let average_order_value = match i64::try_from(completed.len()) {
            Ok(n) if n > 0 => Money::from_cents(revenue.cents() / n),
            _ => Money::ZERO,
        };

        let week_start = today - Duration::days(7);
        let month_start = today - Duration::days(30);
        let revenue_since = |start: NaiveDate| -> Money {
            completed
                .iter()
                .filter(|o| o.created_at.date_naive() >= start)
                .map(|o| o.total)
                .sum()
        };
        let today_revenue: Money = completed
            .iter()
            .filter(|o| o.created_at.date_naive() == today)
            .map(|o| o.total)
            .sum();

        let mut by_status: BTreeMap<String, usize> = OrderStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for order in &selected {
            *by_status.entry(order.status.as_str().to_string()).or_default() += 1;
        }
        let in_progress = selected
            .iter()
            .filter(|o| !o.status.is_terminal())
            .count();

        let report = Self {
            generated_for: today,
            filter: *filter,
            total_orders: selected.len(),
            completed_orders: completed.len(),
            revenue,
            average_order_value,
            today_revenue,
            week_revenue: revenue_since(week_start),
            month_revenue: revenue_since(month_start),
            by_status,
            in_progress,
            top_products: top_products(&completed),
            age_ranges: age_ranges(&selected, today),
        };
        tracing::debug!(
            orders = report.total_orders,
            revenue = %report.revenue,
            "sales report built"
        );
        report
    }
}

fn top_products(completed: &[&Order]) -> Vec<ProductSales> {
    let mut totals: HashMap<&str, ProductSales> = HashMap::new();
    for line in completed.iter().flat_map(|o| &o.lines) {
        let entry = totals
            .entry(line.product_id.as_str())
            .or_insert_with(|| ProductSales {
                product_id: line.product_id.clone(),
                name: line.product_name.clone(),
                quantity: 0,
                revenue: Money::ZERO,
            });
        entry.quantity += line.quantity;
        entry.revenue += line.line_total;
    }

    let mut ranked: Vec<ProductSales> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(SalesReport::TOP_PRODUCTS);
    ranked
}

fn age_ranges(orders: &[&Order], today: NaiveDate) -> BTreeMap<String, usize> {
    // First birthday seen per phone.
    let mut birthdays: HashMap<&str, Option<NaiveDate>> = HashMap::new();
    for order in orders {
        let slot = birthdays.entry(order.customer.phone.as_str()).or_insert(None);
        if slot.is_none() {
            *slot = order.customer.birthday;
        }
    }

    let mut ranges: BTreeMap<String, usize> = AgeRange::ALL
        .iter()
        .map(|r| (r.as_str().to_string(), 0))
        .collect();
    for birthday in birthdays.into_values() {
        let age = birthday.and_then(|b| age_on(b, today));
        if let Some(range) = AgeRange::of(age) {
            *ranges.entry(range.as_str().to_string()).or_default() += 1;
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{line, order};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_age_on_counts_whole_years() {
        let birthday = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birthday, day(14)), Some(24));
        assert_eq!(age_on(birthday, day(15)), Some(25));
        assert_eq!(age_on(day(20), day(15)), None);
    }

    #[test]
    fn test_revenue_counts_completed_orders_only() {
        let orders = vec![
            order("1", "555-1", OrderStatus::Completed, day(20), 100, vec![line("taco", 3, 150)]),
            order("2", "555-2", OrderStatus::Completed, day(14), 50, vec![line("flan", 1, 35)]),
            order("3", "555-1", OrderStatus::Pending, day(20), 70, vec![line("taco", 9, 450)]),
            order("4", "555-3", OrderStatus::Cancelled, day(1), 40, Vec::new()),
        ];

        let report = SalesReport::build(&orders, &ReportFilter::default(), day(20));

        assert_eq!(report.total_orders, 4);
        assert_eq!(report.completed_orders, 2);
        assert_eq!(report.revenue, Money::from_major(150));
        assert_eq!(report.average_order_value, Money::from_major(75));
        assert_eq!(report.today_revenue, Money::from_major(100));
        assert_eq!(report.week_revenue, Money::from_major(150));
        assert_eq!(report.month_revenue, Money::from_major(150));
        assert_eq!(report.in_progress, 1);
        assert_eq!(report.by_status["cancelled"], 1);
        assert_eq!(report.by_status["ready"], 0);

        // Pending taco lines do not count towards best sellers.
        assert_eq!(report.top_products[0].product_id, "taco");
        assert_eq!(report.top_products[0].quantity, 3);
        assert_eq!(report.top_products.len(), 2);
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let orders = vec![
            order("1", "a", OrderStatus::Completed, day(10), 10, Vec::new()),
            order("2", "b", OrderStatus::Completed, day(12), 10, Vec::new()),
            order("3", "c", OrderStatus::Ready, day(12), 10, Vec::new()),
            order("4", "d", OrderStatus::Completed, day(13), 10, Vec::new()),
        ];
        let filter = ReportFilter {
            from: Some(day(10)),
            to: Some(day(12)),
            status: Some(OrderStatus::Completed),
        };

        let report = SalesReport::build(&orders, &filter, day(20));
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.revenue, Money::from_major(20));
    }

    #[test]
    fn test_age_ranges_count_distinct_customers() {
        let mut young = order("1", "555-1", OrderStatus::Completed, day(1), 10, Vec::new());
        young.customer.birthday = NaiveDate::from_ymd_opt(2003, 1, 1);
        let repeat = order("2", "555-1", OrderStatus::Completed, day(2), 10, Vec::new());
        let mut senior = order("3", "555-2", OrderStatus::Completed, day(3), 10, Vec::new());
        senior.customer.birthday = NaiveDate::from_ymd_opt(1960, 1, 1);
        let unknown = order("4", "555-3", OrderStatus::Pending, day(3), 10, Vec::new());
        let mut child = order("5", "555-4", OrderStatus::Pending, day(3), 10, Vec::new());
        child.customer.birthday = NaiveDate::from_ymd_opt(2015, 1, 1);

        let report = SalesReport::build(
            &[young, repeat, senior, unknown, child],
            &ReportFilter::default(),
            day(20),
        );

        assert_eq!(report.age_ranges["18-25"], 1);
        assert_eq!(report.age_ranges["56+"], 1);
        assert_eq!(report.age_ranges["unknown"], 1);
        assert_eq!(report.age_ranges.values().sum::<usize>(), 3);
    }
}
