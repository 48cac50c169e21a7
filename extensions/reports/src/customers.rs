use chrono::{DateTime, Datelike, NaiveDate, Utc};
use mesa_core::money::Money;
use mesa_core::order::{Order, OrderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One customer as seen through their orders, keyed by phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub phone: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    pub total_orders: usize,
    pub total_spent: Money,
    pub last_order_at: DateTime<Utc>,
    pub order_ids: Vec<OrderId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDirectory {
    customers: Vec<CustomerSummary>,
}

impl CustomerDirectory {
    /// Groups orders by phone. The most recent order supplies the name; email
    /// and birthday come from the most recent order that carries them. Sorted
    /// by order count, busiest first.
    pub fn build(orders: &[Order]) -> Self {
        let mut by_phone: HashMap<&str, CustomerSummary> = HashMap::new();
        for order in orders {
            let customer = &order.customer;
            let entry = by_phone
                .entry(customer.phone.as_str())
                .or_insert_with(|| CustomerSummary {
                    phone: customer.phone.clone(),
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    birthday: customer.birthday,
                    total_orders: 0,
                    total_spent: Money::ZERO,
                    last_order_at: order.created_at,
                    order_ids: Vec::new(),
                });

            entry.total_orders += 1;
            entry.total_spent += order.total;
            entry.order_ids.push(order.id.clone());

            let newer = order.created_at > entry.last_order_at;
            if newer {
                entry.last_order_at = order.created_at;
                entry.name = customer.name.clone();
            }
            if customer.email.is_some() && (newer || entry.email.is_none()) {
                entry.email = customer.email.clone();
            }
            if customer.birthday.is_some() && (newer || entry.birthday.is_none()) {
                entry.birthday = customer.birthday;
            }
        }

        let mut customers: Vec<CustomerSummary> = by_phone.into_values().collect();
        customers.sort_by(|a, b| {
            b.total_orders
                .cmp(&a.total_orders)
                .then_with(|| b.last_order_at.cmp(&a.last_order_at))
                .then_with(|| a.phone.cmp(&b.phone))
        });
        Self { customers }
    }

    pub fn customers(&self) -> &[CustomerSummary] {
        &self.customers
    }

    pub fn get(&self, phone: &str) -> Option<&CustomerSummary> {
        self.customers.iter().find(|c| c.phone == phone)
    }

    /// Case-insensitive match on the name, or substring match on the phone.
    pub fn search(&self, term: &str) -> Vec<&CustomerSummary> {
        let needle = term.trim().to_lowercase();
        self.customers
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone.contains(term.trim()))
            .collect()
    }

    /// Customers whose birthday falls in `month` (1-12).
    pub fn birthdays_in(&self, month: u32) -> Vec<&CustomerSummary> {
        let mut found: Vec<&CustomerSummary> = self
            .customers
            .iter()
            .filter(|c| c.birthday.is_some_and(|b| b.month() == month))
            .collect();
        found.sort_by_key(|c| c.birthday.map(|b| b.day()));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::order;
    use mesa_core::status::OrderStatus;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_latest_order_refreshes_contact_details() {
        let mut old = order("1", "555-1", OrderStatus::Completed, day(1), 40, Vec::new());
        old.customer.name = "Ana".into();
        old.customer.email = Some("ana@old.mx".into());
        let mut new = order("2", "555-1", OrderStatus::Completed, day(9), 60, Vec::new());
        new.customer.name = "Ana María".into();
        new.customer.birthday = NaiveDate::from_ymd_opt(1990, 3, 8);

        // Snapshots arrive newest first.
        let directory = CustomerDirectory::build(&[new, old]);
        let ana = directory.get("555-1").unwrap();

        assert_eq!(ana.name, "Ana María");
        assert_eq!(ana.email.as_deref(), Some("ana@old.mx"));
        assert_eq!(ana.birthday, NaiveDate::from_ymd_opt(1990, 3, 8));
        assert_eq!(ana.total_orders, 2);
        assert_eq!(ana.total_spent, Money::from_major(100));
        assert_eq!(ana.last_order_at.date_naive(), day(9));
    }

    #[test]
    fn test_sorted_by_order_count_and_searchable() {
        let mut orders = vec![
            order("1", "555-1", OrderStatus::Completed, day(1), 10, Vec::new()),
            order("2", "555-2", OrderStatus::Completed, day(2), 10, Vec::new()),
            order("3", "555-2", OrderStatus::Pending, day(3), 10, Vec::new()),
        ];
        orders[0].customer.name = "Beto".into();
        orders[1].customer.name = "Carla".into();
        orders[2].customer.name = "Carla".into();

        let directory = CustomerDirectory::build(&orders);
        assert_eq!(directory.customers()[0].phone, "555-2");
        assert_eq!(directory.search("car").len(), 1);
        assert_eq!(directory.search("555").len(), 2);
        assert!(directory.search("zoe").is_empty());
    }

    #[test]
    fn test_birthdays_in_month() {
        let mut a = order("1", "a", OrderStatus::Completed, day(1), 10, Vec::new());
        a.customer.birthday = NaiveDate::from_ymd_opt(1990, 6, 20);
        let mut b = order("2", "b", OrderStatus::Completed, day(1), 10, Vec::new());
        b.customer.birthday = NaiveDate::from_ymd_opt(1985, 6, 2);
        let mut c = order("3", "c", OrderStatus::Completed, day(1), 10, Vec::new());
        c.customer.birthday = NaiveDate::from_ymd_opt(1985, 7, 2);

        let directory = CustomerDirectory::build(&[a, b, c]);
        let june: Vec<&str> = directory
            .birthdays_in(6)
            .into_iter()
            .map(|c| c.phone.as_str())
            .collect();
        assert_eq!(june, ["b", "a"]);
    }
}
