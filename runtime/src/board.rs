//! The kitchen board: a local view over the live order feed.

use chrono::NaiveDate;
use mesa_core::money::Money;
use mesa_core::order::{DeliveryType, Order};
use mesa_core::status::OrderStatus;
use mesa_store::OrderFeed;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardFilter {
    #[default]
    All,
    Status(OrderStatus),
    /// Dine-in orders in any status.
    Table,
}

impl BoardFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            BoardFilter::All => true,
            BoardFilter::Status(status) => order.status == *status,
            BoardFilter::Table => order.delivery_type() == DeliveryType::Table,
        }
    }
}

impl FromStr for BoardFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(BoardFilter::All),
            "table" => Ok(BoardFilter::Table),
            other => OrderStatus::parse(other)
                .map(BoardFilter::Status)
                .ok_or_else(|| format!("unknown filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// A new pending order arrived after the first snapshot.
    NewOrder(Order),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Pending or preparing.
    pub active: usize,
    pub completed_today: usize,
    pub revenue_today: Money,
    /// Mean total of every completed order, rounded down to the cent.
    pub average_ticket: Money,
}

#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    orders: Vec<Order>,
    loaded: bool,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the view with a backend snapshot (newest first).
    ///
    /// The first snapshot only loads the board. Afterwards a snapshot with more
    /// orders than before whose newest order is pending raises
    /// [`BoardEvent::NewOrder`].
    pub fn apply_snapshot(&mut self, orders: Vec<Order>) -> Option<BoardEvent> {
        let previous = self.orders.len();
        let grew = self.loaded && previous > 0 && orders.len() > previous;
        self.orders = orders;
        self.loaded = true;

        let newest = self.orders.first().filter(|_| grew)?;
        if newest.status != OrderStatus::Pending {
            return None;
        }
        tracing::info!(number = %newest.number, "new order on the board");
        Some(BoardEvent::NewOrder(newest.clone()))
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn view(&self, filter: BoardFilter) -> Vec<&Order> {
        self.orders.iter().filter(|o| filter.matches(o)).collect()
    }

    /// Figures for the dashboard header. "Today" is the creation date in UTC.
    pub fn stats(&self, today: NaiveDate) -> DashboardStats {
        let completed: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .collect();
        let completed_today: Vec<&Order> = completed
            .iter()
            .copied()
            .filter(|o| o.created_at.date_naive() == today)
            .collect();

        let completed_total: Money = completed.iter().map(|o| o.total).sum();
        let average_ticket = match i64::try_from(completed.len()) {
            Ok(count) if count > 0 => Money::from_cents(completed_total.cents() / count),
            _ => Money::ZERO,
        };

        DashboardStats {
            active: self.orders.iter().filter(|o| o.status.is_active()).count(),
            completed_today: completed_today.len(),
            revenue_today: completed_today.iter().map(|o| o.total).sum(),
            average_ticket,
        }
    }

    /// Applies feed snapshots until the backend goes away, forwarding events.
    pub async fn follow(&mut self, mut feed: OrderFeed, events: mpsc::Sender<BoardEvent>) {
        while let Some(orders) = feed.next().await {
            if let Some(event) = self.apply_snapshot(orders) {
                if events.send(event).await.is_err() {
                    tracing::debug!("board listener dropped");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use mesa_core::order::{Customer, Fulfillment, OrderId, Payment};
    use mesa_store::{MemoryStore, OrderStore};
    use std::sync::Arc;

    fn order(id: &str, status: OrderStatus, total: i64, at: DateTime<Utc>) -> Order {
        Order {
            id: OrderId::from(id),
            number: format!("ORD-{id}"),
            customer: Customer {
                name: "Ana".into(),
                phone: "555".into(),
                email: None,
                birthday: None,
            },
            fulfillment: if id.starts_with('t') {
                Fulfillment::Table { people: 2 }
            } else {
                Fulfillment::Pickup
            },
            payment: Payment::Card,
            lines: Vec::new(),
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

    fn day(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_first_snapshot_never_notifies() {
        let mut board = OrderBoard::new();
        let event = board.apply_snapshot(vec![order("a", OrderStatus::Pending, 10, day(1, 9))]);
        assert_eq!(event, None);
    }

    #[test]
    fn test_growth_with_pending_head_notifies() {
        let mut board = OrderBoard::new();
        board.apply_snapshot(vec![order("a", OrderStatus::Pending, 10, day(1, 9))]);

        let b = order("b", OrderStatus::Pending, 20, day(1, 10));
        let event = board.apply_snapshot(vec![b.clone(), order("a", OrderStatus::Preparing, 10, day(1, 9))]);
        assert_eq!(event, Some(BoardEvent::NewOrder(b)));

        // Same count, status change only.
        let event = board.apply_snapshot(vec![
            order("b", OrderStatus::Preparing, 20, day(1, 10)),
            order("a", OrderStatus::Preparing, 10, day(1, 9)),
        ]);
        assert_eq!(event, None);
    }

    #[test]
    fn test_filters() {
        let mut board = OrderBoard::new();
        board.apply_snapshot(vec![
            order("t1", OrderStatus::Ready, 10, day(1, 12)),
            order("p1", OrderStatus::Pending, 10, day(1, 11)),
            order("p2", OrderStatus::Ready, 10, day(1, 10)),
        ]);

        assert_eq!(board.view(BoardFilter::All).len(), 3);
        assert_eq!(board.view("table".parse().unwrap()).len(), 1);
        let ready: Vec<&str> = board
            .view("ready".parse().unwrap())
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ready, ["t1", "p2"]);
        assert!("shipped".parse::<BoardFilter>().is_err());
    }

    #[test]
    fn test_stats() {
        let mut board = OrderBoard::new();
        board.apply_snapshot(vec![
            order("a", OrderStatus::Completed, 100, day(2, 12)),
            order("b", OrderStatus::Completed, 50, day(2, 9)),
            order("c", OrderStatus::Completed, 30, day(1, 20)),
            order("d", OrderStatus::Pending, 70, day(2, 13)),
            order("e", OrderStatus::Preparing, 70, day(2, 13)),
            order("f", OrderStatus::Cancelled, 70, day(2, 8)),
        ]);

        let stats = board.stats(day(2, 0).date_naive());
        assert_eq!(stats.active, 2);
        assert_eq!(stats.completed_today, 2);
        assert_eq!(stats.revenue_today, Money::from_major(150));
        assert_eq!(stats.average_ticket, Money::from_major(60));
    }

    #[tokio::test]
    async fn test_follow_forwards_new_orders() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_order(order("a", OrderStatus::Pending, 10, day(1, 9)))
            .await
            .unwrap();

        let feed = store.subscribe_orders();
        let (tx, mut rx) = mpsc::channel(4);
        let follower = tokio::spawn(async move {
            let mut board = OrderBoard::new();
            board.follow(feed, tx).await;
            board
        });

        // Let the board take its first snapshot before the next order lands.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        store
            .create_order(order("b", OrderStatus::Pending, 20, day(1, 10)))
            .await
            .unwrap();

        let Some(BoardEvent::NewOrder(new)) = rx.recv().await else {
            panic!("expected a new order event");
        };
        assert_eq!(new.id, OrderId::from("b"));

        drop(store);
        let board = follower.await.unwrap();
        assert_eq!(board.orders().len(), 2);
    }
}
