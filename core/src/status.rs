//! # Order Status
//!
//! `pending → preparing → ready → completed`, with `cancelled` reachable from
//! `pending` or `preparing`. Transitions only move forward; `completed` and
//! `cancelled` accept nothing further.

use crate::order::{Order, OrderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Statuses an admin may move to from here.
    pub fn next_steps(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Ready, OrderStatus::Cancelled],
            OrderStatus::Ready => &[OrderStatus::Completed],
            OrderStatus::Completed | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.next_steps().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Still needs kitchen attention.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Preparing => "En Preparación",
            OrderStatus::Ready => "Listo",
            OrderStatus::Completed => "Completado",
            OrderStatus::Cancelled => "Cancelado",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("order is already {0} and accepts no further changes")]
    Terminal(OrderStatus),
    #[error("cannot move an order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), StatusError> {
    if from.is_terminal() {
        return Err(StatusError::Terminal(from));
    }
    if !from.can_transition_to(to) {
        return Err(StatusError::InvalidTransition { from, to });
    }
    Ok(())
}

/// A status write that was applied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
}

impl Order {
    /// Checked transition. On error the order is left untouched.
    pub fn apply_status(
        &mut self,
        next: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusChange, StatusError> {
        check_transition(self.status, next)?;
        Ok(self.record_status(next, at))
    }

    /// Writes the status without checking the state machine.
    ///
    /// Used by backends, which apply whatever arrives last.
    pub fn record_status(&mut self, next: OrderStatus, at: DateTime<Utc>) -> StatusChange {
        let from = self.status;
        self.status = next;
        self.updated_at = at;
        if next == OrderStatus::Completed {
            self.completed_at = Some(at);
        }
        StatusChange {
            order_id: self.id.clone(),
            from,
            to: next,
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let path = [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
        ];
        for pair in path.windows(2) {
            assert_eq!(check_transition(pair[0], pair[1]), Ok(()));
        }
    }

    #[test]
    fn test_cancel_only_early() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert_eq!(
            check_transition(OrderStatus::Ready, OrderStatus::Cancelled),
            Err(StatusError::InvalidTransition {
                from: OrderStatus::Ready,
                to: OrderStatus::Cancelled
            })
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for from in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for to in OrderStatus::ALL {
                assert_eq!(check_transition(from, to), Err(StatusError::Terminal(from)));
            }
        }
    }

    #[test]
    fn test_no_backwards_or_skipping() {
        assert!(check_transition(OrderStatus::Ready, OrderStatus::Preparing).is_err());
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Ready).is_err());
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_parse_round_trips_names() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("Ready "), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::parse("delivered"), None);
    }
}
