//! # Order
//!
//! The immutable snapshot taken at checkout.
//!
//! Lines copy product names, prices and variation choices by value; later
//! catalog edits never change a placed order. The only field that moves after
//! placement is the status (see [`crate::status`]).

use crate::money::Money;
use crate::pricing::Quote;
use crate::status::OrderStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new() -> Self {
        OrderId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        OrderId(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        OrderId(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-facing order number: `ORD-` and the last eight digits of the
/// creation time in epoch milliseconds.
pub fn order_number(created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis().rem_euclid(100_000_000);
    format!("ORD-{millis:08}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Pickup,
    Delivery,
    Table,
}

impl DeliveryType {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryType::Pickup => "Recoger en tienda",
            DeliveryType::Delivery => "Entrega a domicilio",
            DeliveryType::Table => "Para Mesa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::Card => "Tarjeta",
        }
    }
}

/// Zone name and fee as they were when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub name: String,
    pub fee: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fulfillment {
    Pickup,
    Delivery { address: String, zone: ZoneSnapshot },
    Table { people: u32 },
}

impl Fulfillment {
    pub fn kind(&self) -> DeliveryType {
        match self {
            Fulfillment::Pickup => DeliveryType::Pickup,
            Fulfillment::Delivery { .. } => DeliveryType::Delivery,
            Fulfillment::Table { .. } => DeliveryType::Table,
        }
    }

    pub fn delivery_fee(&self) -> Money {
        match self {
            Fulfillment::Delivery { zone, .. } => zone.fee,
            _ => Money::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Payment {
    Cash {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tendered: Option<Money>,
    },
    Transfer {
        proof_url: String,
    },
    Card,
}

impl Payment {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Payment::Cash { .. } => PaymentMethod::Cash,
            Payment::Transfer { .. } => PaymentMethod::Transfer,
            Payment::Card => PaymentMethod::Card,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedOption {
    pub variation_name: String,
    pub option_name: String,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub base_price: Money,
    #[serde(default)]
    pub options: Vec<OrderedOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub customer: Customer,
    pub fulfillment: Fulfillment,
    pub payment: Payment,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn quote(&self) -> Quote {
        Quote {
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
        }
    }

    pub fn delivery_type(&self) -> DeliveryType {
        self.fulfillment.kind()
    }

    /// Change owed for a cash payment, when the customer said what they pay with.
    pub fn change_due(&self) -> Option<Money> {
        match self.payment {
            Payment::Cash {
                tendered: Some(tendered),
            } if tendered >= self.total => Some(tendered - self.total),
            _ => None,
        }
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_number_keeps_last_eight_digits() {
        let at = Utc.timestamp_millis_opt(1_736_000_012_345).single().unwrap();
        assert_eq!(order_number(at), "ORD-00012345");
    }

    #[test]
    fn test_fulfillment_serialization_is_tagged() {
        let fulfillment = Fulfillment::Delivery {
            address: "Calle 5".into(),
            zone: ZoneSnapshot {
                name: "Centro".into(),
                fee: Money::from_major(30),
            },
        };
        let json = serde_json::to_value(&fulfillment).unwrap();
        assert_eq!(json["type"], "delivery");
        assert_eq!(json["zone"]["fee"], 3000);
        assert_eq!(fulfillment.delivery_fee(), Money::from_major(30));
        assert_eq!(Fulfillment::Table { people: 4 }.delivery_fee(), Money::ZERO);
    }
}
