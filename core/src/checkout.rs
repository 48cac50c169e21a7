//! # Checkout
//!
//! Turns the storefront form and the cart into an [`Order`].
//!
//! Validation runs against the current [`Settings`]: which delivery types and
//! payment methods are offered, which customer fields are mandatory, and which
//! delivery zones exist. The zone fee is read here, once, and frozen into the
//! order.

use crate::cart::Cart;
use crate::money::Money;
use crate::order::{
    Customer, DeliveryType, Fulfillment, Order, OrderId, OrderLine, OrderedOption, Payment,
    PaymentMethod, ZoneSnapshot, order_number,
};
use crate::pricing::Quote;
use crate::settings::Settings;
use crate::status::OrderStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_birthday: Option<NaiveDate>,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub people: Option<u32>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cash_tendered: Option<Money>,
    #[serde(default)]
    pub payment_proof_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutForm {
    /// A pickup/cash form with just the mandatory customer fields.
    pub fn pickup(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            customer_name: name.into(),
            customer_phone: phone.into(),
            customer_email: None,
            customer_birthday: None,
            delivery_type: DeliveryType::Pickup,
            delivery_address: None,
            zone_id: None,
            people: None,
            payment_method: PaymentMethod::Cash,
            cash_tendered: None,
            payment_proof_url: None,
            notes: None,
        }
    }

    pub fn validate(&self, settings: &Settings) -> Result<ValidatedCheckout, CheckoutError> {
        let name = self.customer_name.trim();
        if name.is_empty() {
            return Err(CheckoutError::MissingName);
        }
        let phone = self.customer_phone.trim();
        if phone.is_empty() {
            return Err(CheckoutError::MissingPhone);
        }

        let email = non_empty(self.customer_email.as_deref());
        if settings.customer_fields.email_mandatory() && email.is_none() {
            return Err(CheckoutError::MissingEmail);
        }
        if settings.customer_fields.birthday_mandatory() && self.customer_birthday.is_none() {
            return Err(CheckoutError::MissingBirthday);
        }

        if !settings.offers(self.delivery_type) {
            return Err(CheckoutError::DeliveryTypeUnavailable(self.delivery_type));
        }
        let fulfillment = match self.delivery_type {
            DeliveryType::Pickup => Fulfillment::Pickup,
            DeliveryType::Delivery => {
                let address = non_empty(self.delivery_address.as_deref())
                    .ok_or(CheckoutError::MissingAddress)?;
                let zone_id = non_empty(self.zone_id.as_deref()).ok_or(CheckoutError::MissingZone)?;
                let zone = settings
                    .zone(&zone_id)
                    .ok_or_else(|| CheckoutError::UnknownZone(zone_id.clone()))?;
                Fulfillment::Delivery {
                    address,
                    zone: ZoneSnapshot {
                        name: zone.name.clone(),
                        fee: zone.fee,
                    },
                }
            }
            DeliveryType::Table => {
                let people = self.people.unwrap_or(1);
                if people == 0 {
                    return Err(CheckoutError::InvalidPartySize);
                }
                Fulfillment::Table { people }
            }
        };

        if !settings.accepts(self.payment_method) {
            return Err(CheckoutError::PaymentMethodUnavailable(self.payment_method));
        }
        let payment = match self.payment_method {
            PaymentMethod::Cash => {
                if self.cash_tendered.is_some_and(Money::is_negative) {
                    return Err(CheckoutError::InvalidCashAmount);
                }
                Payment::Cash {
                    tendered: self.cash_tendered,
                }
            }
            PaymentMethod::Transfer => Payment::Transfer {
                proof_url: non_empty(self.payment_proof_url.as_deref())
                    .ok_or(CheckoutError::MissingPaymentProof)?,
            },
            PaymentMethod::Card => Payment::Card,
        };

        Ok(ValidatedCheckout {
            customer: Customer {
                name: name.to_string(),
                phone: phone.to_string(),
                email,
                birthday: self.customer_birthday,
            },
            fulfillment,
            payment,
            notes: non_empty(self.notes.as_deref()),
        })
    }
}

/// Checkout data that passed validation against the settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedCheckout {
    pub customer: Customer,
    pub fulfillment: Fulfillment,
    pub payment: Payment,
    pub notes: Option<String>,
}

impl ValidatedCheckout {
    pub fn quote(&self, cart: &Cart) -> Quote {
        Quote::new(cart.subtotal(), self.fulfillment.delivery_fee())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("the cart is empty")]
    EmptyCart,
    #[error("customer name is required")]
    MissingName,
    #[error("customer phone is required")]
    MissingPhone,
    #[error("customer email is required")]
    MissingEmail,
    #[error("customer birthday is required")]
    MissingBirthday,
    #[error("delivery type '{0:?}' is not offered")]
    DeliveryTypeUnavailable(DeliveryType),
    #[error("delivery address is required")]
    MissingAddress,
    #[error("a delivery zone must be selected")]
    MissingZone,
    #[error("delivery zone '{0}' does not exist or is inactive")]
    UnknownZone(String),
    #[error("number of people must be at least 1")]
    InvalidPartySize,
    #[error("payment method '{0:?}' is not accepted")]
    PaymentMethodUnavailable(PaymentMethod),
    #[error("cash amount cannot be negative")]
    InvalidCashAmount,
    #[error("a payment proof is required for transfers")]
    MissingPaymentProof,
    #[error("order total is too large")]
    AmountTooLarge,
}

/// Snapshots the cart into a pending order.
pub fn compose_order(
    cart: &Cart,
    checkout: ValidatedCheckout,
    now: DateTime<Utc>,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let subtotal = cart.subtotal();
    let delivery_fee = checkout.fulfillment.delivery_fee();
    if subtotal.checked_add(delivery_fee).is_none() {
        return Err(CheckoutError::AmountTooLarge);
    }
    let quote = Quote::new(subtotal, delivery_fee);
    let lines = cart
        .lines()
        .iter()
        .map(|line| OrderLine {
            product_id: line.product.id.clone(),
            product_name: line.product.name.clone(),
            quantity: line.quantity,
            base_price: line.product.price,
            options: line
                .options
                .iter()
                .map(|o| OrderedOption {
                    variation_name: o.variation_name.clone(),
                    option_name: o.option_name.clone(),
                    price: o.price,
                })
                .collect(),
            notes: non_empty(Some(line.notes.as_str())),
            line_total: line.total(),
        })
        .collect();

    Ok(Order {
        id: OrderId::new(),
        number: order_number(now),
        customer: checkout.customer,
        fulfillment: checkout.fulfillment,
        payment: checkout.payment,
        lines,
        subtotal: quote.subtotal,
        delivery_fee: quote.delivery_fee,
        total: quote.total,
        status: OrderStatus::Pending,
        notes: checkout.notes,
        created_at: now,
        updated_at: now,
        completed_at: None,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
