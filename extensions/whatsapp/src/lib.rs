//! # mesa-whatsapp
//!
//! Order notification through a `wa.me` deep link. The message is plain text
//! with WhatsApp markup (`*bold*`); opening the link hands it to the messaging
//! app, nothing is sent from here.

use mesa_core::order::{Fulfillment, Order, Payment};
use std::fmt::Write;
use thiserror::Error;

pub const WA_ME: &str = "https://wa.me";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("phone number '{0}' has no digits")]
    InvalidPhone(String),
}

/// Renders the order as the message the restaurant receives.
pub fn format_order_message(order: &Order) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_message(&mut out, order);
    out
}

fn write_message(out: &mut String, order: &Order) -> std::fmt::Result {
    writeln!(out, "🆕 *NUEVO PEDIDO - {}*", order.number)?;
    writeln!(out)?;
    writeln!(out, "👤 *Cliente:* {}", order.customer.name)?;
    writeln!(out, "📱 *Teléfono:* {}", order.customer.phone)?;
    writeln!(out, "📦 *Tipo:* {}", order.delivery_type().label())?;

    match &order.fulfillment {
        Fulfillment::Delivery { address, zone } => {
            writeln!(out, "📍 *Dirección:* {address}")?;
            writeln!(out, "🗺️ *Zona:* {}", zone.name)?;
        }
        Fulfillment::Table { people } => writeln!(out, "👥 *Personas:* {people}")?,
        Fulfillment::Pickup => {}
    }

    writeln!(out, "💳 *Pago:* {}", order.payment.method().label())?;
    match &order.payment {
        Payment::Cash {
            tendered: Some(tendered),
        } => {
            writeln!(out, "💵 *Paga con:* {tendered}")?;
            if let Some(change) = order.change_due() {
                writeln!(out, "💰 *Cambio:* {change}")?;
            }
        }
        Payment::Transfer { .. } => writeln!(out, "✅ *Comprobante de pago enviado*")?,
        _ => {}
    }

    writeln!(out)?;
    writeln!(out, "📋 *Productos:*")?;
    for (index, line) in order.lines.iter().enumerate() {
        writeln!(
            out,
            "{}. {} x{} - {}",
            index + 1,
            line.product_name,
            line.quantity,
            line.line_total
        )?;
        for option in &line.options {
            write!(out, "   • {}: {}", option.variation_name, option.option_name)?;
            if option.price.is_positive() {
                write!(out, " (+{})", option.price)?;
            }
            writeln!(out)?;
        }
        if let Some(notes) = &line.notes {
            writeln!(out, "   📝 {notes}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "💰 *Subtotal:* {}", order.subtotal)?;
    if order.delivery_fee.is_positive() {
        writeln!(out, "🚚 *Envío:* {}", order.delivery_fee)?;
    }
    writeln!(out, "💵 *Total:* {}", order.total)?;

    if let Some(notes) = &order.notes {
        writeln!(out)?;
        writeln!(out, "📝 *Notas adicionales:* {notes}")?;
    }
    Ok(())
}

/// Keeps only the digits of a phone number, as `wa.me` expects.
pub fn normalize_phone(phone: &str) -> Result<String, NotifyError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(NotifyError::InvalidPhone(phone.to_string()));
    }
    Ok(digits)
}

/// `https://wa.me/<digits>?text=<message>` for the given order.
pub fn order_link(order: &Order, phone: &str) -> Result<String, NotifyError> {
    let digits = normalize_phone(phone)?;
    let message = format_order_message(order);
    let url = format!("{WA_ME}/{digits}?text={}", urlencoding::encode(&message));
    tracing::debug!(order_id = %order.id, len = url.len(), "whatsapp link built");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mesa_core::money::Money;
    use mesa_core::order::{Customer, OrderId, OrderLine, OrderedOption, ZoneSnapshot};
    use mesa_core::status::OrderStatus;

    fn order(fulfillment: Fulfillment, payment: Payment) -> Order {
        let at = Utc.with_ymd_and_hms(2025, 2, 14, 20, 0, 0).unwrap();
        let fee = fulfillment.delivery_fee();
        let subtotal = Money::from_major(100);
        Order {
            id: OrderId::from("o-1"),
            number: "ORD-00001234".into(),
            customer: Customer {
                name: "Ana".into(),
                phone: "555 0101".into(),
                email: None,
                birthday: None,
            },
            fulfillment,
            payment,
            lines: vec![OrderLine {
                product_id: "tlayuda".into(),
                product_name: "Tlayuda".into(),
                quantity: 1,
                base_price: Money::from_major(85),
                options: vec![
                    OrderedOption {
                        variation_name: "Tamaño".into(),
                        option_name: "Individual".into(),
                        price: Money::ZERO,
                    },
                    OrderedOption {
                        variation_name: "Proteína".into(),
                        option_name: "Mixta".into(),
                        price: Money::from_major(15),
                    },
                ],
                notes: Some("sin cebolla".into()),
                line_total: subtotal,
            }],
            subtotal,
            delivery_fee: fee,
            total: subtotal + fee,
            status: OrderStatus::Pending,
            notes: None,
            created_at: at,
            updated_at: at,
            completed_at: None,
        }
    }

    #[test]
    fn test_delivery_message_lists_fee_and_address() {
        let msg = format_order_message(&order(
            Fulfillment::Delivery {
                address: "Calle 5 #12".into(),
                zone: ZoneSnapshot {
                    name: "Centro".into(),
                    fee: Money::from_major(30),
                },
            },
            Payment::Cash {
                tendered: Some(Money::from_major(200)),
            },
        ));

        assert!(msg.starts_with("🆕 *NUEVO PEDIDO - ORD-00001234*\n"));
        assert!(msg.contains("📍 *Dirección:* Calle 5 #12\n"));
        assert!(msg.contains("1. Tlayuda x1 - $100.00\n"));
        assert!(msg.contains("   • Tamaño: Individual\n"));
        assert!(msg.contains("   • Proteína: Mixta (+$15.00)\n"));
        assert!(msg.contains("   📝 sin cebolla\n"));
        assert!(msg.contains("🚚 *Envío:* $30.00\n"));
        assert!(msg.contains("💵 *Total:* $130.00\n"));
        assert!(msg.contains("💰 *Cambio:* $70.00\n"));
    }

    #[test]
    fn test_pickup_message_omits_fee() {
        let msg = format_order_message(&order(Fulfillment::Pickup, Payment::Card));
        assert!(msg.contains("📦 *Tipo:* Recoger en tienda\n"));
        assert!(msg.contains("💳 *Pago:* Tarjeta\n"));
        assert!(!msg.contains("Envío"));
    }

    #[test]
    fn test_link_strips_phone_formatting_and_encodes_text() {
        let link = order_link(&order(Fulfillment::Table { people: 3 }, Payment::Card), "+506 8388-9614")
            .unwrap();
        assert!(link.starts_with("https://wa.me/50683889614?text="));
        assert!(!link.contains(' '));
        assert!(!link.contains('\n'));
        assert!(link.contains("%0A"));
    }

    #[test]
    fn test_phone_without_digits_is_rejected() {
        let err = order_link(&order(Fulfillment::Pickup, Payment::Card), "n/a").unwrap_err();
        assert_eq!(err, NotifyError::InvalidPhone("n/a".into()));
    }
}
