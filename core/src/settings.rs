//! Storefront settings maintained from the back office.

use crate::money::Money;
use crate::order::{DeliveryType, PaymentMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: String,
    pub name: String,
    pub fee: Money,
    #[serde(default = "enabled")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOptions {
    pub cash: bool,
    pub transfer: bool,
    pub card: bool,
}

impl Default for PaymentOptions {
    fn default() -> Self {
        Self {
            cash: true,
            transfer: true,
            card: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    pub pickup: bool,
    pub delivery: bool,
    pub table: bool,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            pickup: true,
            delivery: true,
            table: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInfo {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

/// Optional customer fields collected at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerFields {
    pub email_enabled: bool,
    pub email_required: bool,
    pub birthday_enabled: bool,
    pub birthday_required: bool,
}

impl CustomerFields {
    pub fn email_mandatory(&self) -> bool {
        self.email_enabled && self.email_required
    }

    pub fn birthday_mandatory(&self) -> bool {
        self.birthday_enabled && self.birthday_required
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub business_name: String,
    /// Number that receives order notifications, in any human format.
    pub whatsapp_number: String,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub delivery_zones: Vec<DeliveryZone>,
    #[serde(default)]
    pub payment_methods: PaymentOptions,
    #[serde(default)]
    pub delivery_types: DeliveryOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_info: Option<BankInfo>,
    #[serde(default)]
    pub customer_fields: CustomerFields,
    /// Stamped by the store on save.
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    pub fn new(business_name: impl Into<String>, whatsapp_number: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            whatsapp_number: whatsapp_number.into(),
            branding: Branding::default(),
            delivery_zones: Vec::new(),
            payment_methods: PaymentOptions::default(),
            delivery_types: DeliveryOptions::default(),
            bank_info: None,
            customer_fields: CustomerFields::default(),
            updated_at: Utc::now(),
        }
    }

    /// Active zone by id. Inactive zones cannot be chosen at checkout.
    pub fn zone(&self, id: &str) -> Option<&DeliveryZone> {
        self.delivery_zones.iter().find(|z| z.id == id && z.active)
    }

    pub fn active_zones(&self) -> impl Iterator<Item = &DeliveryZone> {
        self.delivery_zones.iter().filter(|z| z.active)
    }

    pub fn accepts(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::Cash => self.payment_methods.cash,
            PaymentMethod::Transfer => self.payment_methods.transfer,
            PaymentMethod::Card => self.payment_methods.card,
        }
    }

    pub fn offers(&self, delivery: DeliveryType) -> bool {
        match delivery {
            DeliveryType::Pickup => self.delivery_types.pickup,
            DeliveryType::Delivery => self.delivery_types.delivery,
            DeliveryType::Table => self.delivery_types.table,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.business_name.trim().is_empty() {
            return Err(SettingsError::MissingBusinessName);
        }
        let mut ids = HashSet::new();
        for zone in &self.delivery_zones {
            if zone.fee.is_negative() {
                return Err(SettingsError::NegativeZoneFee(zone.name.clone()));
            }
            if !ids.insert(zone.id.as_str()) {
                return Err(SettingsError::DuplicateZone(zone.id.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("business name is required")]
    MissingBusinessName,
    #[error("delivery zone '{0}' has a negative fee")]
    NegativeZoneFee(String),
    #[error("delivery zone id '{0}' is used twice")]
    DuplicateZone(String),
}

fn enabled() -> bool {
    true
}
