//! Checkout form validation and order summaries.
//!
//! There is no payment processing. A valid form plus a non-empty cart is all a
//! simulated order needs.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartEntry};
use crate::types::{Email, Price};

/// How the shopper says they will pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Credit,
    Paypal,
}

/// Checkout form fields, named as the HTML form posts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    /// HTML checkboxes post `on` when ticked and nothing otherwise.
    #[serde(deserialize_with = "checkbox")]
    pub agree_to_terms: bool,
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Text(s) => matches!(s.as_str(), "on" | "true" | "1" | "yes"),
    })
}

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    CardNumber,
    ExpiryDate,
    Cvv,
    AgreeToTerms,
}

impl CheckoutField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zip_code",
            Self::CardNumber => "card_number",
            Self::ExpiryDate => "expiry_date",
            Self::Cvv => "cvv",
            Self::AgreeToTerms => "agree_to_terms",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every validation failure on a submitted form, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("checkout form has {} invalid field(s)", .errors.len())]
pub struct CheckoutErrors {
    errors: BTreeMap<CheckoutField, &'static str>,
}

impl CheckoutErrors {
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckoutField, &'static str)> + '_ {
        self.errors.iter().map(|(field, msg)| (*field, *msg))
    }

    fn require(&mut self, field: CheckoutField, value: &str, message: &'static str) {
        if value.trim().is_empty() {
            self.errors.insert(field, message);
        }
    }
}

impl CheckoutForm {
    /// Check every field and report all problems at once.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutErrors`] listing each invalid field.
    pub fn validate(&self) -> Result<ValidCheckout, CheckoutErrors> {
        use CheckoutField as F;

        let mut errors = CheckoutErrors::default();
        errors.require(F::FirstName, &self.first_name, "First name is required");
        errors.require(F::LastName, &self.last_name, "Last name is required");
        errors.require(F::Email, &self.email, "Email is required");
        errors.require(F::Phone, &self.phone, "Phone is required");
        errors.require(F::Address, &self.address, "Address is required");
        errors.require(F::City, &self.city, "City is required");
        errors.require(F::State, &self.state, "State is required");
        errors.require(F::ZipCode, &self.zip_code, "Zip code is required");

        if self.payment_method == PaymentMethod::Credit {
            errors.require(F::CardNumber, &self.card_number, "Card number is required");
            errors.require(F::ExpiryDate, &self.expiry_date, "Expiry date is required");
            errors.require(F::Cvv, &self.cvv, "CVV is required");
        }

        if !self.agree_to_terms {
            errors
                .errors
                .insert(F::AgreeToTerms, "You must agree to the terms");
        }

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(_) => {
                errors
                    .errors
                    .entry(F::Email)
                    .or_insert("Enter a valid email address");
                None
            }
        };

        match email {
            Some(email) if errors.is_empty() => Ok(ValidCheckout {
                customer_name: format!("{} {}", self.first_name.trim(), self.last_name.trim()),
                email,
                payment_method: self.payment_method,
            }),
            _ => Err(errors),
        }
    }
}

/// The parts of a validated form an order keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub customer_name: String,
    pub email: Email,
    pub payment_method: PaymentMethod,
}

/// Totals shown beside the cart and the checkout form.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub lines: Vec<CartEntry>,
    pub subtotal: Decimal,
    /// Shipping is always free.
    pub shipping: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let subtotal = cart.total();
        let shipping = Decimal::ZERO;
        Self {
            lines: cart.entries().to_vec(),
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    #[must_use]
    pub fn display_subtotal(&self) -> Price {
        Price::usd(self.subtotal)
    }

    #[must_use]
    pub fn display_total(&self) -> Price {
        Price::usd(self.total)
    }

    #[must_use]
    pub fn is_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}
