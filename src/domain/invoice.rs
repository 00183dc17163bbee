use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(DomainError::InvalidInput(format!(
                "unknown invoice status '{other}'"
            ))),
        }
    }
}

/// Validated invoice fields as submitted by the create and edit forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceInput {
    pub customer_id: String,
    /// Amount in minor currency units (cents).
    pub amount: i32,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: i32,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i32,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Invoice>,
    pub total: i64,
}

/// Convert a decimal currency amount into minor units, rounding half away
/// from zero. Returns `None` when the result does not fit the storage column.
pub fn to_minor_units(amount: &BigDecimal) -> Option<i32> {
    (amount.clone() * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i32()
}
