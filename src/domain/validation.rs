use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use super::form::FormData;
use super::invoice::{to_minor_units, InvoiceInput, InvoiceStatus};

pub const CUSTOMER_ID: &str = "customerId";
pub const AMOUNT: &str = "amount";
pub const STATUS: &str = "status";

/// Keys accepted by the create and edit invoice forms.
pub const INVOICE_FORM_KEYS: [&str; 3] = [CUSTOMER_ID, AMOUNT, STATUS];

const SELECT_CUSTOMER: &str = "Please select a customer.";
const AMOUNT_NOT_A_NUMBER: &str = "Please enter a valid amount.";
const AMOUNT_NOT_POSITIVE: &str = "Please enter an amount greater than $0.";
const AMOUNT_TOO_LARGE: &str = "Please enter a smaller amount.";
const SELECT_STATUS: &str = "Please select an invoice status.";
const UNEXPECTED_FIELD: &str = "Unexpected field.";

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(report: ValidationErrors) -> Self {
        let mut errors = FieldErrors::default();
        for (field, failures) in report.field_errors() {
            let key = form_key(&field);
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                errors.add(key, message);
            }
        }
        errors
    }
}

fn form_key(field: &str) -> &str {
    match field {
        "customer_id" => CUSTOMER_ID,
        "amount" => AMOUNT,
        "status" => STATUS,
        other => other,
    }
}

/// Presence checks run through `validator`; values are converted once in
/// [`InvoiceFields::into_input`].
#[derive(Debug, Validate)]
struct InvoiceFields {
    #[validate(required(message = "Please select a customer."))]
    customer_id: Option<String>,
    #[validate(required(message = "Please enter an amount greater than $0."))]
    amount: Option<String>,
    #[validate(required(message = "Please select an invoice status."))]
    status: Option<String>,
}

impl InvoiceFields {
    fn from_form(form: &FormData) -> Self {
        Self {
            customer_id: form.get(CUSTOMER_ID).map(|v| v.trim().to_string()),
            amount: form.get(AMOUNT).map(|v| v.trim().to_string()),
            status: form.get(STATUS).map(str::to_string),
        }
    }

    /// Convert the submitted values, recording a message under each field
    /// whose value is rejected. Missing fields yield `None` without a message.
    fn into_input(self, errors: &mut FieldErrors) -> Option<InvoiceInput> {
        let customer_id = match self.customer_id {
            Some(id) if id.is_empty() => {
                errors.add(CUSTOMER_ID, SELECT_CUSTOMER);
                None
            }
            id => id,
        };
        let amount = match self.amount.as_deref().map(amount_in_minor_units) {
            Some(Ok(cents)) => Some(cents),
            Some(Err(message)) => {
                errors.add(AMOUNT, message);
                None
            }
            None => None,
        };
        let status = match self.status.as_deref().map(InvoiceStatus::from_str) {
            Some(Ok(status)) => Some(status),
            Some(Err(_)) => {
                errors.add(STATUS, SELECT_STATUS);
                None
            }
            None => None,
        };

        Some(InvoiceInput {
            customer_id: customer_id?,
            amount: amount?,
            status: status?,
        })
    }
}

/// Parse a submitted amount into minor units. A blank value counts as zero.
fn amount_in_minor_units(raw: &str) -> Result<i32, &'static str> {
    if raw.is_empty() {
        return Err(AMOUNT_NOT_POSITIVE);
    }
    let amount = BigDecimal::from_str(raw).map_err(|_| AMOUNT_NOT_A_NUMBER)?;
    if amount <= BigDecimal::zero() {
        return Err(AMOUNT_NOT_POSITIVE);
    }
    match to_minor_units(&amount) {
        Some(cents) if cents > 0 => Ok(cents),
        Some(_) => Err(AMOUNT_NOT_POSITIVE),
        None => Err(AMOUNT_TOO_LARGE),
    }
}

/// Check an invoice form against the create/edit schema.
///
/// Every key must be one of [`INVOICE_FORM_KEYS`]; all three are required.
pub fn validate_invoice_form(form: &FormData) -> Result<InvoiceInput, FieldErrors> {
    let mut errors = FieldErrors::default();
    for key in form.unexpected_keys(&INVOICE_FORM_KEYS) {
        errors.add(key, UNEXPECTED_FIELD);
    }

    let fields = InvoiceFields::from_form(form);
    if let Err(report) = fields.validate() {
        for (field, messages) in FieldErrors::from(report).0 {
            for message in messages {
                errors.add(&field, message);
            }
        }
    }

    match fields.into_input(&mut errors) {
        Some(input) if errors.is_empty() => Ok(input),
        _ => Err(errors),
    }
}
