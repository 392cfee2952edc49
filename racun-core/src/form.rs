//! Raw form values and their validation/normalization into store records.
//!
//! The form keeps everything the user typed as text. Nothing here touches
//! the store; [`InvoiceForm::normalize`] produces the records a sync writes.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::{format_date_for_input, normalize_stay, parse_date_input};
use crate::error::{RacunError, Result};
use crate::model::{Guest, Host, Invoice, InvoiceRecords, Reservation};

/// Reservation group as typed. Nights are not part of the form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationFields {
    pub arrival: String,
    pub departure: String,
    pub apartment: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub price_per_night: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub tourist_tax_per_person_per_night: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub cleaning_fee: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub adults: String,
    #[serde(deserialize_with = "scalar_as_string")]
    pub prepayment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceFields {
    #[serde(deserialize_with = "scalar_as_string")]
    pub number: String,
    pub issue_date: String,
    pub due_date: String,
}

/// The whole form: four nested field groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceForm {
    pub host: Host,
    pub guest: Guest,
    pub reservation: ReservationFields,
    pub invoice: InvoiceFields,
}

/// A field the form could not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A single edit event: `reservation.prepayment` set to `"150"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub path: String,
    pub value: String,
}

impl FieldEdit {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        FieldEdit {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl FromStr for FieldEdit {
    type Err = RacunError;

    /// Parses `path=value`. The value may itself contain `=`; the path
    /// must be one of [`FIELD_PATHS`].
    fn from_str(s: &str) -> Result<Self> {
        let (path, value) = s
            .split_once('=')
            .ok_or_else(|| RacunError::UnknownField(s.to_string()))?;
        let path = path.trim();
        if !FIELD_PATHS.contains(&path) {
            return Err(RacunError::UnknownField(format!(
                "{path} (expected one of: {})",
                FIELD_PATHS.join(", ")
            )));
        }
        Ok(FieldEdit::new(path, value))
    }
}

/// Every editable path, in form order.
pub const FIELD_PATHS: [&str; 21] = [
    "host.name",
    "host.address",
    "host.oib",
    "host.legal_status",
    "host.iban",
    "host.bank",
    "guest.name",
    "guest.country",
    "guest.phone",
    "guest.email",
    "reservation.arrival",
    "reservation.departure",
    "reservation.apartment",
    "reservation.price_per_night",
    "reservation.tourist_tax_per_person_per_night",
    "reservation.cleaning_fee",
    "reservation.adults",
    "reservation.prepayment",
    "invoice.number",
    "invoice.issue_date",
    "invoice.due_date",
];

impl InvoiceForm {
    /// Populate the form from current store records.
    pub fn from_records(records: &InvoiceRecords) -> Self {
        let r = &records.reservation;
        InvoiceForm {
            host: records.host.clone(),
            guest: records.guest.clone(),
            reservation: ReservationFields {
                arrival: format_date_for_input(r.arrival),
                departure: format_date_for_input(r.departure),
                apartment: r.apartment.clone(),
                price_per_night: r.price_per_night.to_string(),
                tourist_tax_per_person_per_night: r.tourist_tax_per_person_per_night.to_string(),
                cleaning_fee: r.cleaning_fee.to_string(),
                adults: r.adults.to_string(),
                prepayment: r.prepayment.to_string(),
            },
            invoice: InvoiceFields {
                number: records.invoice.number.clone(),
                issue_date: format_date_for_input(records.invoice.issue_date),
                due_date: format_date_for_input(records.invoice.due_date),
            },
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RacunError::Config(format!("failed to parse form: {e}")))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| RacunError::Config(format!("failed to write form: {e}")))
    }

    /// Mutable access to a field by its dotted path.
    pub fn field_mut(&mut self, path: &str) -> Option<&mut String> {
        let field = match path {
            "host.name" => &mut self.host.name,
            "host.address" => &mut self.host.address,
            "host.oib" => &mut self.host.oib,
            "host.legal_status" => &mut self.host.legal_status,
            "host.iban" => &mut self.host.iban,
            "host.bank" => &mut self.host.bank,
            "guest.name" => &mut self.guest.name,
            "guest.country" => &mut self.guest.country,
            "guest.phone" => &mut self.guest.phone,
            "guest.email" => &mut self.guest.email,
            "reservation.arrival" => &mut self.reservation.arrival,
            "reservation.departure" => &mut self.reservation.departure,
            "reservation.apartment" => &mut self.reservation.apartment,
            "reservation.price_per_night" => &mut self.reservation.price_per_night,
            "reservation.tourist_tax_per_person_per_night" => {
                &mut self.reservation.tourist_tax_per_person_per_night
            }
            "reservation.cleaning_fee" => &mut self.reservation.cleaning_fee,
            "reservation.adults" => &mut self.reservation.adults,
            "reservation.prepayment" => &mut self.reservation.prepayment,
            "invoice.number" => &mut self.invoice.number,
            "invoice.issue_date" => &mut self.invoice.issue_date,
            "invoice.due_date" => &mut self.invoice.due_date,
            _ => return None,
        };
        Some(field)
    }

    /// Apply one edit to the raw values. Unknown paths are an error.
    pub fn apply(&mut self, edit: &FieldEdit) -> Result<()> {
        let field = self
            .field_mut(&edit.path)
            .ok_or_else(|| RacunError::UnknownField(edit.path.clone()))?;
        field.clone_from(&edit.value);
        Ok(())
    }

    /// Problems that keep this form from being written to the store.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let dates = [
            ("reservation.arrival", &self.reservation.arrival),
            ("reservation.departure", &self.reservation.departure),
            ("invoice.issue_date", &self.invoice.issue_date),
            ("invoice.due_date", &self.invoice.due_date),
        ];
        dates
            .into_iter()
            .filter_map(|(field, value)| {
                parse_date_input(value).err().map(|e| ValidationIssue {
                    field,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Validate, coerce numbers and derive nights. Returns the records for a
    /// single combined store write, or the issues that suppress it.
    pub fn normalize(&self) -> std::result::Result<InvoiceRecords, Vec<ValidationIssue>> {
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(issues);
        }
        let as_issue = |field: &'static str| {
            move |e: RacunError| {
                vec![ValidationIssue {
                    field,
                    message: e.to_string(),
                }]
            }
        };

        let r = &self.reservation;
        let stay = normalize_stay(&r.arrival, &r.departure).map_err(as_issue("reservation"))?;
        let issue_date = parse_date_input(&self.invoice.issue_date).map_err(as_issue("invoice.issue_date"))?;
        let due_date = parse_date_input(&self.invoice.due_date).map_err(as_issue("invoice.due_date"))?;

        Ok(InvoiceRecords {
            host: self.host.clone(),
            guest: self.guest.clone(),
            reservation: Reservation {
                arrival: stay.arrival,
                departure: stay.departure,
                nights: stay.nights,
                apartment: r.apartment.clone(),
                price_per_night: coerce_number(&r.price_per_night),
                tourist_tax_per_person_per_night: coerce_number(&r.tourist_tax_per_person_per_night),
                cleaning_fee: coerce_number(&r.cleaning_fee),
                adults: coerce_number(&r.adults),
                prepayment: coerce_number(&r.prepayment),
            },
            invoice: Invoice {
                number: self.invoice.number.clone(),
                issue_date,
                due_date,
            },
        })
    }
}

/// Parse a number typed into a form field, falling back to zero. Blank,
/// non-numeric and non-finite input all give zero. A lone decimal comma is
/// read as a decimal point.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let parsed = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".").parse::<f64>()
    } else {
        trimmed.parse::<f64>()
    };
    match parsed {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Form files may write numbers bare (`adults = 2`) or quoted; both end up
/// as text.
fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
    })
}
