//! The four records held by the field store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{calculate_nights, default_due_date};

/// Sequence part of the invoice number. Numbering authority is out of
/// scope, so every new invoice starts from the same sequence.
const INVOICE_SEQUENCE: &str = "001";

/// The landlord issuing the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    pub name: String,
    pub address: String,
    /// Croatian personal identification number (tax id).
    pub oib: String,
    pub legal_status: String,
    pub iban: String,
    pub bank: String,
}

impl Host {
    pub fn sample() -> Self {
        Host {
            name: "Apartmani Sunce".to_string(),
            address: "Jadranska Cesta 123, 21300 Makarska, Croatia".to_string(),
            oib: "12345678901".to_string(),
            legal_status: "Privatni iznajmljivač van sustava PDV-a".to_string(),
            iban: "HR1234567890123456789".to_string(),
            bank: "Hrvatska Poštanska Banka d.d.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Guest {
    pub name: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

impl Guest {
    pub fn sample() -> Self {
        Guest {
            name: "Mr. Klaus Schmidt".to_string(),
            country: "Germany".to_string(),
            phone: "+49 123 456789".to_string(),
            email: "klaus.schmidt@email.de".to_string(),
        }
    }
}

/// A stay and its prices. `nights` is always derived from the two dates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reservation {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub nights: u32,
    pub apartment: String,
    pub price_per_night: f64,
    pub tourist_tax_per_person_per_night: f64,
    pub cleaning_fee: f64,
    pub adults: f64,
    pub prepayment: f64,
}

impl Reservation {
    pub fn sample() -> Self {
        let arrival = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default();
        let departure = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap_or_default();
        Reservation {
            arrival,
            departure,
            nights: calculate_nights(arrival, departure),
            apartment: "Sea View Apartment".to_string(),
            price_per_night: 120.0,
            tourist_tax_per_person_per_night: 1.50,
            cleaning_fee: 50.0,
            adults: 2.0,
            prepayment: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl Invoice {
    /// A fresh invoice issued on `issue_date`, due a week later.
    pub fn issued_on(issue_date: NaiveDate) -> Self {
        Invoice {
            number: format!("{}-{}", issue_date.format("%Y"), INVOICE_SEQUENCE),
            issue_date,
            due_date: default_due_date(issue_date),
        }
    }
}

/// One complete snapshot of the store contents. Writes always replace all
/// four records together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecords {
    pub host: Host,
    pub guest: Guest,
    pub reservation: Reservation,
    pub invoice: Invoice,
}

impl InvoiceRecords {
    /// The sample records a new session starts from.
    pub fn seed(today: NaiveDate) -> Self {
        InvoiceRecords {
            host: Host::sample(),
            guest: Guest::sample(),
            reservation: Reservation::sample(),
            invoice: Invoice::issued_on(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_reservation_has_seven_nights() {
        let r = Reservation::sample();
        assert_eq!(r.nights, 7);
        assert_eq!(r.arrival.to_string(), "2024-09-01");
    }

    #[test]
    fn invoice_number_uses_issue_year() {
        let issue = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let invoice = Invoice::issued_on(issue);
        assert_eq!(invoice.number, "2025-001");
        assert_eq!(invoice.due_date.to_string(), "2025-03-21");
    }
}
