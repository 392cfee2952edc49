//! The rendered invoice, built from the store alone.
//!
//! Both export strategies and the print action consume an [`InvoiceView`];
//! none of them read the store directly.

use std::fmt::Write as _;

use crate::locale::{format_amount, format_date, format_quantity};
use crate::store::FieldStore;

/// Label/value pair inside a section.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    pub value: String,
}

/// One charge: what it is, how it was computed, how much.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeLine {
    pub description: String,
    pub detail: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalLine {
    pub label: String,
    pub amount: String,
    pub emphasis: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title { title: String, lines: Vec<Line> },
    Section { heading: String, lines: Vec<Line> },
    Charges(Vec<ChargeLine>),
    Totals(Vec<TotalLine>),
    Note(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceView {
    pub number: String,
    pub blocks: Vec<Block>,
}

fn line(label: &str, value: impl Into<String>) -> Line {
    Line {
        label: label.to_string(),
        value: value.into(),
    }
}

impl InvoiceView {
    pub fn render(store: &FieldStore) -> Self {
        let host = store.host();
        let guest = store.guest();
        let r = store.reservation();
        let invoice = store.invoice();
        let totals = store.totals();

        let blocks = vec![
            Block::Title {
                title: "RAČUN".to_string(),
                lines: vec![
                    line("Broj računa", invoice.number.as_str()),
                    line("Datum izdavanja", format_date(invoice.issue_date)),
                    line("Datum dospijeća", format_date(invoice.due_date)),
                ],
            },
            Block::Section {
                heading: "Iznajmljivač".to_string(),
                lines: vec![
                    line("Naziv", host.name.as_str()),
                    line("Adresa", host.address.as_str()),
                    line("OIB", host.oib.as_str()),
                    line("Status", host.legal_status.as_str()),
                    line("IBAN", host.iban.as_str()),
                    line("Banka", host.bank.as_str()),
                ],
            },
            Block::Section {
                heading: "Gost".to_string(),
                lines: vec![
                    line("Ime", guest.name.as_str()),
                    line("Država", guest.country.as_str()),
                    line("Telefon", guest.phone.as_str()),
                    line("E-mail", guest.email.as_str()),
                ],
            },
            Block::Section {
                heading: "Rezervacija".to_string(),
                lines: vec![
                    line("Smještajna jedinica", r.apartment.as_str()),
                    line("Dolazak", format_date(r.arrival)),
                    line("Odlazak", format_date(r.departure)),
                    line("Broj noćenja", r.nights.to_string()),
                    line("Broj odraslih", format_quantity(r.adults)),
                ],
            },
            Block::Charges(vec![
                ChargeLine {
                    description: format!("Smještaj – {}", r.apartment),
                    detail: format!("{} × {}", r.nights, format_amount(r.price_per_night)),
                    amount: format_amount(totals.accommodation_cost),
                },
                ChargeLine {
                    description: "Boravišna pristojba".to_string(),
                    detail: format!(
                        "{} × {} × {}",
                        r.nights,
                        format_quantity(r.adults),
                        format_amount(r.tourist_tax_per_person_per_night)
                    ),
                    amount: format_amount(totals.tourist_tax_total),
                },
                ChargeLine {
                    description: "Završno čišćenje".to_string(),
                    detail: String::new(),
                    amount: format_amount(r.cleaning_fee),
                },
            ]),
            Block::Totals(vec![
                TotalLine {
                    label: "Ukupno".to_string(),
                    amount: format_amount(totals.total_amount),
                    emphasis: false,
                },
                TotalLine {
                    label: "Predujam".to_string(),
                    // Deducted from the total, so shown negated.
                    amount: format_amount(-r.prepayment),
                    emphasis: false,
                },
                TotalLine {
                    label: "Preostalo za platiti".to_string(),
                    amount: format_amount(totals.balance_due),
                    emphasis: true,
                },
            ]),
            Block::Note(format!(
                "{}. Plaćanje na IBAN {} ({}), poziv na broj {}.",
                host.legal_status, host.iban, host.bank, invoice.number
            )),
        ];

        InvoiceView {
            number: invoice.number.clone(),
            blocks,
        }
    }

    /// Plain-text rendering used for printing.
    pub fn to_text(&self) -> String {
        const WIDTH: usize = 72;
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Title { title, lines } => {
                    let _ = writeln!(out, "{title}");
                    let _ = writeln!(out, "{}", "=".repeat(WIDTH));
                    write_lines(&mut out, lines);
                }
                Block::Section { heading, lines } => {
                    let _ = writeln!(out, "\n{heading}");
                    let _ = writeln!(out, "{}", "-".repeat(heading.chars().count()));
                    write_lines(&mut out, lines);
                }
                Block::Charges(charges) => {
                    let _ = writeln!(out, "\n{}", "-".repeat(WIDTH));
                    for c in charges {
                        let _ = writeln!(out, "{:<34}{:<22}{:>16}", c.description, c.detail, c.amount);
                    }
                    let _ = writeln!(out, "{}", "-".repeat(WIDTH));
                }
                Block::Totals(totals) => {
                    for t in totals {
                        let label = if t.emphasis {
                            t.label.to_uppercase()
                        } else {
                            t.label.clone()
                        };
                        let _ = writeln!(out, "{:>56}{:>16}", label, t.amount);
                    }
                }
                Block::Note(note) => {
                    let _ = writeln!(out, "\n{note}");
                }
            }
        }
        out
    }
}

fn write_lines(out: &mut String, lines: &[Line]) {
    for l in lines {
        let _ = writeln!(out, "{:<22}{}", format!("{}:", l.label), l.value);
    }
}
