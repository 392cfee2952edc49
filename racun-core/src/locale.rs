//! Croatian display formatting. Only the rendered view goes through here;
//! stored values stay plain numbers and ISO dates.

use chrono::NaiveDate;

const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';
const CURRENCY_SUFFIX: &str = " €";

/// `1234.5` -> `1.234,50`
pub fn format_decimal(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{whole}{DECIMAL_SEPARATOR}{:02}", cents % 100)
}

/// `911.0` -> `911,00 €`
pub fn format_amount(value: f64) -> String {
    format!("{}{CURRENCY_SUFFIX}", format_decimal(value))
}

/// Counts and rates without forced decimals: `2` -> `2`, `1.5` -> `1,5`.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}{}", group_thousands(value.abs() as u64))
    } else {
        format!("{value}").replace('.', &DECIMAL_SEPARATOR.to_string())
    }
}

/// `2024-09-01` -> `01.09.2024.`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y.").to_string()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(ch);
    }
    out
}
