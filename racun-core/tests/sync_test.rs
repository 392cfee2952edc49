use chrono::NaiveDate;
use racun_core::{FieldEdit, FieldStore, InvoiceForm, InvoiceRecords, Session, SyncOutcome};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 8).unwrap()
}

fn session() -> Session {
    Session::new(InvoiceRecords::seed(today()))
}

fn set(session: &mut Session, path: &str, value: &str) -> SyncOutcome {
    session.edit(&FieldEdit::new(path, value)).unwrap()
}

// -------------------------------------------------------
// Derived totals
// -------------------------------------------------------

#[test]
fn seeded_week_in_makarska() {
    let s = session();
    let totals = s.store().totals();
    assert_eq!(s.store().reservation().nights, 7);
    assert_eq!(totals.accommodation_cost, 840.0);
    assert_eq!(totals.tourist_tax_total, 21.0);
    assert_eq!(totals.total_amount, 911.0);
    assert_eq!(totals.balance_due, 711.0);
}

#[test]
fn stay_edits_drive_nights_and_totals() {
    let mut s = session();
    set(&mut s, "reservation.arrival", "2024-09-01");
    let outcome = set(&mut s, "reservation.departure", "2024-09-04");
    assert!(outcome.is_written());

    let store = s.store();
    assert_eq!(store.reservation().nights, 3);
    assert_eq!(store.totals().accommodation_cost, 360.0);
    assert_eq!(store.totals().tourist_tax_total, 9.0);
    assert_eq!(store.totals().total_amount, 419.0);
    assert_eq!(store.totals().balance_due, 219.0);
}

#[test]
fn departure_before_arrival_is_zero_nights() {
    let mut s = session();
    set(&mut s, "reservation.arrival", "2024-09-10");
    set(&mut s, "reservation.departure", "2024-09-01");
    let store = s.store();
    assert_eq!(store.reservation().nights, 0);
    assert_eq!(store.totals().accommodation_cost, 0.0);
    assert_eq!(store.totals().total_amount, 50.0);
}

#[test]
fn overpayment_gives_negative_balance() {
    let mut s = session();
    set(&mut s, "reservation.prepayment", "1000");
    assert_eq!(s.store().totals().balance_due, -89.0);
}

// -------------------------------------------------------
// Coercion and validation
// -------------------------------------------------------

#[test]
fn non_numeric_prepayment_counts_as_zero() {
    let mut s = session();
    let outcome = set(&mut s, "reservation.prepayment", "two hundred");
    assert!(outcome.is_written());
    assert_eq!(s.store().reservation().prepayment, 0.0);
    assert_eq!(s.store().totals().balance_due, 911.0);
    // The form keeps what was typed.
    assert_eq!(s.form().reservation.prepayment, "two hundred");
}

#[test]
fn blank_numbers_count_as_zero() {
    let mut s = session();
    set(&mut s, "reservation.cleaning_fee", "");
    set(&mut s, "reservation.adults", "  ");
    let totals = s.store().totals();
    assert_eq!(totals.tourist_tax_total, 0.0);
    assert_eq!(totals.total_amount, 840.0);
}

#[test]
fn invalid_date_suppresses_the_write() {
    let mut s = session();
    let before = s.store().clone();
    let outcome = set(&mut s, "reservation.departure", "2024-13-45");
    match outcome {
        SyncOutcome::Suppressed(issues) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].field, "reservation.departure");
        }
        SyncOutcome::Written => panic!("invalid date must not be written"),
    }
    assert_eq!(s.store(), &before);

    // Fixing the field writes again.
    assert!(set(&mut s, "reservation.departure", "2024-09-05").is_written());
    assert_eq!(s.store().reservation().nights, 4);
}

#[test]
fn datetime_input_uses_the_date_part() {
    let mut s = session();
    set(&mut s, "reservation.departure", "2024-09-03T11:00");
    assert_eq!(s.store().reservation().nights, 2);
}

// -------------------------------------------------------
// Sync
// -------------------------------------------------------

#[test]
fn sync_is_idempotent() {
    let form = InvoiceForm::from_records(&InvoiceRecords::seed(today()));
    let earlier = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut store = FieldStore::new(InvoiceRecords::seed(earlier));
    assert!(store.sync(&form).is_written());
    let once = store.clone();
    assert!(store.sync(&form).is_written());
    assert_eq!(store, once);
}

#[test]
fn form_file_overrides_seed() {
    let form = InvoiceForm::from_toml_str(
        r#"
        [guest]
        name = "Ana Horvat"

        [reservation]
        arrival = "2024-07-10"
        departure = "2024-07-12"
        price_per_night = 95
        tourist_tax_per_person_per_night = 1.33
        cleaning_fee = 40
        adults = 3
        prepayment = "0"

        [invoice]
        number = 17
        issue_date = "2024-07-12"
        due_date = "2024-07-19"
        "#,
    )
    .unwrap();

    let (s, outcome) = Session::with_form(InvoiceRecords::seed(today()), form);
    assert!(outcome.is_written());
    let store = s.store();
    assert_eq!(store.guest().name, "Ana Horvat");
    assert_eq!(store.invoice().number, "17");
    assert_eq!(store.reservation().nights, 2);
    assert_eq!(store.totals().accommodation_cost, 190.0);
    assert!((store.totals().tourist_tax_total - 7.98).abs() < 1e-9);
    assert!((store.totals().balance_due - 237.98).abs() < 1e-9);
}

#[test]
fn command_line_edits_parse() {
    let edits: Vec<FieldEdit> = ["reservation.adults=3", "guest.email=a=b@example.com"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let mut s = session();
    assert!(s.edit_many(&edits).unwrap().is_written());
    assert_eq!(s.store().reservation().adults, 3.0);
    assert_eq!(s.store().guest().email, "a=b@example.com");
}

// -------------------------------------------------------
// Preview and print
// -------------------------------------------------------

#[test]
fn printed_layout_follows_the_store() {
    let mut s = session();
    s.mount();
    set(&mut s, "reservation.prepayment", "111");

    let mut out = Vec::new();
    s.print(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("RAČUN"));
    assert!(text.contains("911,00 €"));
    assert!(text.contains("800,00 €"));
}

#[test]
fn negative_prepayment_prints_with_single_sign() {
    let mut s = session();
    s.mount();
    set(&mut s, "reservation.prepayment", "-50");

    let mut out = Vec::new();
    s.print(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("--50"));
    assert!(text.contains(" 50,00 €"));
    assert!(text.contains("961,00 €"));
}
