//! The single in-memory field store and the sync that writes to it.

use tracing::debug;

use crate::form::{InvoiceForm, ValidationIssue};
use crate::model::{Guest, Host, Invoice, InvoiceRecords, Reservation};
use crate::totals::Totals;

/// Outcome of pushing the form into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// All four records were replaced and totals recomputed.
    Written,
    /// The form is invalid; the store kept its previous contents.
    Suppressed(Vec<ValidationIssue>),
}

impl SyncOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, SyncOutcome::Written)
    }
}

/// Owns the Host, Guest, Reservation and Invoice records together with the
/// totals derived from the reservation. The totals are recomputed inside
/// every write, so a reader never sees totals for an older reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStore {
    records: InvoiceRecords,
    totals: Totals,
}

impl FieldStore {
    pub fn new(records: InvoiceRecords) -> Self {
        let totals = Totals::compute(&records.reservation);
        FieldStore { records, totals }
    }

    pub fn host(&self) -> &Host {
        &self.records.host
    }

    pub fn guest(&self) -> &Guest {
        &self.records.guest
    }

    pub fn reservation(&self) -> &Reservation {
        &self.records.reservation
    }

    pub fn invoice(&self) -> &Invoice {
        &self.records.invoice
    }

    pub fn records(&self) -> &InvoiceRecords {
        &self.records
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Validate and normalize the form, then replace all records in one
    /// write. An invalid form leaves the store untouched.
    pub fn sync(&mut self, form: &InvoiceForm) -> SyncOutcome {
        match form.normalize() {
            Ok(records) => {
                self.write(records);
                debug!(
                    nights = self.records.reservation.nights,
                    total = self.totals.total_amount,
                    balance = self.totals.balance_due,
                    "store updated"
                );
                SyncOutcome::Written
            }
            Err(issues) => {
                debug!(issues = issues.len(), "form invalid, store write suppressed");
                SyncOutcome::Suppressed(issues)
            }
        }
    }

    fn write(&mut self, records: InvoiceRecords) {
        self.totals = Totals::compute(&records.reservation);
        self.records = records;
    }
}
