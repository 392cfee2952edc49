//! An editing session: the form, the store behind it, and the preview
//! rendered from the store.
//!
//! Data flows one way. An edit changes the form, the form is synced into
//! the store, and a written store re-renders the preview. Nothing reads the
//! form to draw the preview and nothing writes the store except the sync.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::export::{export_to_dir, ExportStrategy};
use crate::form::{FieldEdit, InvoiceForm};
use crate::model::InvoiceRecords;
use crate::store::{FieldStore, SyncOutcome};
use crate::view::InvoiceView;

pub struct Session {
    form: InvoiceForm,
    store: FieldStore,
    preview: Option<InvoiceView>,
}

impl Session {
    /// Form and store both start from `records`. No preview is rendered
    /// until [`Session::mount`].
    pub fn new(records: InvoiceRecords) -> Self {
        Session {
            form: InvoiceForm::from_records(&records),
            store: FieldStore::new(records),
            preview: None,
        }
    }

    /// Start a session from a form someone already filled in. The store is
    /// seeded with `fallback` and then synced from the form.
    pub fn with_form(fallback: InvoiceRecords, form: InvoiceForm) -> (Self, SyncOutcome) {
        let mut session = Session::new(fallback);
        let outcome = session.submit(form);
        (session, outcome)
    }

    pub fn form(&self) -> &InvoiceForm {
        &self.form
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn preview(&self) -> Option<&InvoiceView> {
        self.preview.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.preview.is_some()
    }

    /// Render the preview. From now on it follows every store write.
    pub fn mount(&mut self) -> &InvoiceView {
        self.preview.insert(InvoiceView::render(&self.store))
    }

    /// Replace the whole form and sync it.
    pub fn submit(&mut self, form: InvoiceForm) -> SyncOutcome {
        self.form = form;
        self.sync()
    }

    /// Apply one field edit and sync. An unknown field path is an error and
    /// leaves both form and store as they were.
    pub fn edit(&mut self, edit: &FieldEdit) -> Result<SyncOutcome> {
        self.form.apply(edit)?;
        debug!(field = %edit.path, "field edited");
        Ok(self.sync())
    }

    /// Apply several edits as one change, syncing once at the end.
    pub fn edit_many<'a, I>(&mut self, edits: I) -> Result<SyncOutcome>
    where
        I: IntoIterator<Item = &'a FieldEdit>,
    {
        let mut form = self.form.clone();
        for edit in edits {
            form.apply(edit)?;
        }
        Ok(self.submit(form))
    }

    fn sync(&mut self) -> SyncOutcome {
        let outcome = self.store.sync(&self.form);
        match &outcome {
            SyncOutcome::Written => {
                if let Some(preview) = self.preview.as_mut() {
                    *preview = InvoiceView::render(&self.store);
                }
            }
            SyncOutcome::Suppressed(issues) => {
                for issue in issues {
                    warn!(field = issue.field, "{}", issue.message);
                }
            }
        }
        outcome
    }

    /// Write the print layout of the preview. Does nothing before mount.
    pub fn print<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.preview {
            Some(preview) => {
                out.write_all(preview.to_text().as_bytes())?;
                Ok(())
            }
            None => {
                debug!("no invoice preview rendered, print skipped");
                Ok(())
            }
        }
    }

    /// Export the preview into `dir` as `racun-<number>.pdf`. Returns the
    /// written path, or `None` before mount.
    pub fn export_pdf(&self, strategy: &dyn ExportStrategy, dir: &Path) -> Result<Option<PathBuf>> {
        export_to_dir(strategy, self.preview.as_ref(), dir)
    }
}
