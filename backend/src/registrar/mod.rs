//! Registrar - One entry point per user action
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌─────────┐
//! │   Form   │──▶│ Validator │──▶│ Reconciler │──▶│  Store  │
//! └──────────┘   └───────────┘   └────────────┘   └─────────┘
//! ```
//!
//! Each action returns a value or a [`RegistrarError`] and posts exactly one
//! [`Notice`] describing what happened. Storage failures are reported, never
//! panicked on.

use tracing::{debug, info};

use crate::error::{Rejection, RegistrarError, RegistrarResult, StoreError};
use crate::export::{export, export_file_name, CsvQuoting};
use crate::models::{StudentForm, StudentRecord};
use crate::notice::{Notice, NoticeBoard};
use crate::query::filter_owned;
use crate::reconcile::{
    Clock, IdGenerator, Reconciled, Reconciler, SystemClock, TimestampIds, WriteKind,
};
use crate::store::RecordStore;
use crate::validation::{FieldOptions, Validator};

/// A CSV export ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// `students_<YYYY-MM-DD>.csv`
    pub file_name: String,
    pub content: String,
    pub count: usize,
}

/// Runs registration actions against a store.
pub struct Registrar<C = SystemClock, G = TimestampIds> {
    store: RecordStore,
    validator: Validator,
    reconciler: Reconciler<C, G>,
    notices: NoticeBoard,
}

impl Registrar {
    /// Wall clock, generated ids, permissive option sets, global notice board.
    pub fn new(store: RecordStore) -> Self {
        Self::with_parts(
            store,
            Validator::default(),
            Reconciler::system(),
            (*crate::notice::NOTICES).clone(),
        )
    }
}

impl<C: Clock, G: IdGenerator> Registrar<C, G> {
    pub fn with_parts(
        store: RecordStore,
        validator: Validator,
        reconciler: Reconciler<C, G>,
        notices: NoticeBoard,
    ) -> Self {
        Self {
            store,
            validator,
            reconciler,
            notices,
        }
    }

    /// Replace the option sets used for gender, course and year.
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.validator = Validator::new(options);
        self
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Number of stored records.
    pub fn count(&self) -> RegistrarResult<usize> {
        Ok(self.store.count()?)
    }

    /// Records matching `query`, in store order. An unreadable store lists
    /// as empty.
    pub fn list(&self, query: &str) -> Vec<StudentRecord> {
        filter_owned(self.store.load_all(), query)
    }

    /// One record, for the detail view.
    pub fn get(&self, id: &str) -> RegistrarResult<StudentRecord> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| RegistrarError::NotFound(id.to_string()))
    }

    /// An empty form with today's admission date.
    pub fn blank_form(&self) -> StudentForm {
        StudentForm::blank(self.reconciler.clock().now().date_naive())
    }

    /// A form prefilled from record `id`, for editing.
    pub fn edit_form(&self, id: &str) -> RegistrarResult<StudentForm> {
        let record = self.get(id)?;
        self.notices.post(Notice::info("Editing student record…"));
        Ok(StudentForm::from_record(&record))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Validate, reconcile and persist a submitted form.
    ///
    /// With `edit_id` naming an existing record the record is updated in
    /// place; otherwise a new record is created. The collection is read once,
    /// checked and changed in memory, then written once.
    pub fn submit(
        &mut self,
        form: StudentForm,
        edit_id: Option<&str>,
    ) -> RegistrarResult<Reconciled> {
        let form = form.normalized();
        let edit_id = edit_id.map(str::trim).filter(|id| !id.is_empty());

        let report = self.validator.validate_form(&form);
        if !report.is_valid() {
            debug!(errors = report.errors.len(), "form failed validation");
            return Err(self.reject(Rejection::FieldInvalid(report.into_errors())));
        }

        let mut records = self
            .store
            .try_load_all()
            .map_err(|e| self.storage_failure("Could not save student record", e))?;

        let reconciled = match self.reconciler.reconcile(form, edit_id, &records) {
            Ok(r) => r,
            Err(rejection) => return Err(self.reject(rejection)),
        };

        reconciled.apply_to(&mut records);
        self.store
            .save_all(&records)
            .map_err(|e| self.storage_failure("Could not save student record", e))?;

        let message = match reconciled.kind {
            WriteKind::Create => "Student registered successfully!",
            WriteKind::Update => "Student record updated successfully!",
        };
        info!(id = %reconciled.record.id, kind = ?reconciled.kind, "record saved");
        self.notices.post(Notice::success(message));

        Ok(reconciled)
    }

    fn storage_failure(&self, context: &str, e: StoreError) -> RegistrarError {
        self.notices.post(Notice::error(format!("{}: {}", context, e)));
        e.into()
    }

    fn reject(&self, rejection: Rejection) -> RegistrarError {
        self.notices.post(Notice::error(rejection.summary()));
        rejection.into()
    }

    /// Delete one record.
    pub fn delete(&mut self, id: &str) -> RegistrarResult<()> {
        match self.store.delete_by_id(id) {
            Ok(true) => {
                self.notices.post(Notice::success("Student deleted successfully."));
                Ok(())
            }
            Ok(false) => {
                self.notices.post(Notice::warning("Student record not found."));
                Err(RegistrarError::NotFound(id.to_string()))
            }
            Err(e) => Err(self.storage_failure("Could not delete student record", e)),
        }
    }

    /// Delete every record. Returns how many were removed.
    pub fn clear(&mut self) -> RegistrarResult<usize> {
        let count = self
            .store
            .count()
            .map_err(|e| self.storage_failure("Could not clear records", e))?;
        if count == 0 {
            self.notices.post(Notice::info("Database is already empty."));
            return Ok(0);
        }

        self.store
            .clear()
            .map_err(|e| self.storage_failure("Could not clear records", e))?;

        self.notices.post(Notice::success("All records cleared."));
        Ok(count)
    }

    /// Export every record (search does not apply). `None` when the store is empty.
    pub fn export(&self, quoting: CsvQuoting) -> RegistrarResult<Option<CsvExport>> {
        let records = self
            .store
            .try_load_all()
            .map_err(|e| self.storage_failure("Export failed", e))?;
        if records.is_empty() {
            self.notices.post(Notice::info("No data to export."));
            return Ok(None);
        }

        let content = export(&records, quoting).map_err(|e| {
            self.notices.post(Notice::error(format!("Export failed: {}", e)));
            RegistrarError::Export(e.to_string())
        })?;

        let count = records.len();
        self.notices
            .post(Notice::success(format!("Exported {} record(s) to CSV.", count)));

        Ok(Some(CsvExport {
            file_name: export_file_name(self.reconciler.clock().now().date_naive()),
            content,
            count,
        }))
    }
}
