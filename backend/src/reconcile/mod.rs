//! Record Reconciler - Turn a validated form into the record to persist
//!
//! Decides create vs update, enforces roll-number and email uniqueness
//! against the store, and stamps provenance:
//!
//! ```text
//! edit target resolves?  ──yes──▶  update: same id, registeredOn kept, updatedOn = now
//!          │
//!          no
//!          ▼
//!        create: fresh id, registeredOn = now, updatedOn absent
//! ```
//!
//! Roll-number conflicts are reported before email conflicts. The reconciler
//! works on a snapshot the caller loaded once and never touches storage;
//! the caller applies the returned record to the snapshot and saves it.

pub mod clock;

use tracing::debug;

use crate::error::Rejection;
use crate::models::{StudentForm, StudentRecord};

pub use clock::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, TimestampIds};

/// Whether a reconciled record is new or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

/// A record ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub record: StudentRecord,
    pub kind: WriteKind,
}

/// Reconciles submissions using an injected clock and id generator.
pub struct Reconciler<C, G> {
    clock: C,
    ids: G,
}

impl Reconciler<SystemClock, TimestampIds> {
    /// Wall clock and `S<millis><nnn>` ids.
    pub fn system() -> Self {
        Self::new(SystemClock, TimestampIds)
    }
}

impl<C: Clock, G: IdGenerator> Reconciler<C, G> {
    pub fn new(clock: C, ids: G) -> Self {
        Self { clock, ids }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Build the record for `payload` against `records`, or say why it
    /// cannot be stored.
    ///
    /// `payload` is expected to have passed field validation.
    pub fn reconcile(
        &mut self,
        payload: StudentForm,
        edit_id: Option<&str>,
        records: &[StudentRecord],
    ) -> Result<Reconciled, Rejection> {
        let existing = edit_id.and_then(|id| records.iter().find(|r| r.id == id));

        if find_other(records, edit_id, |r| same_text(&r.roll_no, &payload.roll_no)).is_some() {
            debug!(roll_no = %payload.roll_no, "duplicate roll number");
            return Err(Rejection::DuplicateRollNo);
        }
        if find_other(records, edit_id, |r| same_text(&r.email, &payload.email)).is_some() {
            debug!(email = %payload.email, "duplicate email");
            return Err(Rejection::DuplicateEmail);
        }

        let now = self.clock.now();
        let reconciled = match existing {
            Some(prior) => Reconciled {
                record: StudentRecord::from_form(
                    prior.id.clone(),
                    payload,
                    prior.registered_on,
                    Some(now),
                ),
                kind: WriteKind::Update,
            },
            None => {
                let id = self.fresh_id(records);
                Reconciled {
                    record: StudentRecord::from_form(id, payload, now, None),
                    kind: WriteKind::Create,
                }
            }
        };

        Ok(reconciled)
    }

    fn fresh_id(&mut self, records: &[StudentRecord]) -> String {
        loop {
            let id = self.ids.next_id(&self.clock);
            if !records.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }
}

impl Reconciled {
    /// Apply this record to `records`: append a new one, or replace the
    /// record with the same id where it stands.
    pub fn apply_to(&self, records: &mut Vec<StudentRecord>) {
        match records.iter_mut().find(|r| r.id == self.record.id) {
            Some(slot) if self.kind == WriteKind::Update => *slot = self.record.clone(),
            _ => records.push(self.record.clone()),
        }
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// First record matching `pred`, skipping the record being edited.
fn find_other<'a>(
    records: &'a [StudentRecord],
    excluding_id: Option<&str>,
    pred: impl Fn(&StudentRecord) -> bool,
) -> Option<&'a StudentRecord> {
    records
        .iter()
        .find(|r| Some(r.id.as_str()) != excluding_id && pred(r))
}
