//! Domain models for student registration.
//!
//! - [`StudentRecord`] - A persisted registration, as stored and exported
//! - [`StudentForm`] - The typed form payload submitted for create or update
//!
//! Both serialize with camelCase keys so the stored JSON keeps the
//! `firstName` / `rollNo` / `registeredOn` shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Student Record
// =============================================================================

/// A registered student.
///
/// `id` and `registered_on` never change once assigned. `updated_on` is
/// `None` until the first edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Opaque identifier, unique within the store.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique within the store, compared case-insensitively.
    pub email: String,
    pub phone: String,
    /// Date of birth (`YYYY-MM-DD`).
    pub dob: String,
    pub gender: String,
    pub course: String,
    /// Year / semester label.
    pub year: String,
    /// Unique within the store, compared case-insensitively.
    pub roll_no: String,
    #[serde(default)]
    pub admission_date: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub guardian_name: String,
    #[serde(default)]
    pub guardian_phone: String,
    /// Creation time.
    pub registered_on: DateTime<Utc>,
    /// Last edit time, absent for never-edited records.
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

impl StudentRecord {
    /// Build a record from a form payload and its provenance.
    pub fn from_form(
        id: impl Into<String>,
        form: StudentForm,
        registered_on: DateTime<Utc>,
        updated_on: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            dob: form.dob,
            gender: form.gender,
            course: form.course,
            year: form.year,
            roll_no: form.roll_no,
            admission_date: form.admission_date,
            address: form.address,
            guardian_name: form.guardian_name,
            guardian_phone: form.guardian_phone,
            registered_on,
            updated_on,
        }
    }

    /// "First Last", as shown in listings and detail titles.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Form Payload
// =============================================================================

/// Field values submitted from the registration form.
///
/// Missing keys deserialize as empty strings; validation decides whether
/// that is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: String,
    pub course: String,
    pub year: String,
    pub roll_no: String,
    pub admission_date: String,
    pub address: String,
    pub guardian_name: String,
    pub guardian_phone: String,
}

impl StudentForm {
    /// An empty form whose admission date defaults to `today`.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            admission_date: today.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    /// Prefill a form from an existing record, for editing.
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            dob: record.dob.clone(),
            gender: record.gender.clone(),
            course: record.course.clone(),
            year: record.year.clone(),
            roll_no: record.roll_no.clone(),
            admission_date: record.admission_date.clone(),
            address: record.address.clone(),
            guardian_name: record.guardian_name.clone(),
            guardian_phone: record.guardian_phone.clone(),
        }
    }

    /// Trim every value, the way the form hands values to the core.
    pub fn normalized(self) -> Self {
        fn t(s: String) -> String {
            s.trim().to_string()
        }

        Self {
            first_name: t(self.first_name),
            last_name: t(self.last_name),
            email: t(self.email),
            phone: t(self.phone),
            dob: t(self.dob),
            gender: t(self.gender),
            course: t(self.course),
            year: t(self.year),
            roll_no: t(self.roll_no),
            admission_date: t(self.admission_date),
            address: t(self.address),
            guardian_name: t(self.guardian_name),
            guardian_phone: t(self.guardian_phone),
        }
    }
}
