//! Per-field validation for the registration form.
//!
//! Every rule is a pure function of one raw value. Rules are independent of
//! each other and of the store; cross-record checks (duplicate roll numbers
//! and emails) live in [`crate::reconcile`].
//!
//! # Example
//!
//! ```rust,ignore
//! use eduregister::validation::{validate_field, Field};
//!
//! assert!(validate_field(Field::Phone, "+91 98765-43210").is_invalid());
//! assert!(validate_field(Field::Phone, "98765 43210").is_valid());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::StudentForm;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("valid mobile pattern"));

// =============================================================================
// Fields
// =============================================================================

/// A validated form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Dob,
    Gender,
    Course,
    Year,
    RollNo,
}

impl Field {
    /// All validated fields, in form order.
    pub const ALL: [Field; 9] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Dob,
        Field::Gender,
        Field::Course,
        Field::Year,
        Field::RollNo,
    ];

    /// The form key for this field.
    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Dob => "dob",
            Field::Gender => "gender",
            Field::Course => "course",
            Field::Year => "year",
            Field::RollNo => "rollNo",
        }
    }

    /// Look up the value of this field in a form.
    pub fn value(self, form: &StudentForm) -> &str {
        match self {
            Field::FirstName => &form.first_name,
            Field::LastName => &form.last_name,
            Field::Email => &form.email,
            Field::Phone => &form.phone,
            Field::Dob => &form.dob,
            Field::Gender => &form.gender,
            Field::Course => &form.course,
            Field::Year => &form.year,
            Field::RollNo => &form.roll_no,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Verdicts
// =============================================================================

/// Outcome of validating one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    fn check(ok: bool, reason: &str) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::Invalid(reason.to_string())
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The human-readable reason, if invalid.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

/// A failing field and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Aggregate result of validating a whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormReport {
    /// Failing fields in form order. Empty when the form is valid.
    pub errors: Vec<FieldError>,
}

impl FormReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` passed.
    pub fn passed(&self, field: Field) -> bool {
        self.errors.iter().all(|e| e.field != field)
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

// =============================================================================
// Rules
// =============================================================================

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Strip the separators people type into phone numbers.
pub fn strip_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '+')
        .collect()
}

/// Validate a single raw value.
pub fn validate_field(field: Field, raw: &str) -> ValidationResult {
    match field {
        Field::FirstName => ValidationResult::check(
            char_len(raw) >= 2,
            "First name must be at least 2 characters.",
        ),
        Field::LastName => ValidationResult::check(
            char_len(raw) >= 2,
            "Last name must be at least 2 characters.",
        ),
        Field::Email => ValidationResult::check(
            EMAIL_RE.is_match(raw.trim()),
            "Please enter a valid email address.",
        ),
        Field::Phone => ValidationResult::check(
            MOBILE_RE.is_match(&strip_phone(raw)),
            "Enter a valid 10-digit mobile number.",
        ),
        Field::Dob => ValidationResult::check(!raw.trim().is_empty(), "Date of birth is required."),
        Field::Gender => ValidationResult::check(!raw.trim().is_empty(), "Please select a gender."),
        Field::Course => ValidationResult::check(!raw.trim().is_empty(), "Please select a course."),
        Field::Year => {
            ValidationResult::check(!raw.trim().is_empty(), "Please select year / semester.")
        }
        Field::RollNo => ValidationResult::check(
            char_len(raw) >= 3,
            "Roll number must be at least 3 characters.",
        ),
    }
}

// =============================================================================
// Option Sets
// =============================================================================

/// Allowed values for the select-style fields.
///
/// An empty list accepts any non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    #[serde(default)]
    pub genders: Vec<String>,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub years: Vec<String>,
}

impl FieldOptions {
    fn allowed(&self, field: Field) -> &[String] {
        match field {
            Field::Gender => &self.genders,
            Field::Course => &self.courses,
            Field::Year => &self.years,
            _ => &[],
        }
    }
}

/// Validates whole forms against the field rules and option sets.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: FieldOptions,
}

impl Validator {
    pub fn new(options: FieldOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Validate one field, including option-set membership.
    pub fn check(&self, field: Field, raw: &str) -> ValidationResult {
        let verdict = validate_field(field, raw);
        if verdict.is_invalid() {
            return verdict;
        }

        let allowed = self.options.allowed(field);
        if allowed.is_empty() || allowed.iter().any(|opt| opt == raw.trim()) {
            verdict
        } else {
            // Same wording as the empty case: the value is not a selectable option.
            validate_field(field, "")
        }
    }

    /// Validate every field of `form`, reporting all failures at once.
    pub fn validate_form(&self, form: &StudentForm) -> FormReport {
        let errors = Field::ALL
            .iter()
            .filter_map(|&field| match self.check(field, field.value(form)) {
                ValidationResult::Valid => None,
                ValidationResult::Invalid(message) => Some(FieldError { field, message }),
            })
            .collect();

        FormReport { errors }
    }
}

/// Validate a form with permissive option sets.
pub fn validate_form(form: &StudentForm) -> FormReport {
    Validator::default().validate_form(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> StudentForm {
        StudentForm {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            dob: "2004-05-01".into(),
            gender: "Female".into(),
            course: "B.Tech".into(),
            year: "1st Year".into(),
            roll_no: "CS101".into(),
            ..StudentForm::default()
        }
    }

    #[test]
    fn test_name_length_counts_trimmed_chars() {
        assert!(validate_field(Field::FirstName, "Al").is_valid());
        assert!(validate_field(Field::FirstName, "  A  ").is_invalid());
        assert!(validate_field(Field::LastName, "Łu").is_valid());
        assert_eq!(
            validate_field(Field::LastName, "x").reason(),
            Some("Last name must be at least 2 characters.")
        );
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_field(Field::Email, "a@x.com").is_valid());
        assert!(validate_field(Field::Email, "  a@x.com ").is_valid());
        assert!(validate_field(Field::Email, "a@x").is_invalid());
        assert!(validate_field(Field::Email, "a b@x.com").is_invalid());
        assert!(validate_field(Field::Email, "a@@x.com").is_invalid());
        assert_eq!(
            validate_field(Field::Email, "nope").reason(),
            Some("Please enter a valid email address.")
        );
    }

    #[test]
    fn test_phone_strips_separators() {
        assert!(validate_field(Field::Phone, "98765 43210").is_valid());
        assert!(validate_field(Field::Phone, "98765-43210").is_valid());
        assert!(validate_field(Field::Phone, "+9876543210").is_valid());
        assert!(validate_field(Field::Phone, "5876543210").is_invalid());
        assert!(validate_field(Field::Phone, "987654321").is_invalid());
        // Country code leaves eleven digits
        assert!(validate_field(Field::Phone, "+91 9876543210").is_invalid());
        assert_eq!(
            validate_field(Field::Phone, "").reason(),
            Some("Enter a valid 10-digit mobile number.")
        );
    }

    #[test]
    fn test_required_selects() {
        assert_eq!(validate_field(Field::Dob, "").reason(), Some("Date of birth is required."));
        assert_eq!(validate_field(Field::Gender, " ").reason(), Some("Please select a gender."));
        assert_eq!(validate_field(Field::Course, "").reason(), Some("Please select a course."));
        assert_eq!(
            validate_field(Field::Year, "").reason(),
            Some("Please select year / semester.")
        );
        assert!(validate_field(Field::Year, "2nd Year").is_valid());
    }

    #[test]
    fn test_roll_no_length() {
        assert!(validate_field(Field::RollNo, "CS1").is_valid());
        assert_eq!(
            validate_field(Field::RollNo, " C1 ").reason(),
            Some("Roll number must be at least 3 characters.")
        );
    }

    #[test]
    fn test_valid_form_passes() {
        let report = validate_form(&valid_form());
        assert!(report.is_valid());
        assert!(Field::ALL.iter().all(|&f| report.passed(f)));
    }

    #[test]
    fn test_form_reports_every_failure_in_order() {
        let mut form = valid_form();
        form.first_name = "A".into();
        form.phone = "12345".into();
        form.roll_no = "".into();

        let report = validate_form(&form);
        assert!(!report.is_valid());
        let fields: Vec<Field> = report.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::FirstName, Field::Phone, Field::RollNo]);
        assert!(report.passed(Field::Email));
        assert!(!report.passed(Field::Phone));
    }

    #[test]
    fn test_option_sets_restrict_selects() {
        let validator = Validator::new(FieldOptions {
            genders: vec!["Male".into(), "Female".into(), "Other".into()],
            courses: vec![],
            years: vec!["1st Year".into()],
        });

        assert!(validator.check(Field::Gender, "Female").is_valid());
        assert_eq!(
            validator.check(Field::Gender, "Unknown").reason(),
            Some("Please select a gender.")
        );
        // Empty list stays permissive
        assert!(validator.check(Field::Course, "Anything").is_valid());
        assert!(validator.check(Field::Year, "3rd Year").is_invalid());
    }

    #[test]
    fn test_field_names_match_form_keys() {
        assert_eq!(Field::RollNo.name(), "rollNo");
        assert_eq!(serde_json::to_value(Field::FirstName).unwrap(), "firstName");
        assert_eq!(Field::Dob.to_string(), "dob");
    }
}
