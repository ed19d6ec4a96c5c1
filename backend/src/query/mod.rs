//! Search over student records.
//!
//! A query matches a record when it is a case-insensitive substring of the
//! first name, last name, email, roll number or course, or a plain substring
//! of the phone number.

use crate::models::StudentRecord;

/// Records matching `query`, in their original order. A blank query matches everything.
pub fn filter<'a>(records: &'a [StudentRecord], query: &str) -> Vec<&'a StudentRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || matches(r, &needle))
        .collect()
}

/// Owned variant of [`filter`].
pub fn filter_owned(records: Vec<StudentRecord>, query: &str) -> Vec<StudentRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records;
    }
    records.into_iter().filter(|r| matches(r, &needle)).collect()
}

/// `needle` must already be trimmed and lower-cased.
fn matches(record: &StudentRecord, needle: &str) -> bool {
    [
        &record.first_name,
        &record.last_name,
        &record.email,
        &record.roll_no,
        &record.course,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
        || record.phone.contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentForm;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, first: &str, roll_no: &str, course: &str, phone: &str) -> StudentRecord {
        let form = StudentForm {
            first_name: first.into(),
            last_name: "Rao".into(),
            email: format!("{}@college.edu", first.to_lowercase()),
            phone: phone.into(),
            course: course.into(),
            roll_no: roll_no.into(),
            ..StudentForm::default()
        };
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        StudentRecord::from_form(id, form, at, None)
    }

    fn sample() -> Vec<StudentRecord> {
        vec![
            record("S1", "Asha", "CS101", "B.Tech", "9876543210"),
            record("S2", "Vikram", "ME201", "Mechanical", "9123456780"),
            record("S3", "Meera", "EE301", "CS101 Bridge", "8000000001"),
        ]
    }

    fn ids(found: &[&StudentRecord]) -> Vec<String> {
        found.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_blank_query_returns_all_in_order() {
        let records = sample();
        assert_eq!(ids(&filter(&records, "")), vec!["S1", "S2", "S3"]);
        assert_eq!(ids(&filter(&records, "   ")), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_query_matches_roll_no_and_course_case_insensitively() {
        let records = sample();
        assert_eq!(ids(&filter(&records, "cs101")), vec!["S1", "S3"]);
        assert_eq!(ids(&filter(&records, "  MECH ")), vec!["S2"]);
    }

    #[test]
    fn test_query_matches_names_and_email() {
        let records = sample();
        assert_eq!(ids(&filter(&records, "vik")), vec!["S2"]);
        assert_eq!(ids(&filter(&records, "rao")), vec!["S1", "S2", "S3"]);
        assert_eq!(ids(&filter(&records, "meera@college")), vec!["S3"]);
    }

    #[test]
    fn test_query_matches_phone_substring() {
        let records = sample();
        assert_eq!(ids(&filter(&records, "543")), vec!["S1"]);
        assert_eq!(ids(&filter(&records, "456")), vec!["S2"]);
        assert_eq!(ids(&filter(&records, "0001")), vec!["S3"]);
    }

    #[test]
    fn test_no_match() {
        let records = sample();
        assert!(filter(&records, "zzz").is_empty());
        assert!(filter_owned(records, "zzz").is_empty());
    }

    #[test]
    fn test_filter_owned_agrees_with_filter() {
        let records = sample();
        let borrowed: Vec<StudentRecord> = filter(&records, "cs101").into_iter().cloned().collect();
        assert_eq!(filter_owned(records, "cs101"), borrowed);
    }
}
