//! CSV export of the full record set.
//!
//! Columns are fixed:
//!
//! ```text
//! ID,First Name,Last Name,Roll No,Email,Phone,DOB,Gender,Course,Year,
//! Admission Date,Address,Guardian Name,Guardian Phone,Registered On
//! ```
//!
//! `updatedOn` is not exported. Rows are joined with `\n` with no trailing
//! newline.
//!
//! In [`CsvQuoting::Compatible`] mode only the address is quoted (always, with
//! inner quotes doubled); every other value is written as-is, so a comma in a
//! name shifts the row. [`CsvQuoting::Uniform`] quotes every field.

use chrono::{NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::models::StudentRecord;

/// Header row, in column order.
pub const HEADERS: [&str; 15] = [
    "ID",
    "First Name",
    "Last Name",
    "Roll No",
    "Email",
    "Phone",
    "DOB",
    "Gender",
    "Course",
    "Year",
    "Admission Date",
    "Address",
    "Guardian Name",
    "Guardian Phone",
    "Registered On",
];

const ADDRESS_COL: usize = 11;

/// Content type for exported files.
pub const CSV_MIME: &str = "text/csv;charset=utf-8";

/// How fields are quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvQuoting {
    /// Quote only the address column.
    #[default]
    Compatible,
    /// Quote every field.
    Uniform,
}

/// `students_<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("students_{}.csv", date.format("%Y-%m-%d"))
}

fn row(record: &StudentRecord) -> [String; 15] {
    [
        record.id.clone(),
        record.first_name.clone(),
        record.last_name.clone(),
        record.roll_no.clone(),
        record.email.clone(),
        record.phone.clone(),
        record.dob.clone(),
        record.gender.clone(),
        record.course.clone(),
        record.year.clone(),
        record.admission_date.clone(),
        record.address.clone(),
        record.guardian_name.clone(),
        record.guardian_phone.clone(),
        record.registered_on.to_rfc3339_opts(SecondsFormat::Millis, true),
    ]
}

/// Serialize `records` in compatible mode.
pub fn to_csv(records: &[StudentRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADERS.join(","));

    for record in records {
        let mut fields = row(record);
        fields[ADDRESS_COL] = format!("\"{}\"", fields[ADDRESS_COL].replace('"', "\"\""));
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Serialize `records` with every field quoted.
pub fn to_csv_uniform(records: &[StudentRecord]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(row(record))?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        let io = std::io::Error::new(e.error().kind(), e.error().to_string());
        csv::Error::from(io)
    })?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Serialize `records` with the chosen quoting.
pub fn export(records: &[StudentRecord], quoting: CsvQuoting) -> Result<String, csv::Error> {
    match quoting {
        CsvQuoting::Compatible => Ok(to_csv(records)),
        CsvQuoting::Uniform => to_csv_uniform(records),
    }
}
