//! Contact lists exported from spreadsheets.
//!
//! The header row must carry a `name` column and a `phone` (or `number`)
//! column, matched case-insensitively. Every other column becomes a contact
//! field addressable as `{column}` from a template.

use crate::error::{ImportError, Result};
use ::csv::{ReaderBuilder, StringRecord, Trim};
use missive_core::domain::{is_placeholder_identifier, is_reserved_field, ContactFields};
use serde::Serialize;
use std::path::Path;

const NAME_HEADERS: [&str; 1] = ["name"];
const PHONE_HEADERS: [&str; 2] = ["phone", "number"];
const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvContact {
    pub name: String,
    pub phone: String,
    pub fields: ContactFields,
}

#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub contacts: Vec<CsvContact>,
    pub warnings: Vec<String>,
    pub skipped: usize,
}

pub fn ensure_csv_path(path: &Path) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(ImportError::UnsupportedFile(path.display().to_string()));
    }
    Ok(())
}

pub fn parse_contacts_csv(data: &str) -> Result<ParsedCsv> {
    let data = data.strip_prefix(BOM).unwrap_or(data);
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(data.as_bytes());

    let headers = reader.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut warnings = layout.warnings.clone();
    let mut contacts = Vec::new();
    let mut skipped = 0;

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = index + 2;
        match layout.contact_from_record(&record) {
            Some(contact) => contacts.push(contact),
            None => {
                skipped += 1;
                warnings.push(format!("line {line}: missing name or phone, skipped"));
            }
        }
    }

    Ok(ParsedCsv {
        contacts,
        warnings,
        skipped,
    })
}

struct ColumnLayout {
    name: usize,
    phone: usize,
    fields: Vec<(usize, String)>,
    warnings: Vec<String>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let name = find_column(headers, &NAME_HEADERS).ok_or(ImportError::MissingColumn("name"))?;
        let phone =
            find_column(headers, &PHONE_HEADERS).ok_or(ImportError::MissingColumn("phone"))?;

        let mut fields: Vec<(usize, String)> = Vec::new();
        let mut warnings = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            if index == name || index == phone || is_reserved_field(header) {
                continue;
            }
            if header.is_empty() {
                warnings.push(format!("column {}: empty header, ignored", index + 1));
                continue;
            }
            if fields.iter().any(|(_, existing)| existing == header) {
                warnings.push(format!("column {header}: duplicate header, ignored"));
                continue;
            }
            if !is_placeholder_identifier(header) {
                warnings.push(format!(
                    "column {header}: not usable as a placeholder (letters, digits, _ only)"
                ));
            }
            fields.push((index, header.to_string()));
        }

        Ok(Self {
            name,
            phone,
            fields,
            warnings,
        })
    }

    fn contact_from_record(&self, record: &StringRecord) -> Option<CsvContact> {
        let name = record.get(self.name).map(str::trim).unwrap_or_default();
        let phone = record.get(self.phone).map(str::trim).unwrap_or_default();
        if name.is_empty() || phone.is_empty() {
            return None;
        }

        let fields = self
            .fields
            .iter()
            .filter_map(|(index, header)| {
                record
                    .get(*index)
                    .map(|value| (header.clone(), value.to_string()))
            })
            .collect();

        Some(CsvContact {
            name: name.to_string(),
            phone: phone.to_string(),
            fields,
        })
    }
}

fn find_column(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(candidate))
    })
}

#[cfg(test)]
mod tests {
    use super::{ensure_csv_path, parse_contacts_csv};
    use crate::error::ImportError;
    use std::path::Path;

    #[test]
    fn parse_sample_contact_list() {
        let data = "name,phone,company\nJohn Doe,+1234567890,Acme Corp\nJane Smith,+0987654321,Tech Inc\n";
        let parsed = parse_contacts_csv(data).expect("parse");
        assert_eq!(parsed.contacts.len(), 2);
        assert_eq!(parsed.skipped, 0);
        assert!(parsed.warnings.is_empty());

        let john = &parsed.contacts[0];
        assert_eq!(john.name, "John Doe");
        assert_eq!(john.phone, "+1234567890");
        assert_eq!(john.fields.get("company").map(String::as_str), Some("Acme Corp"));
        assert!(!john.fields.contains_key("name"));
    }

    #[test]
    fn parse_matches_headers_case_insensitively() {
        let data = "\u{feff}NAME , Number,City\nAnn,555,Pune\n";
        let parsed = parse_contacts_csv(data).expect("parse");
        assert_eq!(parsed.contacts.len(), 1);
        assert_eq!(parsed.contacts[0].phone, "555");
        assert_eq!(
            parsed.contacts[0].fields.get("City").map(String::as_str),
            Some("Pune")
        );
    }

    #[test]
    fn parse_prefers_phone_over_number_and_drops_both_from_fields() {
        let data = "name,number,phone\nAnn,111,222\n";
        let parsed = parse_contacts_csv(data).expect("parse");
        assert_eq!(parsed.contacts[0].phone, "222");
        assert!(parsed.contacts[0].fields.is_empty());
    }

    #[test]
    fn parse_skips_rows_without_name_or_phone() {
        let data = "name,phone\nAnn,\n,123\n  ,  \nBob,456\n";
        let parsed = parse_contacts_csv(data).expect("parse");
        assert_eq!(parsed.contacts.len(), 1);
        assert_eq!(parsed.contacts[0].name, "Bob");
        assert_eq!(parsed.skipped, 3);
        assert_eq!(parsed.warnings[0], "line 2: missing name or phone, skipped");
    }

    #[test]
    fn parse_tolerates_short_rows() {
        let data = "name,phone,company,city\nAnn,123,Acme\n";
        let parsed = parse_contacts_csv(data).expect("parse");
        let fields = &parsed.contacts[0].fields;
        assert_eq!(fields.get("company").map(String::as_str), Some("Acme"));
        assert!(!fields.contains_key("city"));
    }

    #[test]
    fn parse_warns_about_unusable_headers() {
        let data = "name,phone,first name,,company,company\nAnn,1,A,x,B,C\n";
        let parsed = parse_contacts_csv(data).expect("parse");
        assert_eq!(parsed.warnings.len(), 3);
        let fields = &parsed.contacts[0].fields;
        assert_eq!(fields.get("first name").map(String::as_str), Some("A"));
        assert_eq!(fields.get("company").map(String::as_str), Some("B"));
    }

    #[test]
    fn parse_requires_name_and_phone_columns() {
        let err = parse_contacts_csv("phone,company\n1,Acme\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("name")));
        let err = parse_contacts_csv("name,company\nAnn,Acme\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("phone")));
    }

    #[test]
    fn ensure_csv_path_checks_extension() {
        assert!(ensure_csv_path(Path::new("contacts.csv")).is_ok());
        assert!(ensure_csv_path(Path::new("CONTACTS.CSV")).is_ok());
        assert!(ensure_csv_path(Path::new("contacts.xlsx")).is_err());
        assert!(ensure_csv_path(Path::new("contacts")).is_err());
    }
}
