//! Spreadsheet import: parse an uploaded delimited file, auto-detect
//! which columns hold phone/name/email, and finalize the rows into
//! imported leads once the user has confirmed the mapping.

use std::collections::HashMap;
use std::io::Read;

use propreach_core::types::ImportedLead;
use propreach_core::{ReachError, ReachResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A parsed upload: first row as headers, every following row keyed by
/// header name. All cell values are strings; missing cells become empty
/// strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSheet {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl ImportSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Which spreadsheet column feeds which lead field. Auto-detected from
/// the headers, user-correctable before the import is finalized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMapping {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

// Header tokens recognized per field. Arabic sheets are common for this
// market, so the phone/name/email lists carry Arabic tokens too.
const PHONE_TOKENS: [&str; 6] = ["phone", "mobile", "whatsapp", "tel", "رقم", "هاتف"];
const NAME_TOKENS: [&str; 2] = ["name", "اسم"];
const EMAIL_TOKENS: [&str; 3] = ["email", "mail", "بريد"];

impl ColumnMapping {
    /// Case-insensitive substring match of each field's token list over
    /// the headers, in header order; the first matching header wins. A
    /// field with no matching header is left unset.
    pub fn detect(headers: &[String]) -> Self {
        Self {
            phone: find_column(headers, &PHONE_TOKENS),
            name: find_column(headers, &NAME_TOKENS),
            email: find_column(headers, &EMAIL_TOKENS),
        }
    }
}

fn find_column(headers: &[String], tokens: &[&str]) -> Option<String> {
    headers
        .iter()
        .find(|header| {
            let lowered = header.to_lowercase();
            tokens.iter().any(|token| lowered.contains(token))
        })
        .cloned()
}

/// Parses a delimited upload into an [`ImportSheet`]. The first row is
/// taken as headers; a sheet with zero data rows is an import error.
pub fn parse_sheet<R: Read>(reader: R) -> ReachResult<ImportSheet> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| ReachError::Import(format!("Could not read the file: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record =
            record.map_err(|e| ReachError::Import(format!("Could not read the file: {e}")))?;
        let row: HashMap<String, String> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ReachError::Import(
            "The uploaded file contains no data rows.".to_string(),
        ));
    }

    debug!(rows = rows.len(), columns = headers.len(), "parsed import sheet");
    Ok(ImportSheet { headers, rows })
}

/// Applies the confirmed mapping to the sheet. The phone mapping is
/// required; each row's phone value is trimmed and rows left without one
/// are dropped. An empty result is an import error.
pub fn finalize(sheet: &ImportSheet, mapping: &ColumnMapping) -> ReachResult<Vec<ImportedLead>> {
    let phone_column = mapping.phone.as_deref().ok_or_else(|| {
        ReachError::Import("Map the phone column before importing.".to_string())
    })?;

    let get_field = |row: &HashMap<String, String>, column: &Option<String>| -> Option<String> {
        column
            .as_deref()
            .and_then(|c| row.get(c))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut imported = Vec::new();
    for row in &sheet.rows {
        let phone = row.get(phone_column).map(|v| v.trim()).unwrap_or("");
        if phone.is_empty() {
            continue;
        }
        imported.push(ImportedLead {
            phone: phone.to_string(),
            name: get_field(row, &mapping.name),
            email: get_field(row, &mapping.email),
        });
    }

    if imported.is_empty() {
        return Err(ReachError::Import(
            "No rows with a phone number were found.".to_string(),
        ));
    }
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> ImportSheet {
        parse_sheet(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_detect_maps_common_english_headers() {
        let sheet = parse("Full Name,Phone Number,Email\nJane Doe,+1 555 0100,jane@x.com\n");
        let mapping = ColumnMapping::detect(&sheet.headers);
        assert_eq!(mapping.name.as_deref(), Some("Full Name"));
        assert_eq!(mapping.phone.as_deref(), Some("Phone Number"));
        assert_eq!(mapping.email.as_deref(), Some("Email"));

        let imported = finalize(&sheet, &mapping).unwrap();
        assert_eq!(
            imported,
            vec![ImportedLead {
                phone: "+1 555 0100".into(),
                name: Some("Jane Doe".into()),
                email: Some("jane@x.com".into()),
            }]
        );
    }

    #[test]
    fn test_detect_recognizes_arabic_headers() {
        let sheet = parse("الاسم,رقم الهاتف\nليلى,+971501234567\n");
        let mapping = ColumnMapping::detect(&sheet.headers);
        assert_eq!(mapping.name.as_deref(), Some("الاسم"));
        assert_eq!(mapping.phone.as_deref(), Some("رقم الهاتف"));
        assert_eq!(mapping.email, None);
    }

    #[test]
    fn test_detect_first_matching_header_wins() {
        let sheet = parse("Mobile,WhatsApp,Tel\n1,2,3\n");
        let mapping = ColumnMapping::detect(&sheet.headers);
        assert_eq!(mapping.phone.as_deref(), Some("Mobile"));
    }

    #[test]
    fn test_parse_rejects_headers_only() {
        let err = parse_sheet("Name,Phone\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ReachError::Import(_)));
    }

    #[test]
    fn test_short_rows_become_empty_cells() {
        let sheet = parse("Name,Phone,Email\nJane,+15550100\n");
        assert_eq!(sheet.rows[0]["Email"], "");
    }

    #[test]
    fn test_finalize_requires_phone_mapping() {
        let sheet = parse("Full Name,Email\nJane Doe,jane@x.com\n");
        let mapping = ColumnMapping::detect(&sheet.headers);
        assert_eq!(mapping.phone, None);

        let err = finalize(&sheet, &mapping).unwrap_err();
        assert!(err.to_string().contains("phone column"));
    }

    #[test]
    fn test_finalize_trims_phones_and_drops_empty_rows() {
        let sheet = parse("Name,Phone\nA,  +971501111111  \nB,\nC,   \n");
        let mapping = ColumnMapping::detect(&sheet.headers);

        let imported = finalize(&sheet, &mapping).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].phone, "+971501111111");
        assert_eq!(imported[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn test_finalize_rejects_when_no_row_has_a_phone() {
        let sheet = parse("Name,Phone\nA,\nB,  \n");
        let mapping = ColumnMapping::detect(&sheet.headers);

        let err = finalize(&sheet, &mapping).unwrap_err();
        assert!(matches!(err, ReachError::Import(_)));
    }

    #[test]
    fn test_user_override_replaces_detection() {
        let sheet = parse("Contact,Line2\nJane,+15550100\n");
        let mut mapping = ColumnMapping::detect(&sheet.headers);
        assert_eq!(mapping.phone, None);

        mapping.phone = Some("Line2".to_string());
        mapping.name = Some("Contact".to_string());
        let imported = finalize(&sheet, &mapping).unwrap();
        assert_eq!(imported[0].phone, "+15550100");
        assert_eq!(imported[0].name.as_deref(), Some("Jane"));
    }
}
