//! File exports: CSV summaries and the JSON configuration envelope.
//!
//! CSV output quotes every field and ends lines with CRLF so spreadsheets on
//! every platform open it unchanged.

use crate::fields::Field;
use crate::filters::{sanitize_with_warnings, FilterSet, FilterWarning};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Write a header row plus data rows as CSV
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Csv(e.to_string()))
}

/// Active filters, one row per criterion
pub fn filters_to_csv(filters: &FilterSet) -> Result<String> {
    let rows: Vec<Vec<String>> = filters
        .iter()
        .map(|(key, value)| vec![key.to_string(), value.display()])
        .collect();
    write_csv(&["filter", "value"], &rows)
}

/// Field list with areas and sync state
pub fn fields_to_csv(fields: &[&Field]) -> Result<String> {
    let rows: Vec<Vec<String>> = fields
        .iter()
        .map(|field| {
            vec![
                field.id.to_string(),
                field.name.clone(),
                format!("{:.2}", field.area.acres),
                format!("{:.2}", field.area.hectares),
                format!("{:.0}", field.area.square_meters),
                field.sync_state.as_str().to_string(),
                field.created_at.to_rfc3339(),
                field.modified_at.to_rfc3339(),
            ]
        })
        .collect();
    write_csv(
        &[
            "id",
            "name",
            "acres",
            "hectares",
            "square_meters",
            "status",
            "created_at",
            "modified_at",
        ],
        &rows,
    )
}

/// Exported filter configuration: `{"filters": …, "timestamp": …}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationEnvelope {
    pub filters: FilterSet,
    pub timestamp: DateTime<Utc>,
}

impl ConfigurationEnvelope {
    pub fn new(filters: FilterSet) -> Self {
        Self {
            filters,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read the filters back out of an exported document.
    ///
    /// The document itself must be JSON with a `filters` member; the filters
    /// are sanitized like any other untrusted input.
    pub fn parse(json: &str) -> Result<(FilterSet, Vec<FilterWarning>)> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        let filters = document
            .get("filters")
            .ok_or_else(|| Error::ParseError("configuration has no filters".to_string()))?;
        Ok(sanitize_with_warnings(filters))
    }
}
