use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use crate::error::{GatewayError, Result};
use crate::sanitize::{ColumnTransform, Sanitizer};

use super::FileHandler;

/// Sanitizes CSV exports column by column using the legacy rules' `csvColumns`.
///
/// Redacted columns disappear from the header and every row. Output always
/// uses CRLF record terminators and quotes only where needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvFileHandler;

impl CsvFileHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FileHandler for CsvFileHandler {
    fn handle(&self, reader: &mut dyn Read, sanitizer: &Sanitizer) -> Result<Vec<u8>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader.headers()?.clone();

        let plan: Vec<Option<ColumnTransform>> = headers
            .iter()
            .map(|header| sanitizer.column_transform(header))
            .collect();
        tracing::debug!(
            columns = headers.len(),
            transformed = plan.iter().filter(|t| t.is_some()).count(),
            "sanitizing csv"
        );

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());

        writer.write_record(kept(&headers, &plan).map(|(header, _)| header.trim()))?;

        let mut row = StringRecord::new();
        while reader.read_record(&mut row)? {
            let mut out = StringRecord::with_capacity(row.as_slice().len(), row.len());
            for (cell, transform) in kept(&row, &plan) {
                match transform {
                    Some(ColumnTransform::Pseudonymize { include_original }) => {
                        out.push_field(&sanitizer.sanitize_cell(cell, *include_original)?)
                    }
                    _ => out.push_field(cell),
                }
            }
            writer.write_record(&out)?;
        }

        writer
            .into_inner()
            .map_err(|e| GatewayError::Io(e.into_error()))
    }
}

/// Cells of `record` whose column is not redacted, paired with their transform.
fn kept<'a>(
    record: &'a StringRecord,
    plan: &'a [Option<ColumnTransform>],
) -> impl Iterator<Item = (&'a str, &'a Option<ColumnTransform>)> {
    record
        .iter()
        .zip(plan.iter())
        .filter(|(_, transform)| **transform != Some(ColumnTransform::Redact))
}
