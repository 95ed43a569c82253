pub mod airports;
pub mod airspace;
pub mod runways;

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::SourceError;

/// Rows deserialized from one NASR CSV table.
#[derive(Debug)]
pub struct Table<T> {
    pub rows: Vec<T>,
    /// Records that could not be decoded into `T`.
    pub malformed: usize,
}

/// Read a required CSV table.
///
/// The file must exist, carry every `required` header, and contain at least
/// one data record. Invalid UTF-8 is replaced rather than rejected and short
/// records are padded with empty fields. Records that still fail to decode
/// are counted in `malformed` and skipped.
pub fn read_table<T: DeserializeOwned>(
    path: &Path,
    required: &[&'static str],
) -> Result<Table<T>, SourceError> {
    if !path.is_file() {
        return Err(SourceError::Missing {
            path: path.to_path_buf(),
        });
    }
    let read_err = |source: csv::Error| SourceError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(read_err)?;

    let headers = StringRecord::from_byte_record_lossy(rdr.byte_headers().map_err(read_err)?.clone());
    for &column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(SourceError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = Vec::new();
    let mut malformed = 0usize;
    for (i, result) in rdr.byte_records().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if e.is_io_error() => return Err(read_err(e)),
            Err(e) => {
                debug!("{}: skipping record {}: {}", path.display(), i + 1, e);
                malformed += 1;
                continue;
            }
        };
        // Short rows would otherwise fail with UnexpectedEndOfRow.
        let mut record = StringRecord::from_byte_record_lossy(raw);
        while record.len() < headers.len() {
            record.push_field("");
        }
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                debug!("{}: skipping record {}: {}", path.display(), i + 1, e);
                malformed += 1;
            }
        }
    }

    if rows.is_empty() && malformed == 0 {
        return Err(SourceError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(Table { rows, malformed })
}
