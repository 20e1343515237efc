//! CSV and JSON export of samples.

use crate::error::{Error, Result};
use crate::models::Sample;

/// Render samples as CSV with a header row.
///
/// Columns follow the on-disk table: `id`, `timestamp` and the four
/// measurements.
pub fn to_csv(samples: &[Sample]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if samples.is_empty() {
        writer.write_record(crate::schema::COLUMNS)?;
    }
    for sample in samples {
        writer.serialize(sample)?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Render samples as a JSON array.
///
/// Non-finite measurements serialize as `null`.
pub fn to_json(samples: &[Sample], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(samples)?
    } else {
        serde_json::to_string(samples)?
    };
    Ok(json)
}
