//! Reader for per-edge hourly vehicle-count tables.
//!
//! The input is `;`-delimited with an `edge_id` column, a `data` date column
//! and one column per hourly bucket (`"HH:00-HH:00"`). Any other column is
//! carried along untouched.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{ModelError, Result};

pub const EDGE_ID_COLUMN: &str = "edge_id";
pub const DATE_COLUMN: &str = "data";

/// Keeps only the rows whose date column contains the filter text.
///
/// The filter has to name a real calendar prefix: `YYYY`, `YYYY-MM` or
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter(String);

impl DateFilter {
    pub fn matches(&self, date: &str) -> bool {
        date.contains(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DateFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let padded = match s.len() {
            4 => format!("{s}-01-01"),
            7 => format!("{s}-01"),
            10 => s.to_string(),
            _ => String::new(),
        };
        NaiveDate::parse_from_str(&padded, "%Y-%m-%d").map_err(|_| {
            ModelError::data(format!(
                "malformed date filter '{s}', expected YYYY, YYYY-MM or YYYY-MM-DD"
            ))
        })?;
        Ok(DateFilter(s.to_string()))
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the measurement table.
#[derive(Debug, Clone, Default)]
pub struct MeasurementRow {
    pub edge_id: String,
    pub date: String,
    columns: HashMap<String, String>,
}

impl MeasurementRow {
    pub fn new(edge_id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            edge_id: edge_id.into(),
            date: date.into(),
            columns: HashMap::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.insert(name.into(), value.into());
        self
    }

    /// Raw text of a column, if the row has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Vehicle count stored in an hourly bucket column.
    ///
    /// Integral floats such as `"42.0"` are accepted since spreadsheet exports
    /// tend to produce them.
    pub fn count(&self, column: &str) -> Result<u64> {
        let raw = self
            .get(column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ModelError::data(format!(
                    "edge '{}' ({}) has no value for time slot column '{column}'",
                    self.edge_id, self.date
                ))
            })?;

        if let Ok(n) = raw.parse::<u64>() {
            return Ok(n);
        }
        match raw.parse::<f64>() {
            Ok(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(f as u64),
            _ => Err(ModelError::data(format!(
                "edge '{}' ({}) has non-integer count '{raw}' in column '{column}'",
                self.edge_id, self.date
            ))),
        }
    }
}

/// Parses a measurement table, keeping the rows accepted by `filter`.
pub fn parse_measurements<R: Read>(
    reader: R,
    filter: Option<&DateFilter>,
) -> Result<Vec<MeasurementRow>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for required in [EDGE_ID_COLUMN, DATE_COLUMN] {
        if !headers.iter().any(|h| h == required) {
            return Err(ModelError::data(format!(
                "measurement table has no '{required}' column"
            )));
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize() {
        let mut columns: HashMap<String, String> = result?;
        let edge_id = columns.remove(EDGE_ID_COLUMN).unwrap_or_default();
        let date = columns.remove(DATE_COLUMN).unwrap_or_default();

        if let Some(f) = filter {
            if !f.matches(&date) {
                skipped += 1;
                continue;
            }
        }

        rows.push(MeasurementRow {
            edge_id,
            date,
            columns,
        });
    }

    debug!(rows = rows.len(), skipped, "Measurement rows parsed");
    Ok(rows)
}

/// Opens and parses the measurement table at `path`.
pub fn read_measurements(path: &Path, filter: Option<&DateFilter>) -> Result<Vec<MeasurementRow>> {
    let file = std::fs::File::open(path)?;
    parse_measurements(file, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
data;edge_id;ID_loop;07:00-08:00;08:00-09:00;direzione
2024-02-01T00:00:00;E1;L1;360;400;N
2024-02-02T00:00:00;E1;L1;300;;N
2024-03-01T00:00:00;E2;L2;12.0;x;S
";

    #[test]
    fn test_parse_all_rows() {
        let rows = parse_measurements(TABLE.as_bytes(), None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].edge_id, "E1");
        assert_eq!(rows[0].get("ID_loop"), Some("L1"));
        assert_eq!(rows[0].count("07:00-08:00").unwrap(), 360);
    }

    #[test]
    fn test_date_filter_substring() {
        let filter: DateFilter = "2024-02".parse().unwrap();
        let rows = parse_measurements(TABLE.as_bytes(), Some(&filter)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.date.starts_with("2024-02")));
    }

    #[test]
    fn test_malformed_date_filter() {
        for bad in ["", "yesterday", "2024-13", "2024-02-30", "24-02-01"] {
            let err = bad.parse::<DateFilter>().unwrap_err();
            assert!(matches!(err, ModelError::Data(_)), "{bad}");
        }
        assert!("2024".parse::<DateFilter>().is_ok());
        assert!("2024-02-29".parse::<DateFilter>().is_ok());
    }

    #[test]
    fn test_count_edge_cases() {
        let rows = parse_measurements(TABLE.as_bytes(), None).unwrap();
        assert!(matches!(rows[1].count("08:00-09:00"), Err(ModelError::Data(_))));
        assert!(matches!(rows[1].count("10:00-11:00"), Err(ModelError::Data(_))));
        assert_eq!(rows[2].count("07:00-08:00").unwrap(), 12);
        assert!(matches!(rows[2].count("08:00-09:00"), Err(ModelError::Data(_))));
    }

    #[test]
    fn test_count_rejects_values_beyond_u64() {
        let row = MeasurementRow::new("E1", "2024-02-01")
            .with_column("07:00-08:00", "1e30")
            .with_column("08:00-09:00", "18446744073709551615");
        assert!(matches!(row.count("07:00-08:00"), Err(ModelError::Data(_))));
        assert_eq!(row.count("08:00-09:00").unwrap(), u64::MAX);
    }

    #[test]
    fn test_missing_edge_id_column() {
        let err = parse_measurements("data;07:00-08:00\n2024-02-01;1\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, ModelError::Data(_)));
    }
}
