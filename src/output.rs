//! Output formatting and persistence for traffic records.
//!
//! Supports pretty-printing, JSON serialization, and a `;`-delimited table
//! with 4-decimal floats and a configurable decimal separator.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::record::TrafficRecord;

/// Column headers of the record table, in write order.
pub const COLUMNS: [&str; 13] = [
    "edge_id",
    "length",
    "laneCount",
    "flow",
    "vehiclesPerSecond",
    "vpsPerLane",
    "laneVps",
    "density",
    "laneDensity",
    "maxDensity",
    "vMax",
    "velocity",
    "normVelocity",
];

const DELIMITER: u8 = b';';

/// Logs records using Rust's debug pretty-print format.
pub fn print_pretty(records: &[TrafficRecord]) {
    debug!("{:#?}", records);
}

/// Logs records as pretty-printed JSON.
pub fn print_json(records: &[TrafficRecord]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

fn check_separator(separator: char) -> Result<()> {
    if separator.is_ascii_digit() || matches!(separator, ';' | '-' | '+' | '"' | '\n' | '\r') {
        return Err(ModelError::configuration(format!(
            "'{separator}' cannot be used as decimal separator"
        )));
    }
    Ok(())
}

fn format_float(value: f64, separator: char) -> String {
    let text = format!("{value:.4}");
    if separator == '.' {
        text
    } else {
        text.replace('.', &separator.to_string())
    }
}

fn parse_float(text: &str, separator: char, column: &str) -> Result<f64> {
    let normalized = if separator == '.' {
        text.trim().to_string()
    } else {
        text.trim().replace(separator, ".")
    };
    normalized
        .parse()
        .map_err(|_| ModelError::data(format!("column '{column}': '{text}' is not a number")))
}

/// Renders records into the table format, header included.
pub fn render_records(records: &[TrafficRecord], separator: char) -> Result<Vec<u8>> {
    check_separator(separator)?;

    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for r in records {
        let f = |v: f64| format_float(v, separator);
        writer.write_record([
            r.edge_id.clone(),
            f(r.length),
            r.lane_count.to_string(),
            r.flow.clone(),
            f(r.vehicles_per_second),
            f(r.vps_per_lane),
            f(r.lane_vps),
            f(r.density),
            f(r.lane_density),
            f(r.max_density),
            f(r.v_max),
            f(r.velocity),
            f(r.norm_velocity),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ModelError::Io(e.into_error()))
}

/// Writes records to `path`, replacing any previous file.
///
/// The whole table is rendered before the file is touched, so a failure
/// never leaves a truncated file behind.
#[tracing::instrument(skip_all, fields(path = %path.display(), count = records.len()))]
pub fn write_records(path: &Path, records: &[TrafficRecord], separator: char) -> Result<()> {
    let bytes = render_records(records, separator)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, bytes)?;

    info!("Model data saved");
    Ok(())
}

fn record_from_row(row: &StringRecord, separator: char) -> Result<TrafficRecord> {
    let field = |i: usize| row.get(i).unwrap_or_default();
    let float = |i: usize| parse_float(field(i), separator, COLUMNS[i]);

    let lane_count = field(2)
        .trim()
        .parse()
        .map_err(|_| ModelError::data(format!("laneCount '{}' is not an integer", field(2))))?;
    let flow = field(3).trim();
    flow.parse::<u64>()
        .map_err(|_| ModelError::data(format!("flow '{flow}' is not an integer")))?;

    Ok(TrafficRecord {
        edge_id: field(0).to_string(),
        length: float(1)?,
        lane_count,
        flow: flow.to_string(),
        vehicles_per_second: float(4)?,
        vps_per_lane: float(5)?,
        lane_vps: float(6)?,
        density: float(7)?,
        lane_density: float(8)?,
        max_density: float(9)?,
        v_max: float(10)?,
        velocity: float(11)?,
        norm_velocity: float(12)?,
    })
}

/// Parses a table produced by [`render_records`].
pub fn parse_records<R: Read>(reader: R, separator: char) -> Result<Vec<TrafficRecord>> {
    check_separator(separator)?;

    let mut rdr = ReaderBuilder::new().delimiter(DELIMITER).from_reader(reader);

    let headers = rdr.headers()?;
    if headers.len() != COLUMNS.len() || headers.iter().zip(COLUMNS).any(|(h, c)| h != c) {
        return Err(ModelError::data(format!(
            "unexpected record table header: {}",
            headers.iter().collect::<Vec<_>>().join(";")
        )));
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        records.push(record_from_row(&row?, separator)?);
    }
    Ok(records)
}

/// Reads a record table from `path`.
pub fn read_records(path: &Path, separator: char) -> Result<Vec<TrafficRecord>> {
    let file = std::fs::File::open(path)?;
    parse_records(file, separator)
}
