use crate::error::{ProcessingError, Result};
use crate::models::Sample;
use crate::readers::{SampleQuery, SampleSource};
use crate::utils::constants::RAW_DATA_TABLE;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use std::path::Path;

const SAMPLE_COLUMNS: &str = "wbid, sta, year, month, day, mastercode, result, rcode, mdl";

/// Raw samples stored in the `RawData` table of an IWR-style SQLite database.
///
/// The connection is opened read-only and lives as long as this value.
pub struct SqliteSampleSource {
    conn: Connection,
}

impl SqliteSampleSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProcessingError::MissingData(format!(
                "SQLite database not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        tracing::debug!("Opened sample database {}", path.display());
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl SampleSource for SqliteSampleSource {
    fn query_samples(&self, query: &SampleQuery) -> Result<Vec<Sample>> {
        if query.analytes.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (0..query.analytes.len())
            .map(|i| format!("?{}", i + 3))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {SAMPLE_COLUMNS} FROM {RAW_DATA_TABLE}
             WHERE wbid = ?1 AND year >= ?2 AND mastercode IN ({placeholders})
             ORDER BY year, month, day, sta"
        );

        let mut bindings: Vec<Value> = vec![
            Value::Text(query.wbid.clone()),
            Value::Integer(i64::from(query.start_year)),
        ];
        bindings.extend(query.analytes.iter().map(|a| Value::Text(a.clone())));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bindings), |row| -> rusqlite::Result<[Value; 9]> {
                Ok([
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ])
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut samples = Vec::with_capacity(rows.len());
        let mut missing_results = 0usize;
        for values in rows {
            match sample_from_values(values)? {
                Some(sample) => samples.push(sample),
                None => missing_results += 1,
            }
        }

        if missing_results > 0 {
            tracing::warn!(
                "Skipped {} {} rows without a numeric result",
                missing_results,
                query.wbid
            );
        }

        Ok(samples)
    }

    fn waterbody_exists(&self, wbid: &str) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {RAW_DATA_TABLE} WHERE wbid = ?1)");
        let exists: i64 = self.conn.query_row(&sql, params![wbid], |row| row.get(0))?;
        Ok(exists != 0)
    }
}

/// Map the named columns of one row; `None` when the result is missing.
fn sample_from_values(values: [Value; 9]) -> Result<Option<Sample>> {
    let [wbid, sta, year, month, day, mastercode, result, rcode, mdl] = values;

    let Some(result) = value_to_f64(&result) else {
        return Ok(None);
    };

    Ok(Some(Sample {
        wbid: required_text(wbid, "wbid")?,
        station: value_to_text(sta).unwrap_or_default(),
        year: required_int(&year, "year")? as i32,
        month: required_int(&month, "month")? as u32,
        day: required_int(&day, "day")? as u32,
        analyte: required_text(mastercode, "mastercode")?,
        result,
        qualifier_code: value_to_text(rcode).filter(|c| !c.trim().is_empty()),
        mdl: value_to_f64(&mdl),
    }))
}

/// Numeric view of a loosely typed SQLite cell (text cells are parsed)
pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(r) => Some(*r),
        Value::Text(t) => t.trim().parse::<f64>().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

pub(crate) fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Real(r) if r.fract() == 0.0 => Some(*r as i64),
        Value::Text(t) => t.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Text(t) => Some(t),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

fn required_text(value: Value, column: &str) -> Result<String> {
    value_to_text(value)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Missing {} value", column)))
}

fn required_int(value: &Value, column: &str) -> Result<i64> {
    value_to_i64(value).ok_or_else(|| {
        ProcessingError::InvalidFormat(format!("Invalid {} value: {:?}", column, value))
    })
}
