use crate::error::{ProcessingError, Result};
use crate::models::RainfallYear;
use crate::readers::table::NamedTable;
use std::collections::BTreeSet;
use std::path::Path;
use validator::Validate;

/// Reads an annual rainfall table.
///
/// The column whose header mentions "year" becomes the year; the first other
/// column is taken as the annual total in inches.
pub struct RainfallReader;

impl RainfallReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_rainfall(&self, path: &Path) -> Result<Vec<RainfallYear>> {
        let rainfall = self.parse_table(&NamedTable::read(path)?)?;
        tracing::info!("Read {} rainfall years from {}", rainfall.len(), path.display());
        Ok(rainfall)
    }

    pub fn parse_rainfall(&self, text: &str) -> Result<Vec<RainfallYear>> {
        self.parse_table(&NamedTable::parse(text, "rainfall")?)
    }

    fn parse_table(&self, table: &NamedTable) -> Result<Vec<RainfallYear>> {
        let year_index = table
            .headers
            .iter()
            .position(|h| h.to_lowercase().contains("year"));
        let total_index = table
            .headers
            .iter()
            .enumerate()
            .position(|(i, h)| Some(i) != year_index && !h.trim().is_empty());

        let (Some(year_index), Some(total_index)) = (year_index, total_index) else {
            return Err(ProcessingError::InvalidFormat(format!(
                "Rainfall table needs a Year column and a Total column, found: {}",
                table.headers.join(", ")
            )));
        };

        if table.headers[year_index].trim() != "Year" || table.headers[total_index].trim() != "Total" {
            tracing::debug!(
                "Using '{}' as Year and '{}' as Total",
                table.headers[year_index],
                table.headers[total_index]
            );
        }

        let mut rainfall = Vec::with_capacity(table.records.len());
        let mut seen = BTreeSet::new();
        for record in &table.records {
            let year = RainfallYear {
                year: table.required_integer(record, year_index)? as i32,
                total_inches: table.required_number(record, total_index)?,
            };
            year.validate()?;
            if !seen.insert(year.year) {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Rainfall year {} appears more than once",
                    year.year
                )));
            }
            rainfall.push(year);
        }

        Ok(rainfall)
    }
}

impl Default for RainfallReader {
    fn default() -> Self {
        Self::new()
    }
}
