use crate::error::{ProcessingError, Result};
use crate::models::Sample;
use crate::readers::{SampleQuery, SampleSource};
use crate::utils::text::decode_text;
use csv::{ReaderBuilder, StringRecord, Trim};
use memmap2::Mmap;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// One row of a `RawData` CSV export. Headers are matched case-insensitively.
#[derive(Debug, Deserialize)]
struct RawSampleRow {
    wbid: String,
    sta: Option<String>,
    year: i32,
    month: u32,
    day: u32,
    mastercode: String,
    result: Option<String>,
    rcode: Option<String>,
    mdl: Option<String>,
}

/// Raw samples read from a CSV export of the sample database.
///
/// The whole export is parsed on open; queries filter in memory.
#[derive(Debug)]
pub struct CsvSampleSource {
    samples: Vec<Sample>,
}

impl CsvSampleSource {
    /// Parse an export file; `use_mmap` maps very large exports instead of reading them
    pub fn open(path: &Path, use_mmap: bool) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            ProcessingError::MissingData(format!("Cannot open {}: {}", path.display(), e))
        })?;

        let source = if use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            Self::from_text(&decode_text(&mmap))?
        } else {
            let bytes = std::fs::read(path)?;
            Self::from_text(&decode_text(&bytes))?
        };

        tracing::debug!(
            "Loaded {} samples from {}",
            source.samples.len(),
            path.display()
        );
        Ok(source)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        reader.set_headers(StringRecord::from(headers));

        let mut samples = Vec::new();
        let mut missing_results = 0usize;

        for row in reader.deserialize::<RawSampleRow>() {
            let row = row?;
            let Some(result) = parse_number(row.result.as_deref()) else {
                missing_results += 1;
                continue;
            };

            if row.wbid.is_empty() || row.mastercode.is_empty() {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Sample row without wbid or mastercode: {:?}",
                    row
                )));
            }

            samples.push(Sample {
                wbid: row.wbid,
                station: row.sta.unwrap_or_default(),
                year: row.year,
                month: row.month,
                day: row.day,
                analyte: row.mastercode,
                result,
                qualifier_code: row.rcode.filter(|c| !c.is_empty()),
                mdl: parse_number(row.mdl.as_deref()),
            });
        }

        if missing_results > 0 {
            tracing::warn!("Skipped {} rows without a numeric result", missing_results);
        }

        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SampleSource for CsvSampleSource {
    fn query_samples(&self, query: &SampleQuery) -> Result<Vec<Sample>> {
        Ok(self
            .samples
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect())
    }

    fn waterbody_exists(&self, wbid: &str) -> Result<bool> {
        Ok(self.samples.iter().any(|s| s.wbid == wbid))
    }
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
}
