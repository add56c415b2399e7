use crate::error::Result;
use crate::models::Sample;
use crate::readers::{CsvSampleSource, SqliteSampleSource};
use std::path::PathBuf;

/// Filter for one waterbody's samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleQuery {
    pub wbid: String,
    pub analytes: Vec<String>,
    pub start_year: i32,
}

impl SampleQuery {
    pub fn new(wbid: impl Into<String>, analytes: Vec<String>, start_year: i32) -> Self {
        Self {
            wbid: wbid.into(),
            analytes,
            start_year,
        }
    }

    pub fn matches(&self, sample: &Sample) -> bool {
        sample.wbid == self.wbid
            && sample.year >= self.start_year
            && self.analytes.iter().any(|a| *a == sample.analyte)
    }
}

/// A store of raw water-quality samples
pub trait SampleSource {
    /// All samples for the query's waterbody, analytes and years
    fn query_samples(&self, query: &SampleQuery) -> Result<Vec<Sample>>;

    /// Whether the source holds any row at all for this waterbody
    fn waterbody_exists(&self, wbid: &str) -> Result<bool>;
}

/// Which sample source to open for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Sqlite(PathBuf),
    /// CSV export; `mmap` maps the file instead of reading it into memory
    Csv { path: PathBuf, mmap: bool },
}

impl SourceSpec {
    /// Open a fresh handle; each run owns its handle and drops it when done
    pub fn open(&self) -> Result<Box<dyn SampleSource + Send>> {
        match self {
            SourceSpec::Sqlite(path) => Ok(Box::new(SqliteSampleSource::open(path)?)),
            SourceSpec::Csv { path, mmap } => Ok(Box::new(CsvSampleSource::open(path, *mmap)?)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SourceSpec::Sqlite(path) => format!("SQLite database {}", path.display()),
            SourceSpec::Csv { path, .. } => format!("CSV export {}", path.display()),
        }
    }
}

/// Fetch samples for a query, reporting an unknown waterbody instead of failing.
pub fn fetch_waterbody_samples(
    source: &dyn SampleSource,
    query: &SampleQuery,
) -> Result<Vec<Sample>> {
    if !source.waterbody_exists(&query.wbid)? {
        tracing::warn!(
            "WBID '{}' does not exist or input is not formatted correctly!",
            query.wbid
        );
        return Ok(Vec::new());
    }

    let samples = source.query_samples(query)?;
    tracing::debug!(
        wbid = %query.wbid,
        "Fetched {} samples for analytes {:?} since {}",
        samples.len(),
        query.analytes,
        query.start_year
    );
    Ok(samples)
}
