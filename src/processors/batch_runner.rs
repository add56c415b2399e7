use crate::config::AggregationRules;
use crate::error::{ProcessingError, Result};
use crate::models::{AnnualTable, Sample};
use crate::processors::coverage_report::AggregationReport;
use crate::processors::qa_aggregator::{WaterQualityAggregator, WaterbodyAggregation};
use crate::readers::{fetch_waterbody_samples, CsvSampleSource, SampleQuery, SourceSpec};
use crate::utils::progress::ProgressReporter;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs the aggregator for many waterbodies.
///
/// Every waterbody is an independent run on the blocking pool; at most
/// `max_workers` run at once. A SQLite source is opened by each run, a CSV
/// export is parsed once and shared. Results are ordered by WBID regardless
/// of completion order and repeated WBIDs run once.
pub struct BatchRunner {
    max_workers: usize,
    rules: AggregationRules,
}

impl BatchRunner {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            rules: AggregationRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: AggregationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &AggregationRules {
        &self.rules
    }

    pub async fn run(
        &self,
        source: &SourceSpec,
        wbids: &[String],
        analytes: &[String],
        start_year: i32,
        progress: Option<&ProgressReporter>,
    ) -> Result<(AnnualTable, AggregationReport)> {
        if let Some(p) = progress {
            p.set_message(&format!(
                "Aggregating {} waterbodies from {}...",
                wbids.len(),
                source.describe()
            ));
        }

        let unique: BTreeSet<&String> = wbids.iter().collect();
        if unique.len() < wbids.len() {
            tracing::warn!(
                "Ignoring {} repeated waterbody IDs",
                wbids.len() - unique.len()
            );
        }

        let run_source = Arc::new(RunSource::prepare(source).await?);
        let aggregator = Arc::new(WaterQualityAggregator::new(self.rules.clone()));
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for wbid in unique {
            let query = SampleQuery::new(wbid.clone(), analytes.to_vec(), start_year);
            let source = Arc::clone(&run_source);
            let aggregator = Arc::clone(&aggregator);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ProcessingError::Config(format!("Worker pool closed: {}", e)))?;
                tokio::task::spawn_blocking(move || {
                    aggregate_one(&source, &query, &aggregator)
                })
                .await?
            });
        }

        let mut records = Vec::new();
        let mut report = AggregationReport::new();
        while let Some(joined) = tasks.join_next().await {
            let aggregation: WaterbodyAggregation = joined??;
            if let Some(p) = progress {
                if aggregation.coverage.counts.input_samples == 0 {
                    p.println(&format!(
                        "⚠️  No samples for WBID '{}' since {}",
                        aggregation.coverage.wbid, start_year
                    ));
                }
                p.increment(1);
            }
            records.extend(aggregation.records);
            report.add(aggregation.coverage);
        }
        report.sort_by_wbid();

        let table = AnnualTable::from_records(&records).with_analytes(analytes);

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Aggregated {} waterbodies into {} annual rows",
                report.waterbodies.len(),
                table.len()
            ));
        }

        Ok((table, report))
    }
}

/// Where the waterbody runs of one batch read their samples
enum RunSource {
    /// Parsed once per batch and shared by every run
    Shared(CsvSampleSource),
    /// Opened by each run and dropped when that run ends
    PerRun(SourceSpec),
}

impl RunSource {
    async fn prepare(source: &SourceSpec) -> Result<Self> {
        match source {
            SourceSpec::Csv { path, mmap } => {
                let (path, mmap) = (path.clone(), *mmap);
                let csv = tokio::task::spawn_blocking(move || CsvSampleSource::open(&path, mmap))
                    .await??;
                Ok(RunSource::Shared(csv))
            }
            SourceSpec::Sqlite(_) => Ok(RunSource::PerRun(source.clone())),
        }
    }

    fn fetch(&self, query: &SampleQuery) -> Result<Vec<Sample>> {
        match self {
            RunSource::Shared(csv) => fetch_waterbody_samples(csv, query),
            RunSource::PerRun(spec) => {
                let handle = spec.open()?;
                fetch_waterbody_samples(handle.as_ref(), query)
            }
        }
    }
}

fn aggregate_one(
    source: &RunSource,
    query: &SampleQuery,
    aggregator: &WaterQualityAggregator,
) -> Result<WaterbodyAggregation> {
    let samples = source.fetch(query)?;
    aggregator.aggregate_waterbody(&query.wbid, &samples)
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
