use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::Path;

/// Why a (year, analyte) group produced no annual value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    TooFewComposites,
    MissingWetSeason,
    MissingDrySeason,
}

impl ExclusionReason {
    pub fn description(&self) -> &'static str {
        match self {
            ExclusionReason::TooFewComposites => "too few daily composites",
            ExclusionReason::MissingWetSeason => "no wet season composite",
            ExclusionReason::MissingDrySeason => "no dry season composite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedGroup {
    pub year: i32,
    pub analyte: String,
    pub composites: usize,
    pub reason: ExclusionReason,
}

/// Counts of what each aggregation step kept and removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageCounts {
    pub input_samples: usize,
    pub excluded_station_samples: usize,
    pub non_positive_samples: usize,
    pub rejected_samples: usize,
    pub substituted_samples: usize,
    pub daily_composites: usize,
    pub year_groups: usize,
    pub groups_below_min_count: usize,
    pub groups_lacking_season: usize,
    pub annual_records: usize,
}

impl AddAssign for CoverageCounts {
    fn add_assign(&mut self, other: Self) {
        self.input_samples += other.input_samples;
        self.excluded_station_samples += other.excluded_station_samples;
        self.non_positive_samples += other.non_positive_samples;
        self.rejected_samples += other.rejected_samples;
        self.substituted_samples += other.substituted_samples;
        self.daily_composites += other.daily_composites;
        self.year_groups += other.year_groups;
        self.groups_below_min_count += other.groups_below_min_count;
        self.groups_lacking_season += other.groups_lacking_season;
        self.annual_records += other.annual_records;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterbodyCoverage {
    pub wbid: String,
    #[serde(flatten)]
    pub counts: CoverageCounts,
    pub excluded_groups: Vec<ExcludedGroup>,
}

impl WaterbodyCoverage {
    pub fn new(wbid: impl Into<String>) -> Self {
        Self {
            wbid: wbid.into(),
            counts: CoverageCounts::default(),
            excluded_groups: Vec::new(),
        }
    }

    pub fn exclude(&mut self, year: i32, analyte: &str, composites: usize, reason: ExclusionReason) {
        match reason {
            ExclusionReason::TooFewComposites => self.counts.groups_below_min_count += 1,
            ExclusionReason::MissingWetSeason | ExclusionReason::MissingDrySeason => {
                self.counts.groups_lacking_season += 1
            }
        }
        self.excluded_groups.push(ExcludedGroup {
            year,
            analyte: analyte.to_string(),
            composites,
            reason,
        });
    }
}

/// Coverage report for an aggregation run over one or more waterbodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    pub waterbodies: Vec<WaterbodyCoverage>,
}

impl AggregationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, coverage: WaterbodyCoverage) {
        self.waterbodies.push(coverage);
    }

    pub fn sort_by_wbid(&mut self) {
        self.waterbodies.sort_by(|a, b| a.wbid.cmp(&b.wbid));
    }

    pub fn totals(&self) -> CoverageCounts {
        let mut totals = CoverageCounts::default();
        for coverage in &self.waterbodies {
            totals += coverage.counts;
        }
        totals
    }

    /// Waterbodies that contributed no sample at all
    pub fn empty_waterbodies(&self) -> Vec<&str> {
        self.waterbodies
            .iter()
            .filter(|c| c.counts.input_samples == 0)
            .map(|c| c.wbid.as_str())
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn summary(&self) -> String {
        let totals = self.totals();
        let mut summary = String::new();

        summary.push_str("=== Aggregation Coverage Report ===\n");
        summary.push_str(&format!("Waterbodies: {}\n", self.waterbodies.len()));
        summary.push_str(&format!("Input Samples: {}\n", totals.input_samples));
        summary.push_str(&format!(
            "Excluded Station Samples: {}\n",
            totals.excluded_station_samples
        ));
        summary.push_str(&format!(
            "Non-positive Results: {}\n",
            totals.non_positive_samples
        ));
        summary.push_str(&format!("Rejected (G/V): {}\n", totals.rejected_samples));
        summary.push_str(&format!(
            "Substituted (U/T): {}\n",
            totals.substituted_samples
        ));
        summary.push_str(&format!("Daily Composites: {}\n", totals.daily_composites));
        summary.push_str(&format!(
            "Year/Analyte Groups: {} ({} below minimum count, {} lacking seasonal coverage)\n",
            totals.year_groups, totals.groups_below_min_count, totals.groups_lacking_season
        ));
        summary.push_str(&format!("Annual Records: {}\n", totals.annual_records));

        let empty = self.empty_waterbodies();
        if !empty.is_empty() {
            summary.push_str(&format!("\nWaterbodies without samples: {}\n", empty.join(", ")));
        }

        summary
    }
}
