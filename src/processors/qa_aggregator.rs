use crate::config::AggregationRules;
use crate::error::{ProcessingError, Result};
use crate::models::{
    AnnualAnalyteRecord, AnnualTable, DailyComposite, QualifierAction, Sample, Season,
};
use crate::processors::coverage_report::{AggregationReport, ExclusionReason, WaterbodyCoverage};
use crate::utils::stats::{geometric_mean, median};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;

/// Annual records and coverage counts for one waterbody
#[derive(Debug, Clone, PartialEq)]
pub struct WaterbodyAggregation {
    pub wbid: String,
    pub records: Vec<AnnualAnalyteRecord>,
    pub coverage: WaterbodyCoverage,
}

/// Reduces raw samples to annual geometric means.
///
/// Samples are cleaned (excluded stations, non-positive results, rejected
/// qualifiers, censored values at MDL/√2), collapsed to one median per day
/// and analyte, and each (year, analyte) group is kept only when it has
/// enough composites spanning both seasons.
pub struct WaterQualityAggregator {
    rules: AggregationRules,
}

impl WaterQualityAggregator {
    pub fn new(rules: AggregationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AggregationRules {
        &self.rules
    }

    /// Aggregate a mixed sample set, one independent run per waterbody
    pub fn aggregate(&self, samples: &[Sample]) -> Result<(AnnualTable, AggregationReport)> {
        let mut by_waterbody: BTreeMap<&str, Vec<&Sample>> = BTreeMap::new();
        for sample in samples {
            by_waterbody.entry(&sample.wbid).or_default().push(sample);
        }

        let mut records = Vec::new();
        let mut report = AggregationReport::new();
        for (wbid, samples) in by_waterbody {
            let aggregation = self.run(wbid, &samples)?;
            records.extend(aggregation.records);
            report.add(aggregation.coverage);
        }

        Ok((AnnualTable::from_records(&records), report))
    }

    /// Aggregate the samples of a single waterbody
    pub fn aggregate_waterbody(&self, wbid: &str, samples: &[Sample]) -> Result<WaterbodyAggregation> {
        if let Some(other) = samples.iter().find(|s| s.wbid != wbid) {
            return Err(ProcessingError::DataMerge(format!(
                "Sample for {} passed to the aggregation of {}",
                other.wbid, wbid
            )));
        }
        let samples: Vec<&Sample> = samples.iter().collect();
        self.run(wbid, &samples)
    }

    fn run(&self, wbid: &str, samples: &[&Sample]) -> Result<WaterbodyAggregation> {
        let mut coverage = WaterbodyCoverage::new(wbid);
        coverage.counts.input_samples = samples.len();

        let composites = self.daily_composites(samples, &mut coverage)?;
        coverage.counts.daily_composites = composites.len();

        let records = self.annual_records(wbid, &composites, &mut coverage)?;
        coverage.counts.annual_records = records.len();

        tracing::debug!(
            wbid,
            samples = coverage.counts.input_samples,
            composites = coverage.counts.daily_composites,
            records = records.len(),
            "Aggregated waterbody"
        );

        Ok(WaterbodyAggregation {
            wbid: wbid.to_string(),
            records,
            coverage,
        })
    }

    /// Result after exclusion and qualifier rules; `None` when the sample is dropped
    fn cleaned_result(&self, sample: &Sample, coverage: &mut WaterbodyCoverage) -> Result<Option<f64>> {
        let pattern = &self.rules.excluded_station_pattern;
        if !pattern.is_empty() && sample.station.contains(pattern.as_str()) {
            coverage.counts.excluded_station_samples += 1;
            return Ok(None);
        }

        if !sample.result.is_finite() || sample.result <= 0.0 {
            coverage.counts.non_positive_samples += 1;
            return Ok(None);
        }

        match sample.qualifier().action() {
            QualifierAction::Keep => Ok(Some(sample.result)),
            QualifierAction::Drop => {
                coverage.counts.rejected_samples += 1;
                Ok(None)
            }
            QualifierAction::SubstituteMdl => match sample.mdl {
                Some(mdl) if mdl.is_finite() && mdl > 0.0 => {
                    coverage.counts.substituted_samples += 1;
                    Ok(Some(mdl / SQRT_2))
                }
                other => Err(sample.integrity_error(format!(
                    "qualifier {} requires a positive MDL, found {:?}",
                    sample.qualifier_code.as_deref().unwrap_or_default(),
                    other
                ))),
            },
        }
    }

    /// Median of the cleaned results per (date, analyte), in date order
    pub fn daily_composites(
        &self,
        samples: &[&Sample],
        coverage: &mut WaterbodyCoverage,
    ) -> Result<Vec<DailyComposite>> {
        let mut days: BTreeMap<(NaiveDate, &str), Vec<f64>> = BTreeMap::new();

        for sample in samples {
            let Some(result) = self.cleaned_result(sample, coverage)? else {
                continue;
            };
            let date = sample.date()?;
            days.entry((date, sample.analyte.as_str()))
                .or_default()
                .push(result);
        }

        let mut composites = Vec::with_capacity(days.len());
        for ((date, analyte), results) in days {
            let Some(result) = median(&results) else {
                continue;
            };
            composites.push(DailyComposite {
                date,
                analyte: analyte.to_string(),
                result,
                season: Season::from_month(
                    chrono::Datelike::month(&date),
                    self.rules.wet_season_first_month,
                    self.rules.wet_season_last_month,
                ),
                sample_count: results.len(),
            });
        }

        Ok(composites)
    }

    fn annual_records(
        &self,
        wbid: &str,
        composites: &[DailyComposite],
        coverage: &mut WaterbodyCoverage,
    ) -> Result<Vec<AnnualAnalyteRecord>> {
        let mut groups: BTreeMap<(i32, &str), Vec<&DailyComposite>> = BTreeMap::new();
        for composite in composites {
            groups
                .entry((composite.year(), composite.analyte.as_str()))
                .or_default()
                .push(composite);
        }
        coverage.counts.year_groups = groups.len();

        let mut records = Vec::new();
        for ((year, analyte), group) in groups {
            if group.len() < self.rules.min_composites_per_year {
                coverage.exclude(year, analyte, group.len(), ExclusionReason::TooFewComposites);
                continue;
            }
            if !group.iter().any(|c| c.season == Season::Wet) {
                coverage.exclude(year, analyte, group.len(), ExclusionReason::MissingWetSeason);
                continue;
            }
            if !group.iter().any(|c| c.season == Season::Dry) {
                coverage.exclude(year, analyte, group.len(), ExclusionReason::MissingDrySeason);
                continue;
            }

            let values: Vec<f64> = group.iter().map(|c| c.result).collect();
            let geometric_mean = geometric_mean(&values).ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Cannot take the geometric mean of {} {} {}: {:?}",
                    wbid, year, analyte, values
                ))
            })?;

            records.push(AnnualAnalyteRecord {
                wbid: wbid.to_string(),
                year,
                analyte: analyte.to_string(),
                geometric_mean,
                composite_count: group.len(),
            });
        }

        Ok(records)
    }
}

impl Default for WaterQualityAggregator {
    fn default() -> Self {
        Self::new(AggregationRules::default())
    }
}
