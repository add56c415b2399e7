pub mod batch_runner;
pub mod coverage_report;
pub mod load_calculator;
pub mod qa_aggregator;
pub mod septic_calculator;

pub use batch_runner::BatchRunner;
pub use coverage_report::{
    AggregationReport, CoverageCounts, ExcludedGroup, ExclusionReason, WaterbodyCoverage,
};
pub use load_calculator::{LoadCalculator, PlsmResults};
pub use qa_aggregator::{WaterQualityAggregator, WaterbodyAggregation};
pub use septic_calculator::SepticCalculator;
