pub mod annual;
pub mod lake;
pub mod loading;
pub mod sample;
pub mod septic;

pub use annual::{AnnualAnalyteRecord, AnnualRow, AnnualTable};
pub use lake::{criteria_for, nutrient_criteria, ColorClass, NutrientCriteria};
pub use loading::{
    BathtubRow, LanduseArea, LanduseCoefficient, LanduseLoad, LanduseParameters, Level1Landuse,
    Level1Loading, PerAcreLoading, RainfallYear, YearlyLoadSummary, YearlyLoads,
    YearlyPerAcreLoading,
};
pub use sample::{DailyComposite, Qualifier, QualifierAction, Sample, Season};
pub use septic::{SepticInputs, SepticLoad, SepticParameters};
