use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::SepticParameters;
use crate::utils::constants::*;

/// Rules applied by the water-quality aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AggregationRules {
    /// Samples whose station identifier contains this are dropped; empty disables
    pub excluded_station_pattern: String,

    #[validate(range(min = 1))]
    pub min_composites_per_year: usize,

    #[validate(range(min = 1, max = 12))]
    pub wet_season_first_month: u32,

    #[validate(range(min = 1, max = 12))]
    pub wet_season_last_month: u32,
}

impl Default for AggregationRules {
    fn default() -> Self {
        Self {
            excluded_station_pattern: EXCLUDED_STATION_PATTERN.to_string(),
            min_composites_per_year: MIN_COMPOSITES_PER_YEAR,
            wet_season_first_month: WET_SEASON_FIRST_MONTH,
            wet_season_last_month: WET_SEASON_LAST_MONTH,
        }
    }
}

impl AggregationRules {
    pub fn validate_rules(&self) -> Result<()> {
        self.validate()?;
        if self.wet_season_first_month > self.wet_season_last_month {
            return Err(ProcessingError::Config(format!(
                "Wet season months must be ordered, got {}..={}",
                self.wet_season_first_month, self.wet_season_last_month
            )));
        }
        Ok(())
    }
}

/// Where lake colour classes are stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClassificationSettings {
    #[validate(length(min = 1))]
    pub table: String,

    #[validate(length(min = 1))]
    pub wbid_column: String,

    #[validate(length(min = 1))]
    pub color_column: String,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            table: CLASSIFICATION_TABLE.to_string(),
            wbid_column: CLASSIFICATION_WBID_COLUMN.to_string(),
            color_column: CLASSIFICATION_COLOR_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProcessingConfig {
    #[validate(nested)]
    pub aggregation: AggregationRules,

    #[validate(nested)]
    pub septic: SepticParameters,

    #[validate(nested)]
    pub classification: ClassificationSettings,
}

impl ProcessingConfig {
    /// Layer built-in defaults, an optional TOML file and `WQ__SECTION__KEY`
    /// environment variables, then validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&ProcessingConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            tracing::debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: ProcessingConfig = builder
            .add_source(
                Environment::with_prefix("WQ")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        settings.aggregation.validate_rules()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProcessingConfig::default();
        assert_eq!(config.aggregation.min_composites_per_year, 4);
        assert_eq!(config.aggregation.wet_season_first_month, 5);
        assert_eq!(config.aggregation.wet_season_last_month, 9);
        assert_eq!(config.aggregation.excluded_station_pattern, "21FLKWAT");
        assert_eq!(config.septic.water_use_gal_per_day, 70.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[aggregation]")?;
        writeln!(file, "min_composites_per_year = 6")?;
        writeln!(file, "[septic]")?;
        writeln!(file, "attenuation = 0.4")?;

        let config = ProcessingConfig::load(Some(file.path()))?;
        assert_eq!(config.aggregation.min_composites_per_year, 6);
        assert_eq!(config.aggregation.wet_season_first_month, 5);
        assert_eq!(config.septic.attenuation, 0.4);
        assert_eq!(config.classification.table, "Lake_Classification");

        Ok(())
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = AggregationRules {
            wet_season_first_month: 10,
            wet_season_last_month: 4,
            ..AggregationRules::default()
        };
        assert!(rules.validate_rules().is_err());

        let rules = AggregationRules {
            min_composites_per_year: 0,
            ..AggregationRules::default()
        };
        assert!(rules.validate_rules().is_err());
    }
}
