use crate::error::Result;
use crate::models::{LanduseArea, LanduseCoefficient, Level1Landuse};
use crate::readers::table::NamedTable;
use crate::utils::constants::*;
use std::path::Path;
use validator::Validate;

/// Reads the watershed land-use areas exported from the GIS and the
/// statewide land-use coefficient master list.
pub struct LanduseReader;

impl LanduseReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_areas(&self, path: &Path) -> Result<Vec<LanduseArea>> {
        let areas = self.areas_from_table(&NamedTable::read(path)?)?;
        tracing::info!("Read {} land uses from {}", areas.len(), path.display());
        Ok(areas)
    }

    pub fn parse_areas(&self, text: &str) -> Result<Vec<LanduseArea>> {
        self.areas_from_table(&NamedTable::parse(text, "land-use areas")?)
    }

    pub fn read_coefficients(&self, path: &Path) -> Result<Vec<LanduseCoefficient>> {
        let coefficients = self.coefficients_from_table(&NamedTable::read(path)?)?;
        tracing::info!(
            "Read {} land-use coefficients from {}",
            coefficients.len(),
            path.display()
        );
        Ok(coefficients)
    }

    pub fn parse_coefficients(&self, text: &str) -> Result<Vec<LanduseCoefficient>> {
        self.coefficients_from_table(&NamedTable::parse(text, "land-use coefficients")?)
    }

    fn areas_from_table(&self, table: &NamedTable) -> Result<Vec<LanduseArea>> {
        let code = table.require_column(LANDUSE_CODE_COLUMN)?;
        let description = table.require_column(LANDUSE_DESCRIPTION_COLUMN)?;
        let area = table.require_column(LANDUSE_AREA_COLUMN)?;
        let level1_code = table.column(LEVEL1_CODE_COLUMN);
        let level1_description = table.column(LEVEL1_DESCRIPTION_COLUMN);

        table
            .records
            .iter()
            .map(|record| {
                let level1 = match level1_code {
                    Some(index) => Some(Level1Landuse {
                        code: table.required_integer(record, index)?,
                        description: level1_description
                            .and_then(|i| table.text(record, i))
                            .unwrap_or_default()
                            .to_string(),
                    }),
                    None => None,
                };
                let landuse = LanduseArea {
                    level2_code: table.required_integer(record, code)?,
                    level2_description: table
                        .text(record, description)
                        .unwrap_or_default()
                        .to_string(),
                    area_sq_m: table.required_number(record, area)?,
                    level1,
                };
                landuse.validate()?;
                Ok(landuse)
            })
            .collect()
    }

    /// Coefficient values may be blank; the merge decides whether that is fatal
    fn coefficients_from_table(&self, table: &NamedTable) -> Result<Vec<LanduseCoefficient>> {
        let code = table.require_column(COEFFICIENT_CODE_COLUMN)?;
        let roc = table.require_column(COEFFICIENT_ROC_COLUMN)?;
        let emc_tn = table.require_column(COEFFICIENT_EMC_TN_COLUMN)?;
        let emc_tp = table.require_column(COEFFICIENT_EMC_TP_COLUMN)?;

        table
            .records
            .iter()
            .map(|record| {
                Ok(LanduseCoefficient {
                    level2_code: table.required_integer(record, code)?,
                    roc: table.number(record, roc)?,
                    emc_tn: table.number(record, emc_tn)?,
                    emc_tp: table.number(record, emc_tp)?,
                })
            })
            .collect()
    }
}

impl Default for LanduseReader {
    fn default() -> Self {
        Self::new()
    }
}
