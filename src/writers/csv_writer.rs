use crate::error::Result;
use crate::models::{
    AnnualTable, BathtubRow, Level1Loading, PerAcreLoading, SepticLoad, YearlyLoadSummary,
    YearlyLoads, YearlyPerAcreLoading,
};
use crate::utils::constants::*;
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::path::Path;

/// Tabular CSV output for the annual table, the PLSM tables and the septic sheet
pub struct CsvWriter {
    warn_on_overwrite: bool,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self {
            warn_on_overwrite: false,
        }
    }

    pub fn with_overwrite_warning(mut self, warn: bool) -> Self {
        self.warn_on_overwrite = warn;
        self
    }

    fn create(&self, path: &Path) -> Result<Writer<File>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if self.warn_on_overwrite && path.is_file() {
            tracing::warn!(
                "{} already exists and will be overwritten. To run another watershed, choose another output location.",
                path.display()
            );
        }

        Ok(WriterBuilder::new()
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_path(path)?)
    }

    /// `WBID, YEAR, <analyte...>`; years without a value for an analyte leave the cell empty
    pub fn write_annual_table(&self, table: &AnnualTable, path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record(table.headers())?;

        for row in &table.rows {
            let mut record = vec![row.wbid.clone(), row.year.to_string()];
            record.extend(
                table
                    .analytes
                    .iter()
                    .map(|a| row.value(a).map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Every land use in every year with all intermediate volumes
    pub fn write_plsm_raw(&self, loads: &[YearlyLoads], path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record([
            "Year",
            LANDUSE_CODE_COLUMN,
            LANDUSE_DESCRIPTION_COLUMN,
            LANDUSE_AREA_COLUMN,
            COEFFICIENT_ROC_COLUMN,
            COEFFICIENT_EMC_TN_COLUMN,
            COEFFICIENT_EMC_TP_COLUMN,
            "Rainfall_in",
            "Rainfall_m",
            "Rainfall_Volume_m3",
            "Rainfall_Volume_L",
            "Runoff_Volume_L",
            "TN_Load_kg",
            "TP_Load_kg",
        ])?;

        for load in loads.iter().flat_map(|y| &y.landuses) {
            writer.write_record([
                load.year.to_string(),
                load.level2_code.to_string(),
                load.level2_description.clone(),
                load.area_sq_m.to_string(),
                load.roc.to_string(),
                load.emc_tn.to_string(),
                load.emc_tp.to_string(),
                load.rainfall_in.to_string(),
                load.rainfall_m.to_string(),
                load.rainfall_volume_m3.to_string(),
                load.rainfall_volume_l.to_string(),
                load.runoff_volume_l.to_string(),
                load.tn_load_kg.to_string(),
                load.tp_load_kg.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_plsm_summary(&self, summary: &[YearlyLoadSummary], path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record(["Year", "Runoff Volume (hm3)", "TN (ppb)", "TP (ppb)"])?;

        for year in summary {
            writer.write_record([
                year.year.to_string(),
                year.runoff_volume_hm3().to_string(),
                year.tn_ppb().to_string(),
                year.tp_ppb().to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Long-term average loading per acre of each level-2 land use
    pub fn write_per_acre(&self, loadings: &[PerAcreLoading], path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record([
            LANDUSE_CODE_COLUMN,
            LANDUSE_DESCRIPTION_COLUMN,
            "TN_Acre",
            "TP_Acre",
        ])?;

        for loading in loadings {
            writer.write_record(per_acre_record(loading))?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Per-acre loading of each land use, one block of rows per year
    pub fn write_nutrient_map(&self, years: &[YearlyPerAcreLoading], path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record([
            "Year",
            LANDUSE_CODE_COLUMN,
            LANDUSE_DESCRIPTION_COLUMN,
            "TN_Acre",
            "TP_Acre",
        ])?;

        for year in years {
            for loading in &year.loadings {
                let mut record = vec![year.year.to_string()];
                record.extend(per_acre_record(loading));
                writer.write_record(&record)?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_bathtub(&self, rows: &[BathtubRow], path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record([
            "Year",
            "Precipitation (meters)",
            "Runoff Volume (hm3)",
            "TN (ppb)",
            "TP (ppb)",
        ])?;

        for row in rows {
            writer.write_record([
                row.year.to_string(),
                row.precipitation_m.to_string(),
                row.runoff_volume_hm3.to_string(),
                row.tn_ppb.to_string(),
                row.tp_ppb.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Long-term average load per level-1 land use; the septic row has no code or TP
    pub fn write_level1(&self, rows: &[Level1Loading], path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record([LEVEL1_CODE_COLUMN, LEVEL1_DESCRIPTION_COLUMN, "TN_Kg", "TP_Kg"])?;

        for row in rows {
            writer.write_record([
                row.level1_code.map(|c| c.to_string()).unwrap_or_default(),
                row.level1_description.clone(),
                row.tn_kg.to_string(),
                row.tp_kg.map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_septic(&self, load: &SepticLoad, path: &Path) -> Result<()> {
        let mut writer = self.create(path)?;
        writer.write_record(["Parameter", "Value"])?;
        for (parameter, value) in load.parameter_rows() {
            writer.write_record([parameter, value.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn per_acre_record(loading: &PerAcreLoading) -> [String; 4] {
    [
        loading.level2_code.to_string(),
        loading.level2_description.clone(),
        loading.tn_kg_per_acre.to_string(),
        loading.tp_kg_per_acre.to_string(),
    ]
}
