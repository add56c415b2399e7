use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use crate::cli::args::{Cli, Commands, OutputFormat, SourceArgs};
use crate::config::ProcessingConfig;
use crate::models::{criteria_for, lake::format_criteria_table, nutrient_criteria, SepticInputs};
use crate::processors::{BatchRunner, LoadCalculator, SepticCalculator};
use crate::readers::{LakeClassificationReader, LanduseReader, RainfallReader, SourceSpec};
use crate::utils::constants::*;
use crate::utils::filename::{generate_default_annual_filename, generate_default_septic_filename};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref()).context("Failed to set up logging")?;

    let config = ProcessingConfig::load(cli.config.as_deref()).context("Failed to load settings")?;
    tracing::debug!(?config, "Loaded settings");

    match cli.command {
        Commands::Aggregate {
            source,
            wbids,
            analytes,
            start_year,
            output_file,
            format,
            compression,
            report,
            max_workers,
            mmap,
        } => {
            let source = source_spec(&source, mmap)?;
            let analytes: Vec<String> = analytes
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            let output_file =
                output_file.unwrap_or_else(|| generate_default_annual_filename(format.extension()));
            let wbids = unique_wbids(wbids);

            println!("Aggregating water-quality samples...");
            println!("Source: {}", source.describe());
            println!("Waterbodies: {}", wbids.join(", "));
            println!("Analytes: {} (since {})", analytes.join(", "), start_year);
            println!("Output file: {}", output_file.display());

            let progress = ProgressReporter::new(wbids.len() as u64, "Aggregating...", false);
            let runner = BatchRunner::new(max_workers).with_rules(config.aggregation.clone());
            let (table, coverage) = runner
                .run(&source, &wbids, &analytes, start_year, Some(&progress))
                .await
                .context("Aggregation failed")?;

            println!("\n{}", coverage.summary());

            if let Some(report_path) = report {
                coverage
                    .write_json(&report_path)
                    .with_context(|| format!("Failed to write {}", report_path.display()))?;
                println!("Coverage report written to {}", report_path.display());
            }

            if table.is_empty() {
                println!("No year met the coverage rules; writing an empty table");
            }

            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            match format {
                OutputFormat::Csv => {
                    CsvWriter::new()
                        .write_annual_table(&table, &output_file)
                        .with_context(|| format!("Failed to write {}", output_file.display()))?;
                }
                OutputFormat::Parquet => {
                    let writer = ParquetWriter::new().with_compression(&compression)?;
                    writer
                        .write_table(&table, &output_file)
                        .with_context(|| format!("Failed to write {}", output_file.display()))?;
                    println!("\n{}", writer.get_file_info(&output_file)?.summary());
                }
            }

            println!("Wrote {} annual rows", table.len());
        }

        Commands::Check { source, wbids, mmap } => {
            let source = source_spec(&source, mmap)?;
            let wbids = unique_wbids(wbids);
            let handle = source
                .open()
                .with_context(|| format!("Failed to open {}", source.describe()))?;

            let mut missing = 0;
            for wbid in &wbids {
                if handle.waterbody_exists(wbid)? {
                    println!("✅ {} found", wbid);
                } else {
                    missing += 1;
                    println!(
                        "⚠️  WBID '{}' does not exist or input is not formatted correctly!",
                        wbid
                    );
                }
            }

            println!("\n{} of {} waterbodies found", wbids.len() - missing, wbids.len());
        }

        Commands::Classify {
            database,
            wbid,
            alkalinity,
        } => {
            let reader = LakeClassificationReader::open(&database, config.classification.clone())
                .with_context(|| format!("Failed to open {}", database.display()))?;

            match reader.color_class(&wbid)? {
                Some(class) => {
                    println!("{} is a {} ({})", wbid, class.description(), class);
                    let criteria = criteria_for(class, alkalinity);
                    println!("\n{}", format_criteria_table(&criteria));
                }
                None => println!("No colour classification found for {}", wbid),
            }
        }

        Commands::Criteria => {
            let rows: Vec<_> = nutrient_criteria().iter().collect();
            println!("{}", format_criteria_table(&rows));
        }

        Commands::Plsm {
            landuse,
            coefficients,
            rainfall,
            output_dir,
            septic_tanks,
            septic_people,
            remove_waters,
        } => {
            println!("Running the pollutant load screening model...");
            println!("Output directory: {}", output_dir.display());

            let rainfall = RainfallReader::new()
                .read_rainfall(&rainfall)
                .with_context(|| format!("Failed to read rainfall {}", rainfall.display()))?;
            let landuse_reader = LanduseReader::new();
            let areas = landuse_reader
                .read_areas(&landuse)
                .with_context(|| format!("Failed to read land uses {}", landuse.display()))?;
            let coefficients = landuse_reader
                .read_coefficients(&coefficients)
                .with_context(|| format!("Failed to read coefficients {}", coefficients.display()))?;

            let progress = ProgressReporter::new_spinner("Calculating loads...", false);
            let results = LoadCalculator::new()
                .calculate(&rainfall, &areas, &coefficients, Some(&progress))
                .context("Load calculation failed")?;

            write_plsm_outputs(&output_dir, &results)?;

            let septic = match (septic_tanks, septic_people) {
                (Some(tank_count), Some(people_per_household)) => Some(
                    SepticCalculator::new(config.septic.clone())
                        .calculate(&SepticInputs {
                            tank_count,
                            people_per_household,
                        })
                        .context("Septic calculation failed")?,
                ),
                _ => None,
            };

            if areas.iter().all(|a| a.level1.is_some()) {
                let level1 = LoadCalculator::new()
                    .level1_long_term_average(&results.loads, septic.as_ref(), remove_waters)
                    .context("Level-1 load summary failed")?;
                let path = output_dir.join(PLSM_LEVEL1_FILE);
                CsvWriter::new()
                    .with_overwrite_warning(true)
                    .write_level1(&level1, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            } else if septic.is_some() || remove_waters {
                tracing::warn!(
                    "Land-use table has no {} column; skipping the level-1 table",
                    LEVEL1_CODE_COLUMN
                );
            }

            println!("\n{:<6} {:>20} {:>12} {:>12}", "Year", "Runoff Volume (hm3)", "TN (ppb)", "TP (ppb)");
            for year in &results.summary {
                println!(
                    "{:<6} {:>20.3} {:>12.2} {:>12.2}",
                    year.year,
                    year.runoff_volume_hm3(),
                    year.tn_ppb(),
                    year.tp_ppb()
                );
            }
            println!("\nPLSM complete!");
        }

        Commands::Septic {
            tanks,
            people,
            output_file,
        } => {
            let load = SepticCalculator::new(config.septic.clone())
                .calculate(&SepticInputs {
                    tank_count: tanks,
                    people_per_household: people,
                })
                .context("Septic calculation failed")?;

            for (parameter, value) in load.parameter_rows() {
                println!("{:<28} {}", parameter, value);
            }

            let output_file = output_file.unwrap_or_else(generate_default_septic_filename);
            CsvWriter::new()
                .write_septic(&load, &output_file)
                .with_context(|| format!("Failed to write {}", output_file.display()))?;
            println!("\nSeptic table written to {}", output_file.display());
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer
                .get_file_info(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                let table = writer.read_table(&file)?;
                println!("\nSample Rows (showing up to {}):", sample);
                println!("{}", table.headers().join("\t"));
                for row in table.rows.iter().take(sample) {
                    let values: Vec<String> = table
                        .analytes
                        .iter()
                        .map(|a| row.value(a).map(|v| format!("{:.4}", v)).unwrap_or_default())
                        .collect();
                    println!("{}\t{}\t{}", row.wbid, row.year, values.join("\t"));
                }
            }
        }
    }

    Ok(())
}

fn source_spec(args: &SourceArgs, mmap: bool) -> Result<SourceSpec> {
    match (&args.database, &args.samples) {
        (Some(database), _) => Ok(SourceSpec::Sqlite(database.clone())),
        (None, Some(samples)) => Ok(SourceSpec::Csv {
            path: samples.clone(),
            mmap,
        }),
        (None, None) => anyhow::bail!("Either --database or --samples is required"),
    }
}

/// Drop repeated WBIDs, keeping the first occurrence
fn unique_wbids(wbids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    wbids.into_iter().filter(|w| seen.insert(w.clone())).collect()
}

fn write_plsm_outputs(output_dir: &Path, results: &crate::processors::PlsmResults) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let writer = CsvWriter::new().with_overwrite_warning(true);

    writer.write_plsm_raw(&results.loads, &output_dir.join(PLSM_RAW_FILE))?;
    writer.write_plsm_summary(&results.summary, &output_dir.join(PLSM_SUMMARY_FILE))?;
    writer.write_per_acre(&results.long_term_average, &output_dir.join(PLSM_LTA_FILE))?;
    writer.write_nutrient_map(&results.per_acre_by_year, &output_dir.join(PLSM_NUTRIENT_MAP_FILE))?;
    writer.write_bathtub(&results.bathtub, &output_dir.join(PLSM_BATHTUB_FILE))?;

    for name in [
        PLSM_RAW_FILE,
        PLSM_SUMMARY_FILE,
        PLSM_LTA_FILE,
        PLSM_NUTRIENT_MAP_FILE,
        PLSM_BATHTUB_FILE,
    ] {
        println!("Wrote {}", output_dir.join(name).display());
    }
    Ok(())
}
