use crate::error::{ProcessingError, Result};
use crate::models::{AnnualRow, AnnualTable};
use crate::utils::constants::*;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Columnar output of the annual table: `WBID` (Utf8), `YEAR` (Int32) and
/// one nullable Float64 column per analyte.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write the annual table; an empty table still produces a file with its schema
    pub fn write_table(&self, table: &AnnualTable, path: &Path) -> Result<()> {
        let schema = self.create_schema(&table.analytes);

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in table.rows.chunks(self.row_group_size.max(1)) {
            let batch = self.rows_to_batch(chunk, &table.analytes, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        tracing::debug!("Wrote {} annual rows to {}", table.len(), path.display());
        Ok(())
    }

    fn create_schema(&self, analytes: &[String]) -> Arc<Schema> {
        let mut fields = vec![
            Field::new(WBID_COLUMN, DataType::Utf8, false),
            Field::new(YEAR_COLUMN, DataType::Int32, false),
        ];
        fields.extend(
            analytes
                .iter()
                .map(|analyte| Field::new(analyte, DataType::Float64, true)),
        );

        Arc::new(Schema::new(fields))
    }

    fn rows_to_batch(
        &self,
        rows: &[AnnualRow],
        analytes: &[String],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let wbids = StringArray::from_iter_values(rows.iter().map(|r| r.wbid.as_str()));
        let years = Int32Array::from_iter_values(rows.iter().map(|r| r.year));

        let mut columns: Vec<ArrayRef> = vec![Arc::new(wbids), Arc::new(years)];
        for analyte in analytes {
            let values: Float64Array = rows.iter().map(|r| r.value(analyte)).collect();
            columns.push(Arc::new(values));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read an annual table back, columns matched by name
    pub fn read_table(&self, path: &Path) -> Result<AnnualTable> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let analytes: Vec<String> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .filter(|name| name != WBID_COLUMN && name != YEAR_COLUMN)
            .collect();
        let reader = builder.build()?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch?;
            let wbids = typed_column::<StringArray>(&batch, WBID_COLUMN)?;
            let years = typed_column::<Int32Array>(&batch, YEAR_COLUMN)?;
            let values = analytes
                .iter()
                .map(|a| typed_column::<Float64Array>(&batch, a))
                .collect::<Result<Vec<_>>>()?;

            for i in 0..batch.num_rows() {
                let mut row_values = BTreeMap::new();
                for (analyte, column) in analytes.iter().zip(&values) {
                    if column.is_valid(i) {
                        row_values.insert(analyte.clone(), column.value(i));
                    }
                }
                rows.push(AnnualRow {
                    wbid: wbids.value(i).to_string(),
                    year: years.value(i),
                    values: row_values,
                });
            }
        }

        Ok(AnnualTable { analytes, rows })
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();
        let compression = (row_groups > 0 && metadata.row_group(0).num_columns() > 0)
            .then(|| metadata.row_group(0).column(0).compression());
        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
            columns,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn typed_column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Missing or mistyped {} column", name))
        })
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Option<Compression>,
    pub columns: Vec<String>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        let compression = self
            .compression
            .map(|c| format!("{:?}", c))
            .unwrap_or_else(|| "n/a".to_string());

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {}\n\
            - Avg rows per group: {:.0}\n\
            - Columns: {}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            compression,
            avg_rows,
            self.columns.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnnualAnalyteRecord;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn table() -> AnnualTable {
        let record = |wbid: &str, year, analyte: &str, gm| AnnualAnalyteRecord {
            wbid: wbid.to_string(),
            year,
            analyte: analyte.to_string(),
            geometric_mean: gm,
            composite_count: 4,
        };
        AnnualTable::from_records(&[
            record("1234A", 2020, "TP", 0.026),
            record("1234A", 2020, "TN", 1.2),
            record("1234A", 2021, "TN", 1.1),
        ])
    }

    #[test]
    fn test_write_and_read_table() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new();
        writer.write_table(&table(), temp_file.path())?;

        let read = writer.read_table(temp_file.path())?;
        assert_eq!(read, table());
        assert_eq!(read.row("1234A", 2021).and_then(|r| r.value("TP")), None);
        Ok(())
    }

    #[test]
    fn test_empty_table_keeps_schema() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new();
        let empty = AnnualTable::default().with_analytes(&["TN".to_string()]);
        writer.write_table(&empty, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 0);
        assert_eq!(info.columns, vec!["WBID", "YEAR", "TN"]);
        assert!(info.summary().contains("Total rows: 0"));
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_table(&table(), temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
        Ok(())
    }

    #[test]
    fn test_file_info() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new().with_row_group_size(1);
        writer.write_table(&table(), temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 2);
        assert_eq!(info.row_groups, 2);
        assert_eq!(info.compression, Some(Compression::SNAPPY));
        Ok(())
    }
}
