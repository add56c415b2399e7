use crate::error::{ProcessingError, Result};
use crate::utils::text::decode_text;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

/// A small CSV table whose columns are looked up by name.
///
/// Header names are compared case-insensitively and without surrounding
/// whitespace. Spreadsheet exports in Windows-1252 are decoded transparently.
pub struct NamedTable {
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
    source: String,
}

impl NamedTable {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ProcessingError::MissingData(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&decode_text(&bytes), &path.display().to_string())
    }

    pub fn parse(text: &str, source: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let records = reader
            .records()
            .filter(|r| r.as_ref().map_or(true, |r| r.iter().any(|f| !f.is_empty())))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            headers,
            records,
            source: source.to_string(),
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "{}: missing column '{}' (found {})",
                self.source,
                name,
                self.headers.join(", ")
            ))
        })
    }

    /// Cell text, `None` when empty or absent
    pub fn text<'a>(&self, record: &'a StringRecord, index: usize) -> Option<&'a str> {
        record.get(index).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn number(&self, record: &StringRecord, index: usize) -> Result<Option<f64>> {
        match self.text(record, index) {
            None => Ok(None),
            Some(value) => value
                .replace(',', "")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.cell_error(record, index, value)),
        }
    }

    pub fn required_number(&self, record: &StringRecord, index: usize) -> Result<f64> {
        self.number(record, index)?
            .ok_or_else(|| self.cell_error(record, index, ""))
    }

    /// Integer cell; accepts whole-valued decimals such as `2020.0`
    pub fn required_integer(&self, record: &StringRecord, index: usize) -> Result<i64> {
        let value = self.required_number(record, index)?;
        if value.fract() != 0.0 {
            return Err(self.cell_error(record, index, &value.to_string()));
        }
        Ok(value as i64)
    }

    fn cell_error(&self, record: &StringRecord, index: usize, value: &str) -> ProcessingError {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let column = self.headers.get(index).map(String::as_str).unwrap_or("?");
        ProcessingError::InvalidFormat(format!(
            "{} line {}: invalid {} value '{}'",
            self.source, line, column, value
        ))
    }
}
