use crate::config::ClassificationSettings;
use crate::error::{ProcessingError, Result};
use crate::models::ColorClass;
use crate::readers::sqlite_source::value_to_i64;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// Looks up lake colour classes in the classification table
pub struct LakeClassificationReader {
    conn: Connection,
    settings: ClassificationSettings,
}

impl LakeClassificationReader {
    pub fn open(path: &Path, settings: ClassificationSettings) -> Result<Self> {
        if !path.exists() {
            return Err(ProcessingError::MissingData(format!(
                "SQLite database not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self::from_connection(conn, settings))
    }

    pub fn from_connection(conn: Connection, settings: ClassificationSettings) -> Self {
        Self { conn, settings }
    }

    /// Raw colour code for a waterbody, `None` when it is not classified
    pub fn color_code(&self, wbid: &str) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1",
            quote_identifier(&self.settings.color_column),
            quote_identifier(&self.settings.table),
            quote_identifier(&self.settings.wbid_column),
        );

        let value: Option<Value> = self
            .conn
            .query_row(&sql, params![wbid], |row| row.get(0))
            .optional()?;

        match value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value_to_i64(&value).map(Some).ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Colour code for {} is not an integer: {:?}",
                    wbid, value
                ))
            }),
        }
    }

    pub fn color_class(&self, wbid: &str) -> Result<Option<ColorClass>> {
        let class = self.color_code(wbid)?.map(ColorClass::from_code);
        if class.is_none() {
            tracing::warn!("No colour classification found for WBID '{}'", wbid);
        }
        Ok(class)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> LakeClassificationReader {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Lake_Classification (wbid TEXT, color INTEGER);
             INSERT INTO Lake_Classification VALUES ('1234A', 1);
             INSERT INTO Lake_Classification VALUES ('2000B', 2);
             INSERT INTO Lake_Classification VALUES ('3000C', NULL);",
        )
        .unwrap();
        LakeClassificationReader::from_connection(conn, ClassificationSettings::default())
    }

    #[test]
    fn test_color_class_lookup() -> Result<()> {
        let reader = reader();
        assert_eq!(reader.color_class("1234A")?, Some(ColorClass::Color));
        assert_eq!(reader.color_class("2000B")?, Some(ColorClass::Clear));
        assert_eq!(reader.color_class("3000C")?, None);
        assert_eq!(reader.color_class("9999Z")?, None);
        Ok(())
    }

    #[test]
    fn test_custom_table_and_columns() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE \"Lake Types\" (WBID_ID TEXT, COLOR_CLASS TEXT);
             INSERT INTO \"Lake Types\" VALUES ('1234A', '1');",
        )?;
        let settings = ClassificationSettings {
            table: "Lake Types".to_string(),
            wbid_column: "WBID_ID".to_string(),
            color_column: "COLOR_CLASS".to_string(),
        };
        let reader = LakeClassificationReader::from_connection(conn, settings);
        assert_eq!(reader.color_code("1234A")?, Some(1));
        Ok(())
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("color"), "\"color\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
