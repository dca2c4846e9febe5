//! SQLite loader.
//!
//! RULE: Only store.rs talks to the database.
//! It runs exactly one `SELECT *` per load and hands back owned rows;
//! the connection is dropped as soon as the dataset is built.

use rusqlite::{types::Value, Connection, OpenFlags};

use crate::{
    config::{ColumnMap, DashboardConfig},
    dataset::Dataset,
    error::{DashError, DashResult},
    types::Record,
};

/// Lowercase and trim a column label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Result of `SELECT *`: normalized labels plus raw cell values.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<Value>>,
}

impl RawTable {
    fn position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Check the required columns are present, then project every row
    /// onto a `Record`.
    pub fn into_records(self, columns: &ColumnMap) -> DashResult<Vec<Record>> {
        let required = columns.required();
        let missing: Vec<String> = required
            .iter()
            .filter(|label| self.position(label).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(DashError::MissingColumns {
                missing,
                available: self.columns.clone(),
            });
        }

        // Presence was checked above, so every lookup succeeds.
        let idx = |label: &str| self.position(label).unwrap_or_default();
        let [analysis_label, population_label, city_label, partner_label, region_label] = required;
        let (analysis, population) = (idx(analysis_label.as_str()), idx(population_label.as_str()));
        let city = idx(city_label.as_str());
        let partner = idx(partner_label.as_str());
        let region = idx(region_label.as_str());

        let mut records = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            records.push(Record {
                analysis_count:    numeric(&row[analysis], &analysis_label, row_idx)?,
                target_population: numeric(&row[population], &population_label, row_idx)?,
                city:              categorical(&row[city]),
                partner:           categorical(&row[partner]),
                region:            categorical(&row[region]),
            });
        }
        Ok(records)
    }
}

/// NULL counts as zero so sums skip missing cells. Non-finite values
/// ("NaN", "inf") are rejected so every sum stays finite.
fn numeric(value: &Value, column: &str, row: usize) -> DashResult<f64> {
    let invalid = |shown: String| DashError::InvalidNumber {
        column: column.to_string(),
        row,
        value: shown,
    };
    match value {
        Value::Null       => Ok(0.0),
        Value::Integer(i) => Ok(*i as f64),
        Value::Real(r) if r.is_finite() => Ok(*r),
        Value::Real(r)    => Err(invalid(r.to_string())),
        Value::Text(s)    => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(s.clone())),
        Value::Blob(_)    => Err(invalid("<blob>".into())),
    }
}

/// Quote a table reference. `schema.table` is split on the first dot and
/// each part quoted separately; embedded quotes are doubled.
fn quote_table(table: &str) -> String {
    let quote = |ident: &str| format!("\"{}\"", ident.replace('"', "\"\""));
    match table.split_once('.') {
        Some((schema, name)) => format!("{}.{}", quote(schema), quote(name)),
        None => quote(table),
    }
}

fn categorical(value: &Value) -> Option<String> {
    match value {
        Value::Null       => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r)    => Some(r.to_string()),
        Value::Text(s)    => Some(s.clone()),
        Value::Blob(b)    => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

pub struct DashboardStore {
    conn: Connection,
}

impl DashboardStore {
    /// Open an existing database at `path` (plain path or `file:` URI),
    /// read-only. A missing file is an error; the loader never creates
    /// or writes databases.
    pub fn open(path: &str) -> DashResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DashResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Run raw SQL. Used to seed fixtures.
    pub fn execute_batch(&self, sql: &str) -> DashResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// `SELECT * FROM <table>` with labels normalized. `table` may be
    /// schema-qualified (`main.coverage`).
    pub fn load_table(&self, table: &str) -> DashResult<RawTable> {
        let sql = format!("SELECT * FROM {}", quote_table(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(normalize_label).collect();
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width).map(|i| row.get::<_, Value>(i)).collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RawTable { columns, rows })
    }

    /// Load and validate `table` into an immutable dataset.
    pub fn load_dataset(&self, table: &str, columns: &ColumnMap) -> DashResult<Dataset> {
        let raw = self.load_table(table)?;
        let width = raw.columns.len();
        let records = raw.into_records(columns)?;
        log::info!(
            "loaded {} rows from '{table}' ({width} columns, {} ignored)",
            records.len(),
            width.saturating_sub(5)
        );
        Ok(Dataset::new(records))
    }
}

/// Open the configured database, load the table once and close the
/// connection. Any failure here is fatal to the caller.
pub fn load_dataset(config: &DashboardConfig) -> DashResult<Dataset> {
    let store = DashboardStore::open(&config.database)?;
    store.load_dataset(&config.table, &config.columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_trimmed_and_lowercased() {
        assert_eq!(normalize_label("  City "), "city");
        assert_eq!(normalize_label("TARGET_Population"), "target_population");
    }

    #[test]
    fn text_numbers_are_parsed_and_null_is_zero() {
        assert_eq!(numeric(&Value::Text(" 12.5 ".into()), "c", 0).unwrap(), 12.5);
        assert_eq!(numeric(&Value::Null, "c", 0).unwrap(), 0.0);
        assert!(matches!(
            numeric(&Value::Text("abc".into()), "c", 3),
            Err(DashError::InvalidNumber { row: 3, .. })
        ));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for text in ["NaN", "inf", " -Infinity "] {
            assert!(
                numeric(&Value::Text(text.into()), "c", 0).is_err(),
                "{text:?} should not load as a number"
            );
        }
        assert!(numeric(&Value::Real(f64::INFINITY), "c", 0).is_err());
    }

    #[test]
    fn table_references_are_quoted_per_part() {
        assert_eq!(quote_table("coverage"), "\"coverage\"");
        assert_eq!(quote_table("main.coverage"), "\"main\".\"coverage\"");
        assert_eq!(quote_table("we\"ird"), "\"we\"\"ird\"");
    }
}
