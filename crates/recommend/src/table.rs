use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::nutrient;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One food row. Nutrient cells are kept as the raw strings found in the file.
#[derive(Debug, Clone)]
pub struct FoodRecord {
    pub code: i64,
    pub name: String,
    pub cells: HashMap<String, String>,
}

impl FoodRecord {
    pub fn new(code: i64, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            cells: HashMap::new(),
        }
    }

    pub fn with_cell(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(field.into(), value.into());
        self
    }

    /// Nutrient value used for scoring; `0.0` when the cell is absent or not a number.
    pub fn nutrient(&self, field: &str) -> f64 {
        self.cells.get(field).map(|v| nutrient::coerce(v)).unwrap_or(0.0)
    }

    /// Nutrient value read leniently (unit suffixes stripped).
    pub fn nutrient_lenient(&self, field: &str) -> f64 {
        self.cells.get(field).map(|v| nutrient::lenient(v)).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Read-only food table in file order.
#[derive(Debug, Clone, Default)]
pub struct FoodTable {
    pub columns: Vec<String>,
    pub records: Vec<FoodRecord>,
    /// Rows dropped at load time because their code was not an integer.
    pub skipped: usize,
}

impl FoodTable {
    /// Build a table from records; the column list is the union of cell names
    /// in first-seen order.
    pub fn from_records(records: Vec<FoodRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            let mut names: Vec<&String> = record.cells.keys().collect();
            names.sort();
            for name in names {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }
        Self {
            columns,
            records,
            skipped: 0,
        }
    }

    pub fn has_column(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c == field)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

/// Parse a food table from CSV text using the catalog's code and name columns.
pub fn parse_food_table(
    csv_data: &str,
    delimiter: u8,
    catalog: &Catalog,
) -> Result<FoodTable, RecommendError> {
    parse_with_columns(csv_data, delimiter, &catalog.code_column, &catalog.name_column)
}

pub fn parse_with_columns(
    csv_data: &str,
    delimiter: u8,
    code_column: &str,
    name_column: &str,
) -> Result<FoodTable, RecommendError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RecommendError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, RecommendError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RecommendError::MissingColumn(name.into()))
    };

    let code_idx = idx(code_column)?;
    let name_idx = idx(name_column)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| RecommendError::Csv(e.to_string()))?;

        let code_str = record.get(code_idx).unwrap_or("");
        let Some(code) = parse_code(code_str) else {
            log::warn!(
                "food table row {}: skipping, code {:?} is not an integer",
                row_idx + 2,
                code_str
            );
            skipped += 1;
            continue;
        };

        let name = record.get(name_idx).unwrap_or("").trim().to_string();

        let mut cells = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            if i == code_idx || i == name_idx {
                continue;
            }
            if let Some(val) = record.get(i) {
                cells.insert(h.clone(), val.to_string());
            }
        }

        records.push(FoodRecord { code, name, cells });
    }

    log::debug!(
        "loaded food table: {} rows, {} columns, {} skipped",
        records.len(),
        headers.len(),
        skipped
    );

    Ok(FoodTable {
        columns: headers,
        records,
        skipped,
    })
}

/// Integer codes; integral floats (`351.0`) are accepted as exported by
/// spreadsheet tools.
fn parse_code(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(code) = s.parse::<i64>() {
        return Some(code);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
