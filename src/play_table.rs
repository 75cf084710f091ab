use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use parquet::schema::types::Type;

use crate::error::{FeatureError, FeatureResult};

static NULL_CELL: Cell = Cell::Null;

/// One value of the raw play-by-play table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(v) => !v.is_finite(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the cell. NaN and unparsable strings read as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => v.is_finite().then_some(*v),
            Cell::Str(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Integral view of the cell; fractional floats are rejected.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Cell::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Indicator columns are stored as booleans or 0/1 numbers depending on the source.
    pub fn is_truthy(&self) -> bool {
        match self {
            Cell::Bool(b) => *b,
            Cell::Str(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s.parse::<f64>().is_ok_and(|v| v != 0.0)
            }
            other => other.as_f64().is_some_and(|v| v != 0.0),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Str(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Str(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Int(i64::from(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// Flat, named-column table of play rows.
#[derive(Debug, Clone, Default)]
pub struct PlayTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl PlayTable {
    pub fn new(columns: Vec<String>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Cell>>) -> FeatureResult<Self> {
        let mut table = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> FeatureResult<()> {
        if row.len() != self.columns.len() {
            return Err(FeatureError::SchemaMismatch);
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends every row of `other`; both tables must carry the same columns in the same order.
    pub fn append(&mut self, other: PlayTable) -> FeatureResult<()> {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.columns != other.columns {
            return Err(FeatureError::SchemaMismatch);
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names from `required` that the table does not carry, in the order given.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<TableRow<'_>> {
        (idx < self.rows.len()).then_some(TableRow { table: self, idx })
    }

    pub fn all(&self) -> TableSlice<'_> {
        TableSlice {
            table: self,
            rows: (0..self.rows.len()).collect(),
        }
    }

    pub fn filter(&self, pred: impl Fn(&TableRow<'_>) -> bool) -> TableSlice<'_> {
        self.all().filter(pred)
    }

    /// Reads a flat parquet file. When `keep` is given only those columns are
    /// materialised, in `keep` order, which matters for play-by-play files with
    /// hundreds of columns and keeps season files appendable.
    pub fn from_parquet(path: &Path, keep: Option<&[&str]>) -> FeatureResult<Self> {
        let file = fs::File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let schema = reader.metadata().file_metadata().schema();

        let (columns, projection): (Vec<String>, Option<Type>) = match keep {
            Some(keep) => {
                let fields = keep
                    .iter()
                    .filter_map(|name| {
                        schema
                            .get_fields()
                            .iter()
                            .find(|field| field.name() == *name)
                            .cloned()
                    })
                    .collect::<Vec<_>>();
                let columns = fields.iter().map(|f| f.name().to_string()).collect();
                let projection = Type::group_type_builder(schema.name())
                    .with_fields(fields)
                    .build()?;
                (columns, Some(projection))
            }
            None => (
                schema
                    .get_fields()
                    .iter()
                    .map(|field| field.name().to_string())
                    .collect(),
                None,
            ),
        };
        let mut table = Self::new(columns);

        for row in reader.get_row_iter(projection)? {
            let row = row?;
            let mut cells = vec![Cell::Null; table.columns.len()];
            for (name, field) in row.get_column_iter() {
                if let Some(idx) = table.column_index(name) {
                    cells[idx] = cell_from_field(field);
                }
            }
            table.rows.push(cells);
        }
        Ok(table)
    }
}

fn cell_from_field(field: &Field) -> Cell {
    match field {
        Field::Bool(v) => Cell::Bool(*v),
        Field::Byte(v) => Cell::Int(i64::from(*v)),
        Field::Short(v) => Cell::Int(i64::from(*v)),
        Field::Int(v) => Cell::Int(i64::from(*v)),
        Field::Long(v) => Cell::Int(*v),
        Field::UByte(v) => Cell::Int(i64::from(*v)),
        Field::UShort(v) => Cell::Int(i64::from(*v)),
        Field::UInt(v) => Cell::Int(i64::from(*v)),
        Field::Float(v) => Cell::Float(f64::from(*v)),
        Field::Double(v) => Cell::Float(*v),
        Field::Str(v) => Cell::Str(v.clone()),
        _ => Cell::Null,
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a PlayTable,
    idx: usize,
}

impl<'a> TableRow<'a> {
    pub fn index(&self) -> usize {
        self.idx
    }

    /// Value of `column`; an absent column reads as null.
    pub fn get(&self, column: &str) -> &'a Cell {
        match self.table.column_index(column) {
            Some(col) => &self.table.rows[self.idx][col],
            None => &NULL_CELL,
        }
    }

    pub fn str(&self, column: &str) -> Option<&'a str> {
        self.get(column)
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Ordered subset of a table's rows, e.g. one game's plays.
#[derive(Debug, Clone)]
pub struct TableSlice<'a> {
    table: &'a PlayTable,
    rows: Vec<usize>,
}

impl<'a> TableSlice<'a> {
    pub fn table(&self) -> &'a PlayTable {
        self.table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'a>> + '_ {
        let table = self.table;
        self.rows.iter().map(move |&idx| TableRow { table, idx })
    }

    pub fn first(&self) -> Option<TableRow<'a>> {
        self.rows.first().map(|&idx| TableRow {
            table: self.table,
            idx,
        })
    }

    pub fn filter(&self, pred: impl Fn(&TableRow<'_>) -> bool) -> TableSlice<'a> {
        let rows = self.rows().filter(|row| pred(row)).map(|row| row.idx).collect();
        TableSlice {
            table: self.table,
            rows,
        }
    }

    /// Distinct non-empty string values of `column`, in first-appearance order.
    pub fn distinct_strings(&self, column: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in self.rows() {
            if let Some(value) = row.str(column)
                && seen.insert(value)
            {
                out.push(value.to_string());
            }
        }
        out
    }

    /// Splits the slice by the string value of `column`, keeping groups in
    /// first-appearance order and rows in their original order inside a group.
    pub fn group_by(&self, column: &str) -> FeatureResult<Vec<(String, TableSlice<'a>)>> {
        if !self.table.has_column(column) {
            return Err(FeatureError::MissingColumns {
                context: "groups",
                columns: vec![column.to_string()],
            });
        }
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(String, TableSlice<'a>)> = Vec::new();
        for row in self.rows() {
            let Some(key) = row.str(column) else {
                return Err(FeatureError::InvalidValue {
                    column: column.to_string(),
                    row: row.idx,
                });
            };
            let slot = *position.entry(key).or_insert_with(|| {
                groups.push((
                    key.to_string(),
                    TableSlice {
                        table: self.table,
                        rows: Vec::new(),
                    },
                ));
                groups.len() - 1
            });
            groups[slot].1.rows.push(row.idx);
        }
        Ok(groups)
    }
}
