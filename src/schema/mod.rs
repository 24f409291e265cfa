//! Static column schemas of the supported CSV snapshots.
//!
//! Each dataset family has a fixed column order. Schemas are `'static` tables
//! and never change at runtime; rows are always read through a schema by
//! semantic column name (`RowView`), never by position.

use crate::domain::{DatasetKind, ScopeKind, Value};

/// Declared type of a column, used for cell coercion at mount time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    Text,
    Int,
    Float,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::Float)
    }
}

/// One column of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    /// Summed when several rows are rolled up into one (world country scope).
    pub additive: bool,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        additive: false,
    }
}

const fn count(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Int,
        additive: true,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    pub columns: &'static [Column],
    /// Column providing the day of each row.
    pub date_column: &'static str,
    /// Status column, never a valid increment operand.
    pub status_column: Option<&'static str>,
    /// Columns naming a scope, by scope kind.
    pub scope_columns: &'static [(ScopeKind, &'static str)],
}

use ColumnType::{Date, Float, Int, Text};

pub static ITALY_COUNTRY: ColumnSchema = ColumnSchema {
    columns: &[
        col("data", Date),
        col("stato", Text),
        count("ricoverati_con_sintomi"),
        count("terapia_intensiva"),
        count("totale_ospedalizzati"),
        count("isolamento_domiciliare"),
        count("totale_attualmente_positivi"),
        count("nuovi_attualmente_positivi"),
        count("dimessi_guariti"),
        count("deceduti"),
        count("totale_casi"),
        count("tamponi"),
    ],
    date_column: "data",
    status_column: Some("stato"),
    scope_columns: &[],
};

pub static ITALY_REGION: ColumnSchema = ColumnSchema {
    columns: &[
        col("data", Date),
        col("stato", Text),
        col("codice_regione", Int),
        col("denominazione_regione", Text),
        col("lat", Float),
        col("long", Float),
        count("ricoverati_con_sintomi"),
        count("terapia_intensiva"),
        count("totale_ospedalizzati"),
        count("isolamento_domiciliare"),
        count("totale_attualmente_positivi"),
        count("nuovi_attualmente_positivi"),
        count("dimessi_guariti"),
        count("deceduti"),
        count("totale_casi"),
        count("tamponi"),
    ],
    date_column: "data",
    status_column: Some("stato"),
    scope_columns: &[(ScopeKind::Region, "denominazione_regione")],
};

pub static ITALY_PROVINCE: ColumnSchema = ColumnSchema {
    columns: &[
        col("data", Date),
        col("stato", Text),
        col("codice_regione", Int),
        col("denominazione_regione", Text),
        col("codice_provincia", Int),
        col("denominazione_provincia", Text),
        col("sigla_provincia", Text),
        col("lat", Float),
        col("long", Float),
        count("totale_casi"),
    ],
    date_column: "data",
    status_column: Some("stato"),
    scope_columns: &[
        (ScopeKind::Region, "denominazione_regione"),
        (ScopeKind::Province, "denominazione_provincia"),
    ],
};

pub static WORLD: ColumnSchema = ColumnSchema {
    columns: &[
        col("Province/State", Text),
        col("Country/Region", Text),
        col("Last Update", Date),
        count("Confirmed"),
        count("Deaths"),
        count("Recovered"),
        col("Latitude", Float),
        col("Longitude", Float),
    ],
    date_column: "Last Update",
    status_column: None,
    scope_columns: &[
        (ScopeKind::Province, "Province/State"),
        (ScopeKind::Country, "Country/Region"),
    ],
};

impl ColumnSchema {
    pub fn for_dataset(kind: DatasetKind) -> &'static ColumnSchema {
        match kind {
            DatasetKind::ItalyCountry => &ITALY_COUNTRY,
            DatasetKind::ItalyRegions => &ITALY_REGION,
            DatasetKind::ItalyProvinces => &ITALY_PROVINCE,
            DatasetKind::World => &WORLD,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn scope_column(&self, kind: ScopeKind) -> Option<&'static str> {
        self.scope_columns
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, name)| *name)
    }

    /// Whether `name` may be the operand of an increment or ratio.
    pub fn is_numeric_operand(&self, name: &str) -> bool {
        if name == self.date_column || Some(name) == self.status_column {
            return false;
        }
        self.column(name).is_some_and(|c| c.ty.is_numeric())
    }
}

/// One parsed CSV row, cells in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Value>,
}

/// Typed, name-indexed access to a row through its schema.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    schema: &'static ColumnSchema,
    row: &'a Row,
}

impl<'a> RowView<'a> {
    pub fn new(schema: &'static ColumnSchema, row: &'a Row) -> Self {
        Self { schema, row }
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let idx = self.schema.index_of(name)?;
        self.row.cells.get(idx)
    }

    pub fn text(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn date(&self) -> Option<chrono::NaiveDate> {
        match self.get(self.schema.date_column)? {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}
