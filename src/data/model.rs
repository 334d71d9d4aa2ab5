use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// CellValue – a single cell of an ingested extract
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a delimited extract yields.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text field: integer, float, text, or null when empty.
    pub fn from_field(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        CellValue::Text(s.to_string())
    }

    /// Numeric view of the cell. NaN floats count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// `self - previous`, keeping integers integral. `None` when either side
    /// is not numeric.
    pub fn checked_sub(&self, previous: &CellValue) -> Option<CellValue> {
        match (self, previous) {
            (CellValue::Integer(c), CellValue::Integer(p)) => Some(match c.checked_sub(*p) {
                Some(delta) => CellValue::Integer(delta),
                None => CellValue::Float(*c as f64 - *p as f64),
            }),
            _ => Some(CellValue::Float(self.as_f64()? - previous.as_f64()?)),
        }
    }
}

// ---------------------------------------------------------------------------
// Period – a reporting month
// ---------------------------------------------------------------------------

/// Month abbreviations used as the `Mes_Ano` label, indexed by month - 1.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Label for a 1-based month number.
pub fn month_label(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_LABELS.get(idx).copied()
}

/// A `YYYY-MM` reporting period, stored as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    /// Strict `YYYY-MM` parse: four-digit year, dash, two-digit month.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return None;
        }
        if !bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit())
        {
            return None;
        }
        let year: i32 = s[0..4].parse().ok()?;
        let month: u32 = s[5..7].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    #[cfg(test)]
    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The `Mes_Ano` label of this period.
    pub fn label(&self) -> &'static str {
        // month() is always within 1..=12
        month_label(self.0.month()).unwrap_or_default()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

// ---------------------------------------------------------------------------
// RawTable – an extract as ingested
// ---------------------------------------------------------------------------

/// Rows of named, dynamically-typed columns exactly as read from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Every row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        RawTable {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PreparedTable – institution/year restricted, sorted, month-labelled
// ---------------------------------------------------------------------------

/// One row of a prepared table.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    pub period: Period,
    /// `Mes_Ano` label derived from `period`.
    pub month: &'static str,
    /// One cell per entry of [`PreparedTable::columns`].
    pub values: Vec<CellValue>,
}

/// A dataset ready for filtering and charting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedTable {
    /// Value columns, in the order they were requested.
    pub columns: Vec<String>,
    pub rows: Vec<PreparedRow>,
}

/// A prepared table after the month filter. Same shape, fewer rows.
pub type FilteredTable = PreparedTable;

impl PreparedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over one column's cells. `None` when the column is absent.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r.values[idx]))
    }

    /// Month labels of every row, in row order.
    pub fn month_labels(&self) -> Vec<&'static str> {
        self.rows.iter().map(|r| r.month).collect()
    }

    /// Distinct month labels in order of first appearance.
    pub fn unique_month_labels(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.month) {
                seen.push(row.month);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
