use thiserror::Error;

use super::model::{CellValue, Period, PreparedRow, PreparedTable, RawTable};

/// Name of the period column in every extract.
pub const PERIOD_COLUMN: &str = "Período";

/// The single reporting year the dashboard covers.
pub const REPORT_YEAR: i32 = 2024;

/// Errors that abort preparation of a whole dataset.
#[derive(Debug, Error, PartialEq)]
pub enum PrepareError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("row {row}: period '{value}' does not match YYYY-MM")]
    InvalidPeriod { row: usize, value: String },
}

/// What to keep from a raw extract and how.
#[derive(Debug, Clone)]
pub struct PrepareParams<'a> {
    pub value_columns: &'a [&'a str],
    pub institution_column: &'a str,
    /// Matched case-insensitively as a substring.
    pub institution: &'a str,
    pub year: i32,
    /// Convert cumulative counters into monthly increments.
    pub apply_diff: bool,
}

/// Restrict a raw extract to one institution and year, sort it by period,
/// optionally difference the value columns, and label each row's month.
///
/// The raw table is not modified.
pub fn prepare(raw: &RawTable, params: &PrepareParams<'_>) -> Result<PreparedTable, PrepareError> {
    let column = |name: &str| {
        raw.column_index(name)
            .ok_or_else(|| PrepareError::MissingColumn(name.to_string()))
    };
    let institution_idx = column(params.institution_column)?;
    let period_idx = column(PERIOD_COLUMN)?;
    let value_idx = params
        .value_columns
        .iter()
        .map(|c| column(*c))
        .collect::<Result<Vec<_>, _>>()?;

    let needle = params.institution.to_lowercase();

    let mut rows = Vec::new();
    for (row_no, raw_row) in raw.rows.iter().enumerate() {
        let matches_institution = raw_row[institution_idx]
            .as_text()
            .is_some_and(|name| name.to_lowercase().contains(&needle));
        if !matches_institution {
            continue;
        }

        let period = match &raw_row[period_idx] {
            cell if cell.is_null() => continue,
            CellValue::Text(s) => Period::parse(s),
            _ => None,
        }
        .ok_or_else(|| PrepareError::InvalidPeriod {
            row: row_no,
            value: raw_row[period_idx].to_string(),
        })?;

        rows.push(PreparedRow {
            period,
            month: period.label(),
            values: value_idx.iter().map(|&i| raw_row[i].clone()).collect(),
        });
    }

    rows.sort_by_key(|r| r.period);
    rows.retain(|r| r.period.year() == params.year);

    if params.apply_diff {
        difference(&mut rows);
    }

    Ok(PreparedTable {
        columns: params.value_columns.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

/// Replace each value with its difference from the previous row. The first
/// row, and any cell without a numeric predecessor, keeps its raw value.
fn difference(rows: &mut [PreparedRow]) {
    let mut previous: Option<Vec<CellValue>> = None;
    for row in rows.iter_mut() {
        let raw = row.values.clone();
        if let Some(prev) = &previous {
            for (cell, before) in row.values.iter_mut().zip(prev) {
                if let Some(delta) = cell.checked_sub(before) {
                    *cell = delta;
                }
            }
        }
        previous = Some(raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn raw(rows: &[(&str, &str, CellValue)]) -> RawTable {
        let mut table = RawTable::new(vec![
            "Instituição".to_string(),
            PERIOD_COLUMN.to_string(),
            "Total".to_string(),
        ]);
        for (inst, period, value) in rows {
            table
                .rows
                .push(vec![text(inst), text(period), value.clone()]);
        }
        table
    }

    fn params(apply_diff: bool) -> PrepareParams<'static> {
        PrepareParams {
            value_columns: &["Total"],
            institution_column: "Instituição",
            institution: "Guarda",
            year: REPORT_YEAR,
            apply_diff,
        }
    }

    fn totals(table: &PreparedTable) -> Vec<CellValue> {
        table.column("Total").unwrap().cloned().collect()
    }

    #[test]
    fn keeps_institution_and_year_and_labels_months() {
        let input = raw(&[
            ("Guarda Hospital", "2024-02", CellValue::Integer(2)),
            ("Lisboa Hospital", "2024-01", CellValue::Integer(9)),
            ("Guarda Hospital", "2023-12", CellValue::Integer(7)),
            ("Guarda Hospital", "2024-03", CellValue::Integer(3)),
            ("Lisboa Hospital", "2024-02", CellValue::Integer(9)),
            ("Guarda Hospital", "2024-01", CellValue::Integer(1)),
        ]);
        let before = input.clone();

        let table = prepare(&input, &params(false)).unwrap();
        assert_eq!(table.month_labels(), vec!["Jan", "Fev", "Mar"]);
        assert_eq!(
            totals(&table),
            vec![
                CellValue::Integer(1),
                CellValue::Integer(2),
                CellValue::Integer(3)
            ]
        );
        assert!(table.rows.iter().all(|r| r.period.year() == 2024));
        assert!(table.rows.windows(2).all(|w| w[0].period <= w[1].period));
        assert_eq!(input, before);
    }

    #[test]
    fn institution_match_is_case_insensitive_and_skips_missing() {
        let mut input = raw(&[
            ("ULS DA GUARDA", "2024-01", CellValue::Integer(1)),
            ("uls da guarda", "2024-02", CellValue::Integer(2)),
        ]);
        input.rows.push(vec![
            CellValue::Null,
            text("2024-03"),
            CellValue::Integer(3),
        ]);
        input.rows.push(vec![
            CellValue::Integer(5),
            text("2024-04"),
            CellValue::Integer(4),
        ]);

        let table = prepare(&input, &params(false)).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn differencing_keeps_first_row_and_negative_steps() {
        let input = raw(&[
            ("Guarda", "2024-01", CellValue::Integer(100)),
            ("Guarda", "2024-02", CellValue::Integer(150)),
            ("Guarda", "2024-03", CellValue::Integer(130)),
        ]);
        let table = prepare(&input, &params(true)).unwrap();
        assert_eq!(
            totals(&table),
            vec![
                CellValue::Integer(100),
                CellValue::Integer(50),
                CellValue::Integer(-20)
            ]
        );
    }

    #[test]
    fn differencing_runs_after_sort_and_year_restriction() {
        let input = raw(&[
            ("Guarda", "2024-02", CellValue::Integer(30)),
            ("Guarda", "2023-12", CellValue::Integer(500)),
            ("Guarda", "2024-01", CellValue::Integer(10)),
        ]);
        let table = prepare(&input, &params(true)).unwrap();
        assert_eq!(
            totals(&table),
            vec![CellValue::Integer(10), CellValue::Integer(20)]
        );
    }

    #[test]
    fn differencing_around_missing_values_keeps_raw_cells() {
        let input = raw(&[
            ("Guarda", "2024-01", CellValue::Integer(10)),
            ("Guarda", "2024-02", CellValue::Null),
            ("Guarda", "2024-03", CellValue::Integer(25)),
            ("Guarda", "2024-04", CellValue::Float(40.0)),
        ]);
        let table = prepare(&input, &params(true)).unwrap();
        assert_eq!(
            totals(&table),
            vec![
                CellValue::Integer(10),
                CellValue::Null,
                CellValue::Integer(25),
                CellValue::Float(15.0)
            ]
        );
    }

    #[test]
    fn rows_without_period_are_dropped() {
        let mut input = raw(&[
            ("Guarda", "2024-01", CellValue::Integer(10)),
            ("Guarda", "2024-02", CellValue::Integer(25)),
        ]);
        input.rows.insert(
            1,
            vec![text("Guarda"), CellValue::Null, CellValue::Integer(99)],
        );

        let table = prepare(&input, &params(true)).unwrap();
        assert_eq!(table.month_labels(), vec!["Jan", "Fev"]);
        assert_eq!(
            totals(&table),
            vec![CellValue::Integer(10), CellValue::Integer(15)]
        );
    }

    #[test]
    fn malformed_period_is_fatal() {
        let input = raw(&[
            ("Guarda", "2024-01", CellValue::Integer(1)),
            ("Guarda", "01/2024", CellValue::Integer(2)),
        ]);
        assert_eq!(
            prepare(&input, &params(false)),
            Err(PrepareError::InvalidPeriod {
                row: 1,
                value: "01/2024".into()
            })
        );
    }

    #[test]
    fn malformed_period_of_other_institution_is_ignored() {
        let input = raw(&[
            ("Guarda", "2024-01", CellValue::Integer(1)),
            ("Lisboa", "garbage", CellValue::Integer(2)),
        ]);
        assert_eq!(prepare(&input, &params(false)).unwrap().len(), 1);
    }

    #[test]
    fn missing_value_column_is_reported() {
        let input = raw(&[("Guarda", "2024-01", CellValue::Integer(1))]);
        let p = PrepareParams {
            value_columns: &["Total", "Nº Cesarianas"],
            ..params(false)
        };
        assert_eq!(
            prepare(&input, &p),
            Err(PrepareError::MissingColumn("Nº Cesarianas".into()))
        );
    }

    #[test]
    fn extracts_only_requested_columns_in_order() {
        let mut input = RawTable::new(vec![
            "A".into(),
            "Entidade".into(),
            PERIOD_COLUMN.into(),
            "B".into(),
        ]);
        input.rows.push(vec![
            CellValue::Integer(1),
            text("Guarda"),
            text("2024-06"),
            CellValue::Integer(2),
        ]);
        let p = PrepareParams {
            value_columns: &["B", "A"],
            institution_column: "Entidade",
            ..params(false)
        };
        let table = prepare(&input, &p).unwrap();
        assert_eq!(table.columns, vec!["B", "A"]);
        assert_eq!(
            table.rows[0].values,
            vec![CellValue::Integer(2), CellValue::Integer(1)]
        );
        assert_eq!(table.rows[0].month, "Jun");
    }
}
