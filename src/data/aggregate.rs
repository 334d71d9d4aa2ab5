use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, PreparedTable};

/// How missing cells of a numeric column are charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// Leave missing cells as gaps.
    #[default]
    Keep,
    /// Treat missing cells as zero.
    FillZero,
}

impl NullPolicy {
    pub fn apply(self, cell: &CellValue) -> Option<f64> {
        match (cell.as_f64(), self) {
            (Some(v), _) => Some(v),
            (None, NullPolicy::FillZero) => Some(0.0),
            (None, NullPolicy::Keep) => None,
        }
    }
}

/// One numeric column of a table as chartable values. `None` when the column
/// is absent.
pub fn numeric_series(
    table: &PreparedTable,
    column: &str,
    policy: NullPolicy,
) -> Option<Vec<Option<f64>>> {
    Some(table.column(column)?.map(|c| policy.apply(c)).collect())
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// `numerator / denominator * 100`, or 0 when the denominator is zero.
pub fn rate(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator * 100.0;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Row-wise percentage of each part over the sum of all parts.
///
/// `parts[i][row]` is part `i` of `row`; the result has the same shape. A row
/// where any part is missing yields missing shares. A row whose parts sum to
/// zero yields 0 for every part.
pub fn percentage_shares(parts: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    let n_rows = parts.iter().map(Vec::len).min().unwrap_or(0);
    let totals: Vec<Option<f64>> = (0..n_rows)
        .map(|row| parts.iter().map(|p| p[row]).sum::<Option<f64>>())
        .collect();

    parts
        .iter()
        .map(|part| {
            (0..n_rows)
                .map(|row| Some(rate(part[row]?, totals[row]?)))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Group-by
// ---------------------------------------------------------------------------

/// Sums of numeric columns per distinct key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSums {
    pub columns: Vec<String>,
    /// key → one sum per entry of `columns`, in ascending key order.
    pub groups: BTreeMap<String, Vec<f64>>,
}

#[cfg(test)]
impl GroupSums {
    /// Sum of `column` for `key`; `None` if either is unknown.
    pub fn get(&self, key: &str, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.groups.get(key).map(|sums| sums[idx])
    }
}

fn group_key(cell: &CellValue) -> Option<String> {
    if cell.is_null() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Group rows by `key` and sum `columns` per group. Rows with a null key are
/// dropped; null values are skipped.
pub fn group_sum(table: &PreparedTable, key: &str, columns: &[&str]) -> Option<GroupSums> {
    let key_idx = table.column_index(key)?;
    let value_idx = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Option<Vec<_>>>()?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        let Some(k) = group_key(&row.values[key_idx]) else {
            continue;
        };
        let sums = groups.entry(k).or_insert_with(|| vec![0.0; columns.len()]);
        for (sum, &i) in sums.iter_mut().zip(&value_idx) {
            *sum += row.values[i].as_f64().unwrap_or(0.0);
        }
    }

    Some(GroupSums {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        groups,
    })
}

/// Age bands of the mortality extract, youngest first.
pub const AGE_BANDS: [&str; 7] = [
    "[0-1[", "[1-5[", "[5-15[", "[15-25[", "[25-45[", "[45-65[", "[65-120[",
];

/// Reorder groups into a fixed category sequence. Every category appears
/// exactly once, with zero sums when it has no rows; keys outside `order`
/// are dropped.
pub fn reindex(sums: &GroupSums, order: &[&'static str]) -> Vec<(&'static str, Vec<f64>)> {
    order
        .iter()
        .map(|&category| {
            let values = sums
                .groups
                .get(category)
                .cloned()
                .unwrap_or_else(|| vec![0.0; sums.columns.len()]);
            (category, values)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scalars and slices
// ---------------------------------------------------------------------------

/// Sum of a numeric column, skipping missing values.
pub fn column_total(table: &PreparedTable, column: &str) -> Option<f64> {
    Some(table.column(column)?.filter_map(CellValue::as_f64).sum())
}

/// Rows whose `column` renders as `value`.
pub fn slice_by(table: &PreparedTable, column: &str, value: &str) -> Option<PreparedTable> {
    let idx = table.column_index(column)?;
    Some(PreparedTable {
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .filter(|r| group_key(&r.values[idx]).as_deref() == Some(value))
            .cloned()
            .collect(),
    })
}

/// Rate of `numerator` over `denominator` summed over the rows of one
/// category.
pub fn category_rate(
    table: &PreparedTable,
    key: &str,
    category: &str,
    numerator: &str,
    denominator: &str,
) -> Option<f64> {
    let slice = slice_by(table, key, category)?;
    Some(rate(
        column_total(&slice, numerator)?,
        column_total(&slice, denominator)?,
    ))
}

/// Sorted distinct non-null values of a column.
pub fn distinct_values(table: &PreparedTable, column: &str) -> Option<Vec<String>> {
    let values: BTreeSet<String> = table.column(column)?.filter_map(group_key).collect();
    Some(values.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Period, PreparedRow};

    fn mortality(rows: &[(&str, &str, &str, i64, i64)]) -> PreparedTable {
        let period = Period::from_ym(2024, 1).unwrap();
        PreparedTable {
            columns: vec![
                "Descrição".into(),
                "Sexo".into(),
                "Faixa Etária".into(),
                "Internamentos".into(),
                "Óbitos".into(),
            ],
            rows: rows
                .iter()
                .map(|&(diag, sex, band, admissions, deaths)| PreparedRow {
                    period,
                    month: period.label(),
                    values: vec![
                        CellValue::Text(diag.into()),
                        CellValue::Text(sex.into()),
                        CellValue::Text(band.into()),
                        CellValue::Integer(admissions),
                        CellValue::Integer(deaths),
                    ],
                })
                .collect(),
        }
    }

    #[test]
    fn rate_with_zero_denominator_is_zero() {
        assert_eq!(rate(2.0, 10.0), 20.0);
        assert_eq!(rate(0.0, 0.0), 0.0);
        assert_eq!(rate(5.0, 0.0), 0.0);
    }

    #[test]
    fn lethality_per_group_never_nan() {
        let t = mortality(&[
            ("Circulatório", "M", "[65-120[", 6, 1),
            ("Circulatório", "F", "[45-65[", 4, 1),
            ("Gravidez", "F", "[25-45[", 0, 0),
        ]);
        let sums = group_sum(&t, "Descrição", &["Internamentos", "Óbitos"]).unwrap();
        let rates: Vec<f64> = sums
            .groups
            .values()
            .map(|v| rate(v[1], v[0]))
            .collect();
        assert_eq!(rates, vec![20.0, 0.0]);
    }

    #[test]
    fn group_sum_skips_null_keys_and_values() {
        let mut t = mortality(&[("A", "M", "[0-1[", 1, 0), ("B", "F", "[0-1[", 2, 1)]);
        t.rows[1].values[3] = CellValue::Null;
        let mut extra = t.rows[0].clone();
        extra.values[0] = CellValue::Null;
        t.rows.push(extra);

        let sums = group_sum(&t, "Descrição", &["Internamentos"]).unwrap();
        assert_eq!(sums.groups.len(), 2);
        assert_eq!(sums.get("A", "Internamentos"), Some(1.0));
        assert_eq!(sums.get("B", "Internamentos"), Some(0.0));
        assert_eq!(sums.get("C", "Internamentos"), None);
    }

    #[test]
    fn group_sum_unknown_column_is_none() {
        let t = mortality(&[("A", "M", "[0-1[", 1, 0)]);
        assert!(group_sum(&t, "Idade", &["Óbitos"]).is_none());
        assert!(group_sum(&t, "Sexo", &["Altas"]).is_none());
    }

    #[test]
    fn age_bands_are_reindexed_in_fixed_order() {
        let t = mortality(&[
            ("A", "M", "[65-120[", 10, 3),
            ("A", "F", "[1-5[", 2, 0),
            ("A", "F", "[65-120[", 5, 1),
            ("A", "F", "desconhecido", 1, 1),
        ]);
        let sums = group_sum(&t, "Faixa Etária", &["Internamentos", "Óbitos"]).unwrap();
        let bands = reindex(&sums, &AGE_BANDS);

        assert_eq!(bands.len(), 7);
        let order: Vec<&str> = bands.iter().map(|(b, _)| *b).collect();
        assert_eq!(order, AGE_BANDS.to_vec());
        assert_eq!(bands[1].1, vec![2.0, 0.0]);
        assert_eq!(bands[6].1, vec![15.0, 4.0]);
        assert_eq!(bands[0].1, vec![0.0, 0.0]);
    }

    #[test]
    fn percentage_shares_per_row() {
        let first = vec![Some(30.0), Some(0.0), None];
        let subsequent = vec![Some(70.0), Some(0.0), Some(4.0)];
        let shares = percentage_shares(&[first, subsequent]);
        assert_eq!(shares[0], vec![Some(30.0), Some(0.0), None]);
        assert_eq!(shares[1], vec![Some(70.0), Some(0.0), None]);
    }

    #[test]
    fn category_rate_and_totals() {
        let t = mortality(&[
            ("Respiratório", "M", "[65-120[", 8, 2),
            ("Respiratório", "F", "[65-120[", 12, 3),
            ("Neoplasias", "F", "[45-65[", 0, 0),
        ]);
        assert_eq!(column_total(&t, "Óbitos"), Some(5.0));
        assert_eq!(
            category_rate(&t, "Descrição", "Respiratório", "Óbitos", "Internamentos"),
            Some(25.0)
        );
        assert_eq!(
            category_rate(&t, "Descrição", "Neoplasias", "Óbitos", "Internamentos"),
            Some(0.0)
        );
        assert_eq!(
            distinct_values(&t, "Descrição").unwrap(),
            vec!["Neoplasias", "Respiratório"]
        );
    }

    #[test]
    fn fill_zero_policy_replaces_missing_values() {
        let mut t = mortality(&[("A", "M", "[0-1[", 1, 0), ("A", "M", "[0-1[", 2, 0)]);
        t.rows[1].values[3] = CellValue::Null;
        assert_eq!(
            numeric_series(&t, "Internamentos", NullPolicy::Keep).unwrap(),
            vec![Some(1.0), None]
        );
        assert_eq!(
            numeric_series(&t, "Internamentos", NullPolicy::FillZero).unwrap(),
            vec![Some(1.0), Some(0.0)]
        );
    }
}
