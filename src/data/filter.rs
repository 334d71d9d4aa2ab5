use std::collections::BTreeSet;

use super::model::{FilteredTable, PreparedTable};

// ---------------------------------------------------------------------------
// Month selection shared by every tab
// ---------------------------------------------------------------------------

/// Selected `Mes_Ano` labels. An empty set selects nothing.
pub type MonthSelection = BTreeSet<&'static str>;

/// Initialise a [`MonthSelection`] with every given label selected.
pub fn select_all(labels: &[&'static str]) -> MonthSelection {
    labels.iter().copied().collect()
}

/// Keep the rows whose month label is selected. Row order and columns are
/// unchanged.
pub fn filter_by_months(table: &PreparedTable, selected: &MonthSelection) -> FilteredTable {
    PreparedTable {
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .filter(|row| selected.contains(row.month))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Period, PreparedRow};

    fn table() -> PreparedTable {
        let rows = (1..=4)
            .map(|m| {
                let period = Period::from_ym(2024, m).unwrap();
                PreparedRow {
                    period,
                    month: period.label(),
                    values: vec![CellValue::Integer(m as i64)],
                }
            })
            .collect();
        PreparedTable {
            columns: vec!["Total".into()],
            rows,
        }
    }

    #[test]
    fn keeps_selected_months_in_order() {
        let selected: MonthSelection = ["Abr", "Jan", "Mar"].into_iter().collect();
        let filtered = filter_by_months(&table(), &selected);
        assert_eq!(filtered.month_labels(), vec!["Jan", "Mar", "Abr"]);
        assert_eq!(filtered.columns, vec!["Total"]);
    }

    #[test]
    fn empty_selection_yields_empty_table() {
        let filtered = filter_by_months(&table(), &MonthSelection::new());
        assert!(filtered.is_empty());
        assert_eq!(filtered.columns, vec!["Total"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let selected: MonthSelection = ["Fev", "Mar"].into_iter().collect();
        let once = filter_by_months(&table(), &selected);
        let twice = filter_by_months(&once, &selected);
        assert_eq!(once, twice);
    }

    #[test]
    fn select_all_selects_every_label() {
        let t = table();
        let selected = select_all(&t.unique_month_labels());
        assert_eq!(filter_by_months(&t, &selected), t);
    }
}
