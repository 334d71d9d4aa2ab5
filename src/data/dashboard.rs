use std::collections::BTreeMap;

use anyhow::{Context, Result};

use super::datasets::{DatasetKind, DatasetSpec};
use super::loader::load_file;
use super::model::{PreparedTable, RawTable, MONTH_LABELS};
use super::prepare::{prepare, PrepareParams};
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// DashboardData – every prepared extract, built once per load
// ---------------------------------------------------------------------------

/// The prepared tables behind every tab. Built once from disk and only read
/// afterwards; extracts that failed to load or prepare are kept as messages.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    tables: BTreeMap<DatasetKind, PreparedTable>,
    failures: BTreeMap<DatasetKind, String>,
}

/// Prepare one raw extract according to its catalogue entry.
pub fn prepare_dataset(
    raw: &RawTable,
    spec: &DatasetSpec,
    config: &DashboardConfig,
) -> Result<PreparedTable> {
    let params = PrepareParams {
        value_columns: spec.value_columns,
        institution_column: spec.institution_column,
        institution: &config.institution,
        year: config.year,
        apply_diff: spec.apply_diff,
    };
    prepare(raw, &params).with_context(|| format!("preparing {}", spec.file_name))
}

impl DashboardData {
    /// Read and prepare all seven extracts from `config.data_dir`.
    pub fn load(config: &DashboardConfig) -> Self {
        log::info!("Loading extracts from {}", config.data_dir.display());
        Self::from_raw(
            DatasetKind::ALL.into_iter().map(|kind| {
                let path = config.data_dir.join(kind.spec().file_name);
                (kind, load_file(&path))
            }),
            config,
        )
    }

    /// Prepare already-read extracts. A failed read or preparation marks the
    /// dataset as failed without affecting the others.
    pub fn from_raw(
        raw: impl IntoIterator<Item = (DatasetKind, Result<RawTable>)>,
        config: &DashboardConfig,
    ) -> Self {
        let mut data = DashboardData::default();
        for (kind, raw) in raw {
            match raw.and_then(|table| prepare_dataset(&table, kind.spec(), config)) {
                Ok(table) => {
                    if table.is_empty() {
                        log::warn!(
                            "{kind}: no rows for '{}' in {}",
                            config.institution,
                            config.year
                        );
                    }
                    log::info!("{kind}: {} rows prepared", table.len());
                    data.tables.insert(kind, table);
                }
                Err(e) => {
                    log::error!("{kind}: {e:#}");
                    data.failures.insert(kind, format!("{e:#}"));
                }
            }
        }
        data
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&PreparedTable> {
        self.tables.get(&kind)
    }

    pub fn failure(&self, kind: DatasetKind) -> Option<&str> {
        self.failures.get(&kind).map(String::as_str)
    }

    pub fn failures(&self) -> impl Iterator<Item = (DatasetKind, &str)> {
        self.failures.iter().map(|(k, msg)| (*k, msg.as_str()))
    }

    pub fn loaded(&self) -> impl Iterator<Item = (DatasetKind, &PreparedTable)> {
        self.tables.iter().map(|(k, t)| (*k, t))
    }

    /// Month labels offered by the month selector: those of the primary
    /// extract in order of appearance, or, if it is unavailable, every month
    /// present in any loaded extract in calendar order.
    pub fn available_months(&self) -> Vec<&'static str> {
        if let Some(primary) = self.get(DatasetKind::PRIMARY) {
            return primary.unique_month_labels();
        }
        MONTH_LABELS
            .iter()
            .copied()
            .filter(|label| {
                self.tables
                    .values()
                    .any(|t| t.rows.iter().any(|r| r.month == *label))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datasets::{BIRTH_NOTICES, ENTITY, NASCER_UTENTE};
    use crate::data::loader::read_delimited;
    use crate::data::model::CellValue;
    use std::fs;

    fn births_csv() -> String {
        format!(
            "Período;{ENTITY};{BIRTH_NOTICES};{NASCER_UTENTE}\n\
             2024-02;ULS da Guarda;30;28\n\
             2024-01;ULS da Guarda;25;20\n\
             2024-01;ULS de Viseu;90;88\n"
        )
    }

    #[test]
    fn load_reads_present_extracts_and_reports_missing_ones() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path()
                .join(DatasetKind::BirthRegistration.spec().file_name),
            births_csv(),
        )?;
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            ..DashboardConfig::default()
        };

        let data = DashboardData::load(&config);
        let births = data.get(DatasetKind::BirthRegistration).unwrap();
        assert_eq!(births.month_labels(), vec!["Jan", "Fev"]);
        assert_eq!(
            births.column(BIRTH_NOTICES).unwrap().cloned().collect::<Vec<_>>(),
            vec![CellValue::Integer(25), CellValue::Integer(30)]
        );

        assert_eq!(data.failures().count(), 6);
        assert!(data.failure(DatasetKind::Mortality).is_some());
        assert!(data.get(DatasetKind::ManchesterTriage).is_none());
        Ok(())
    }

    #[test]
    fn months_fall_back_to_loaded_extracts_without_primary() -> Result<()> {
        let config = DashboardConfig::default();
        let data = DashboardData::from_raw(
            [(
                DatasetKind::BirthRegistration,
                read_delimited(births_csv().as_bytes()),
            )],
            &config,
        );
        assert_eq!(data.available_months(), vec!["Jan", "Fev"]);
        Ok(())
    }

    #[test]
    fn missing_columns_mark_the_dataset_failed() {
        let config = DashboardConfig::default();
        let data = DashboardData::from_raw(
            [(
                DatasetKind::Childbirths,
                read_delimited("Período;Instituição\n2024-01;Guarda\n".as_bytes()),
            )],
            &config,
        );
        assert!(data.get(DatasetKind::Childbirths).is_none());
        assert!(data
            .failure(DatasetKind::Childbirths)
            .unwrap()
            .contains("Nº Total de Partos"));
    }
}
