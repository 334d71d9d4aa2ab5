use anyhow::{Context, Result};

use crate::data::aggregate::{
    category_rate, column_total, distinct_values, group_sum, numeric_series, percentage_shares,
    rate, reindex, slice_by, NullPolicy, AGE_BANDS,
};
use crate::data::dashboard::DashboardData;
use crate::data::datasets::{
    DatasetKind, DatasetSpec, ADMISSIONS, AGE_BAND, BIRTH_NOTICES, CESAREANS, DEATHS, DIAGNOSIS,
    FIRST_CONSULTATIONS, NASCER_UTENTE, SEX, SUBSEQUENT_CONSULTATIONS, TOTAL_BIRTHS,
};
use crate::data::filter::{filter_by_months, MonthSelection};
use crate::data::model::FilteredTable;

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// One named series, aligned with the chart's month axis. `None` is a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Series plotted against month labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyChart {
    pub months: Vec<&'static str>,
    pub series: Vec<Series>,
}

fn column(table: &FilteredTable, name: &str, policy: NullPolicy) -> Result<Vec<Option<f64>>> {
    numeric_series(table, name, policy).with_context(|| format!("column '{name}' not found"))
}

/// One line per value column of the dataset, honouring its null policies.
pub fn monthly_lines(table: &FilteredTable, spec: &DatasetSpec) -> Result<MonthlyChart> {
    let series = spec
        .value_columns
        .iter()
        .map(|&name| {
            Ok(Series {
                name: name.to_string(),
                values: column(table, name, spec.null_policy(name))?,
            })
        })
        .collect::<Result<_>>()?;
    Ok(MonthlyChart {
        months: table.month_labels(),
        series,
    })
}

/// Monthly share of first vs. subsequent consultations, in percent.
pub fn consultation_shares(table: &FilteredTable) -> Result<MonthlyChart> {
    let parts = [
        column(table, FIRST_CONSULTATIONS, NullPolicy::Keep)?,
        column(table, SUBSEQUENT_CONSULTATIONS, NullPolicy::Keep)?,
    ];
    let mut shares = percentage_shares(&parts).into_iter();
    let mut next = |name: &str| Series {
        name: name.to_string(),
        values: shares.next().unwrap_or_default(),
    };
    Ok(MonthlyChart {
        months: table.month_labels(),
        series: vec![next("Primeiras Consultas"), next("Consultas Subsequentes")],
    })
}

/// Vaginal births vs. cesareans per month, as counts and as shares of the
/// month's total births.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BirthMix {
    pub counts: MonthlyChart,
    pub shares: MonthlyChart,
}

pub fn birth_mix(table: &FilteredTable) -> Result<BirthMix> {
    let total = column(table, TOTAL_BIRTHS, NullPolicy::Keep)?;
    let cesareans = column(table, CESAREANS, NullPolicy::Keep)?;
    let vaginal: Vec<Option<f64>> = total
        .iter()
        .zip(&cesareans)
        .map(|(t, c)| Some((*t)? - (*c)?))
        .collect();

    let names = ["Partos Vaginais", "Cesarianas"];
    let parts = [vaginal, cesareans];
    let shares = percentage_shares(&parts);
    let months = table.month_labels();
    let chart = |values: Vec<Vec<Option<f64>>>| MonthlyChart {
        months: months.clone(),
        series: names
            .iter()
            .zip(values)
            .map(|(name, values)| Series {
                name: name.to_string(),
                values,
            })
            .collect(),
    };
    Ok(BirthMix {
        counts: chart(parts.to_vec()),
        shares: chart(shares),
    })
}

/// Birth notices vs. "Nascer Utente" registrations per month.
pub fn birth_registrations(table: &FilteredTable) -> Result<MonthlyChart> {
    Ok(MonthlyChart {
        months: table.month_labels(),
        series: vec![
            Series {
                name: "Notícias de Nascimento".to_string(),
                values: column(table, BIRTH_NOTICES, NullPolicy::Keep)?,
            },
            Series {
                name: "Nascer Utente".to_string(),
                values: column(table, NASCER_UTENTE, NullPolicy::Keep)?,
            },
        ],
    })
}

// ---------------------------------------------------------------------------
// Mortality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisRow {
    pub diagnosis: String,
    pub admissions: f64,
    pub deaths: f64,
    /// Deaths per 100 admissions; 0 without admissions.
    pub lethality: f64,
}

/// Admissions, deaths and lethality per diagnosis, most admissions first.
pub fn lethality_by_diagnosis(table: &FilteredTable) -> Result<Vec<DiagnosisRow>> {
    let sums = group_sum(table, DIAGNOSIS, &[ADMISSIONS, DEATHS])
        .context("mortality extract lacks diagnosis, admission or death columns")?;
    let mut rows: Vec<DiagnosisRow> = sums
        .groups
        .into_iter()
        .map(|(diagnosis, v)| DiagnosisRow {
            diagnosis,
            admissions: v[0],
            deaths: v[1],
            lethality: rate(v[1], v[0]),
        })
        .collect();
    rows.sort_by(|a, b| b.admissions.total_cmp(&a.admissions));
    Ok(rows)
}

/// Admissions and deaths of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBar {
    pub label: String,
    pub admissions: f64,
    pub deaths: f64,
}

/// Sex and age-band distribution of a single diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisBreakdown {
    pub diagnosis: String,
    pub lethality: f64,
    pub by_sex: Vec<GroupBar>,
    /// Always the seven age bands, youngest first.
    pub by_age_band: Vec<GroupBar>,
}

pub fn diagnosis_breakdown(table: &FilteredTable, diagnosis: &str) -> Result<DiagnosisBreakdown> {
    let slice = slice_by(table, DIAGNOSIS, diagnosis).context("diagnosis column not found")?;
    let lethality = category_rate(table, DIAGNOSIS, diagnosis, DEATHS, ADMISSIONS)
        .context("admissions or deaths column not found")?;

    let by_sex = group_sum(&slice, SEX, &[ADMISSIONS, DEATHS])
        .context("sex column not found")?
        .groups
        .into_iter()
        .map(|(label, v)| GroupBar {
            label,
            admissions: v[0],
            deaths: v[1],
        })
        .collect();

    let ages = group_sum(&slice, AGE_BAND, &[ADMISSIONS, DEATHS])
        .context("age band column not found")?;
    let by_age_band = reindex(&ages, &AGE_BANDS)
        .into_iter()
        .map(|(band, v)| GroupBar {
            label: band.to_string(),
            admissions: v[0],
            deaths: v[1],
        })
        .collect();

    Ok(DiagnosisBreakdown {
        diagnosis: diagnosis.to_string(),
        lethality,
        by_sex,
        by_age_band,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MortalityView {
    pub total_deaths: f64,
    pub by_diagnosis: Vec<DiagnosisRow>,
    /// Sorted diagnoses offered by the selector.
    pub diagnoses: Vec<String>,
    /// Breakdown of the selected diagnosis; `None` when there is none.
    pub breakdown: Option<DiagnosisBreakdown>,
}

/// Mortality tab data. `selected` falls back to the first diagnosis when it
/// is absent from the filtered rows.
pub fn mortality_view(table: &FilteredTable, selected: Option<&str>) -> Result<MortalityView> {
    let diagnoses = distinct_values(table, DIAGNOSIS).context("diagnosis column not found")?;
    let chosen = selected
        .filter(|d| diagnoses.iter().any(|x| x == d))
        .or_else(|| diagnoses.first().map(String::as_str));
    let breakdown = chosen
        .map(|d| diagnosis_breakdown(table, d))
        .transpose()?;

    Ok(MortalityView {
        total_deaths: column_total(table, DEATHS).context("deaths column not found")?,
        by_diagnosis: lethality_by_diagnosis(table)?,
        diagnoses,
        breakdown,
    })
}

// ---------------------------------------------------------------------------
// ReportView – everything the tabs draw for one selection
// ---------------------------------------------------------------------------

/// Chart data of one tab section, or the reason it cannot be drawn.
pub type Section<T> = std::result::Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub triage: Section<MonthlyChart>,
    pub emergency: Section<MonthlyChart>,
    pub consultations: Section<MonthlyChart>,
    pub surgeries: Section<MonthlyChart>,
    pub mortality: Section<MortalityView>,
    pub births: Section<BirthMix>,
    pub registrations: Section<MonthlyChart>,
}

fn section<T>(
    data: &DashboardData,
    kind: DatasetKind,
    months: &MonthSelection,
    build: impl FnOnce(&FilteredTable) -> Result<T>,
) -> Section<T> {
    let table = data.get(kind).ok_or_else(|| match data.failure(kind) {
        Some(msg) => msg.to_string(),
        None => format!("{kind}: sem dados"),
    })?;
    build(&filter_by_months(table, months)).map_err(|e| format!("{kind}: {e:#}"))
}

impl ReportView {
    /// Filter every extract by the selected months and aggregate each tab.
    pub fn build(data: &DashboardData, months: &MonthSelection, diagnosis: Option<&str>) -> Self {
        use DatasetKind::*;
        ReportView {
            triage: section(data, ManchesterTriage, months, |t| {
                monthly_lines(t, ManchesterTriage.spec())
            }),
            emergency: section(data, EmergencyType, months, |t| {
                monthly_lines(t, EmergencyType.spec())
            }),
            consultations: section(data, Consultations, months, consultation_shares),
            surgeries: section(data, Surgeries, months, |t| monthly_lines(t, Surgeries.spec())),
            mortality: section(data, Mortality, months, |t| mortality_view(t, diagnosis)),
            births: section(data, Childbirths, months, birth_mix),
            registrations: section(data, BirthRegistration, months, birth_registrations),
        }
    }

    /// The diagnosis the mortality breakdown currently shows.
    pub fn selected_diagnosis(&self) -> Option<&str> {
        self.mortality
            .as_ref()
            .ok()?
            .breakdown
            .as_ref()
            .map(|b| b.diagnosis.as_str())
    }
}
