use std::fmt;

use super::aggregate::NullPolicy;

// -- Column names as published in the extracts --

pub const INSTITUTION: &str = "Instituição";
pub const ENTITY: &str = "Entidade";

pub const TRIAGE_RED: &str = "Nº Atendimentos em Urgência SU Triagem Manchester -Vermelha";
pub const TRIAGE_ORANGE: &str = "Nº Atendimentos em Urgência SU Triagem Manchester -Laranja";
pub const TRIAGE_YELLOW: &str = "Nº Atendimentos em Urgência SU Triagem Manchester -Amarela";
pub const TRIAGE_GREEN: &str = "Nº Atendimentos em Urgência SU Triagem Manchester -Verde";
pub const TRIAGE_BLUE: &str = "Nº Atendimentos em Urgência SU Triagem Manchester -Azul";
pub const TRIAGE_WHITE: &str = "Nº Atendimentos em Urgência SU Triagem Manchester -Branca";
pub const TRIAGE_NONE: &str = "Nº Atendimentos s\\ Triagem Manchester";

pub const EMERGENCY_GENERAL: &str = "Urgências Geral";
pub const EMERGENCY_PEDIATRIC: &str = "Urgências Pediátricas";
pub const EMERGENCY_OBSTETRIC: &str = "Urgência Obstetricia";
pub const EMERGENCY_PSYCHIATRIC: &str = "Urgência Psiquiátrica";

pub const FIRST_CONSULTATIONS: &str = "Nº Primeiras Consultas";
pub const SUBSEQUENT_CONSULTATIONS: &str = "Nº Consultas Subsequentes";

pub const SURGERY_SCHEDULED: &str = "Nº Intervenções Cirúrgicas Programadas";
pub const SURGERY_CONVENTIONAL: &str = "Nº Intervenções Cirúrgicas Convencionais";
pub const SURGERY_AMBULATORY: &str = "Nº Intervenções Cirúrgicas de Ambulatório";
pub const SURGERY_URGENT: &str = "Nº Intervenções Cirúrgicas Urgentes";

pub const TOTAL_BIRTHS: &str = "Nº Total de Partos";
pub const CESAREANS: &str = "Nº Cesarianas";

pub const BIRTH_NOTICES: &str = "Nº Notícias Nascimento";
pub const NASCER_UTENTE: &str = "Nº de Nascer Utente";

pub const DEATHS: &str = "Óbitos";
pub const ADMISSIONS: &str = "Internamentos";
pub const DIAGNOSIS: &str = "Descrição Capítulo Diagnóstico Principal";
pub const SEX: &str = "Sexo";
pub const AGE_BAND: &str = "Faixa Etária";

// ---------------------------------------------------------------------------
// Dataset catalogue
// ---------------------------------------------------------------------------

/// The seven extracts the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    ManchesterTriage,
    EmergencyType,
    Consultations,
    Surgeries,
    Childbirths,
    BirthRegistration,
    Mortality,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 7] = [
        DatasetKind::ManchesterTriage,
        DatasetKind::EmergencyType,
        DatasetKind::Consultations,
        DatasetKind::Surgeries,
        DatasetKind::Childbirths,
        DatasetKind::BirthRegistration,
        DatasetKind::Mortality,
    ];

    /// The dataset whose months populate the month selector.
    pub const PRIMARY: DatasetKind = DatasetKind::ManchesterTriage;

    pub fn spec(self) -> &'static DatasetSpec {
        match self {
            DatasetKind::ManchesterTriage => &MANCHESTER_TRIAGE,
            DatasetKind::EmergencyType => &EMERGENCY_TYPE,
            DatasetKind::Consultations => &CONSULTATIONS,
            DatasetKind::Surgeries => &SURGERIES,
            DatasetKind::Childbirths => &CHILDBIRTHS,
            DatasetKind::BirthRegistration => &BIRTH_REGISTRATION,
            DatasetKind::Mortality => &MORTALITY,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().title)
    }
}

/// How one extract is located and prepared.
#[derive(Debug)]
pub struct DatasetSpec {
    pub title: &'static str,
    pub file_name: &'static str,
    pub institution_column: &'static str,
    pub value_columns: &'static [&'static str],
    /// Whether the value columns are cumulative counters to difference.
    pub apply_diff: bool,
    /// Columns charted with a non-default [`NullPolicy`].
    pub null_policies: &'static [(&'static str, NullPolicy)],
}

impl DatasetSpec {
    pub fn null_policy(&self, column: &str) -> NullPolicy {
        self.null_policies
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, p)| *p)
            .unwrap_or_default()
    }
}

pub static MANCHESTER_TRIAGE: DatasetSpec = DatasetSpec {
    title: "Triagem Manchester",
    file_name: "atendimentos-em-urgencia-triagem-manchester.csv",
    institution_column: INSTITUTION,
    value_columns: &[
        TRIAGE_RED,
        TRIAGE_ORANGE,
        TRIAGE_YELLOW,
        TRIAGE_GREEN,
        TRIAGE_BLUE,
        TRIAGE_WHITE,
        TRIAGE_NONE,
    ],
    apply_diff: true,
    null_policies: &[],
};

pub static EMERGENCY_TYPE: DatasetSpec = DatasetSpec {
    title: "Tipos de Urgência",
    file_name: "atendimentos-por-tipo-de-urgencia-hospitalar.csv",
    institution_column: INSTITUTION,
    value_columns: &[
        EMERGENCY_GENERAL,
        EMERGENCY_PEDIATRIC,
        EMERGENCY_OBSTETRIC,
        EMERGENCY_PSYCHIATRIC,
    ],
    apply_diff: true,
    null_policies: &[(EMERGENCY_PSYCHIATRIC, NullPolicy::FillZero)],
};

pub static CONSULTATIONS: DatasetSpec = DatasetSpec {
    title: "Consultas Médicas",
    file_name: "evolucao-mensal-das-consultas-medicas-hospitalares.csv",
    institution_column: INSTITUTION,
    value_columns: &[FIRST_CONSULTATIONS, SUBSEQUENT_CONSULTATIONS],
    apply_diff: true,
    null_policies: &[],
};

pub static SURGERIES: DatasetSpec = DatasetSpec {
    title: "Intervenções Cirúrgicas",
    file_name: "intervencoes-cirurgicas.csv",
    institution_column: INSTITUTION,
    value_columns: &[
        SURGERY_SCHEDULED,
        SURGERY_CONVENTIONAL,
        SURGERY_AMBULATORY,
        SURGERY_URGENT,
    ],
    apply_diff: true,
    null_policies: &[],
};

pub static CHILDBIRTHS: DatasetSpec = DatasetSpec {
    title: "Partos e Cesarianas",
    file_name: "partos-e-cesarianas.csv",
    institution_column: INSTITUTION,
    value_columns: &[TOTAL_BIRTHS, CESAREANS],
    apply_diff: true,
    null_policies: &[],
};

pub static BIRTH_REGISTRATION: DatasetSpec = DatasetSpec {
    title: "Notícias de Nascimento",
    file_name: "noticias-de-nascimento-digital-e-registo-de-nascer-de-utentes.csv",
    institution_column: ENTITY,
    value_columns: &[BIRTH_NOTICES, NASCER_UTENTE],
    apply_diff: false,
    null_policies: &[],
};

pub static MORTALITY: DatasetSpec = DatasetSpec {
    title: "Morbilidade e Mortalidade",
    file_name: "morbilidade_mortalidade_hospit.csv",
    institution_column: INSTITUTION,
    value_columns: &[DEATHS, ADMISSIONS, DIAGNOSIS, SEX, AGE_BAND],
    apply_diff: false,
    null_policies: &[],
};
