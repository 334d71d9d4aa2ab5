use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const DELIMITER: u8 = b';';
const INSTITUTIONS: [&str; 2] = [
    "Unidade Local de Saúde da Guarda, EPE",
    "Unidade Local de Saúde de Viseu Dão-Lafões, EPE",
];
const YEARS: [i32; 2] = [2023, 2024];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Integer around `mean`, ±`spread` as a fraction of the mean.
    fn around(&mut self, mean: f64, spread: f64) -> i64 {
        let jitter = (self.next_f64() * 2.0 - 1.0) * spread;
        (mean * (1.0 + jitter)).round().max(0.0) as i64
    }
}

/// One extract: header plus rows already rendered as text.
struct Extract {
    file_name: &'static str,
    header: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Extract {
    fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(self.file_name);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_path(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        println!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Monthly counters accumulated within each year, as published.
fn cumulative_extract(
    rng: &mut SimpleRng,
    file_name: &'static str,
    institution_column: &'static str,
    columns: &[(&'static str, f64)],
) -> Extract {
    let mut header = vec!["Período", institution_column];
    header.extend(columns.iter().map(|(name, _)| *name));

    let mut rows = Vec::new();
    for (inst_idx, institution) in INSTITUTIONS.iter().enumerate() {
        let size = if inst_idx == 0 { 1.0 } else { 2.4 };
        for year in YEARS {
            let mut totals = vec![0i64; columns.len()];
            for month in 1..=12 {
                let mut row = vec![format!("{year}-{month:02}"), institution.to_string()];
                for (total, (_, mean)) in totals.iter_mut().zip(columns) {
                    *total += rng.around(mean * size, 0.15);
                    row.push(total.to_string());
                }
                rows.push(row);
            }
        }
    }
    Extract {
        file_name,
        header,
        rows,
    }
}

fn mortality_extract(rng: &mut SimpleRng) -> Extract {
    let diagnoses = [
        ("Doenças do aparelho circulatório", 40.0, 0.08),
        ("Doenças do aparelho respiratório", 35.0, 0.10),
        ("Neoplasias", 25.0, 0.12),
        ("Doenças do aparelho digestivo", 30.0, 0.03),
        ("Gravidez, parto e puerpério", 20.0, 0.0),
    ];
    let bands = [
        ("[0-1[", 0.05),
        ("[1-5[", 0.04),
        ("[5-15[", 0.05),
        ("[15-25[", 0.08),
        ("[25-45[", 0.15),
        ("[45-65[", 0.25),
        ("[65-120[", 0.38),
    ];

    let mut rows = Vec::new();
    for institution in INSTITUTIONS {
        for year in YEARS {
            for month in 1..=12 {
                for (diagnosis, admissions, lethality) in diagnoses {
                    for sex in ["F", "M"] {
                        for (band, weight) in bands {
                            let n = rng.around(admissions * weight / 2.0, 0.5);
                            if n == 0 {
                                continue;
                            }
                            let expected = n as f64 * lethality;
                            let deaths = (expected * rng.next_f64() * 2.0).round() as i64;
                            rows.push(vec![
                                format!("{year}-{month:02}"),
                                institution.to_string(),
                                deaths.min(n).to_string(),
                                n.to_string(),
                                diagnosis.to_string(),
                                sex.to_string(),
                                band.to_string(),
                            ]);
                        }
                    }
                }
            }
        }
    }
    Extract {
        file_name: "morbilidade_mortalidade_hospit.csv",
        header: vec![
            "Período",
            "Instituição",
            "Óbitos",
            "Internamentos",
            "Descrição Capítulo Diagnóstico Principal",
            "Sexo",
            "Faixa Etária",
        ],
        rows,
    }
}

/// Birth registrations are published as monthly counts, not cumulative.
fn birth_registration_extract(rng: &mut SimpleRng) -> Extract {
    let mut rows = Vec::new();
    for institution in INSTITUTIONS {
        for year in YEARS {
            for month in 1..=12 {
                let notices = rng.around(55.0, 0.2);
                rows.push(vec![
                    format!("{year}-{month:02}"),
                    institution.to_string(),
                    notices.to_string(),
                    (notices - rng.around(4.0, 1.0)).max(0).to_string(),
                ]);
            }
        }
    }
    Extract {
        file_name: "noticias-de-nascimento-digital-e-registo-de-nascer-de-utentes.csv",
        header: vec![
            "Período",
            "Entidade",
            "Nº Notícias Nascimento",
            "Nº de Nascer Utente",
        ],
        rows,
    }
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("files"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    let extracts = vec![
        cumulative_extract(
            &mut rng,
            "atendimentos-em-urgencia-triagem-manchester.csv",
            "Instituição",
            &[
                ("Nº Atendimentos em Urgência SU Triagem Manchester -Vermelha", 25.0),
                ("Nº Atendimentos em Urgência SU Triagem Manchester -Laranja", 650.0),
                ("Nº Atendimentos em Urgência SU Triagem Manchester -Amarela", 2300.0),
                ("Nº Atendimentos em Urgência SU Triagem Manchester -Verde", 3100.0),
                ("Nº Atendimentos em Urgência SU Triagem Manchester -Azul", 90.0),
                ("Nº Atendimentos em Urgência SU Triagem Manchester -Branca", 120.0),
                ("Nº Atendimentos s\\ Triagem Manchester", 60.0),
            ],
        ),
        cumulative_extract(
            &mut rng,
            "atendimentos-por-tipo-de-urgencia-hospitalar.csv",
            "Instituição",
            &[
                ("Urgências Geral", 5200.0),
                ("Urgências Pediátricas", 900.0),
                ("Urgência Obstetricia", 180.0),
                ("Urgência Psiquiátrica", 70.0),
            ],
        ),
        cumulative_extract(
            &mut rng,
            "evolucao-mensal-das-consultas-medicas-hospitalares.csv",
            "Instituição",
            &[
                ("Nº Primeiras Consultas", 4200.0),
                ("Nº Consultas Subsequentes", 9800.0),
            ],
        ),
        cumulative_extract(
            &mut rng,
            "intervencoes-cirurgicas.csv",
            "Instituição",
            &[
                ("Nº Intervenções Cirúrgicas Programadas", 520.0),
                ("Nº Intervenções Cirúrgicas Convencionais", 260.0),
                ("Nº Intervenções Cirúrgicas de Ambulatório", 330.0),
                ("Nº Intervenções Cirúrgicas Urgentes", 95.0),
            ],
        ),
        cumulative_extract(
            &mut rng,
            "partos-e-cesarianas.csv",
            "Instituição",
            &[("Nº Total de Partos", 62.0), ("Nº Cesarianas", 19.0)],
        ),
        birth_registration_extract(&mut rng),
        mortality_extract(&mut rng),
    ];

    for extract in &extracts {
        extract.write(&out_dir)?;
    }
    Ok(())
}
