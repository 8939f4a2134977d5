//! Writes four synthetic workbooks in the RAIS export layout, so the
//! dashboard can be tried without the original files.
//!
//! Usage: `generate_sample [output_dir]` (defaults to `data`).

use std::path::PathBuf;

use anyhow::{Context, Result};

use rais_dashboard::data::DatasetKey;
use rais_dashboard::data::sample::SampleSheet;

const STATES: [&str; 24] = [
    "SP", "MG", "RS", "PR", "SC", "RJ", "AM", "BA", "PE", "CE", "GO", "ES", "DF", "PB", "RN",
    "MT", "MS", "PA", "AL", "PI", "SE", "MA", "TO", "RO",
];

const MUNICIPALITIES: [&str; 24] = [
    "São Paulo",
    "Campinas",
    "São José dos Campos",
    "Sorocaba",
    "Jundiaí",
    "Barueri",
    "Santana de Parnaíba",
    "Guarulhos",
    "São Carlos",
    "Ribeirão Preto",
    "Santo André",
    "São Bernardo do Campo",
    "Hortolândia",
    "Jaguariúna",
    "Atibaia",
    "Bragança Paulista",
    "Indaiatuba",
    "Valinhos",
    "Osasco",
    "Cotia",
    "Itu",
    "Americana",
    "Piracicaba",
    "Limeira",
];

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// One yearly series: a rank-dependent base level with a random drift.
fn generate_series(rank: usize, scale: f64, years: usize, rng: &mut SimpleRng) -> Vec<Option<f64>> {
    let mut level = scale / (rank as f64 + 1.0).powf(1.1) * rng.uniform(0.8, 1.2);
    let drift = rng.uniform(0.97, 1.07);
    (0..years)
        .map(|_| {
            level *= drift * rng.uniform(0.95, 1.05);
            // The exports mark a few suppressed cells with "-".
            if rng.next_f64() < 0.02 {
                None
            } else {
                Some(level.max(0.0).round())
            }
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let periods: Vec<i64> = (2006..=2019).collect();
    let mut rng = SimpleRng::new(42);

    for key in DatasetKey::ALL {
        let (names, scale): (&[&str], f64) = match key {
            DatasetKey::EstablishmentsByState => (&STATES, 900.0),
            DatasetKey::EstablishmentsBySpMunicipality => (&MUNICIPALITIES, 250.0),
            DatasetKey::EmployeesByState => (&STATES, 40_000.0),
            DatasetKey::EmployeesBySpMunicipality => (&MUNICIPALITIES, 12_000.0),
        };
        let rows = names
            .iter()
            .enumerate()
            .map(|(rank, name)| {
                (
                    name.to_string(),
                    generate_series(rank, scale, periods.len(), &mut rng),
                )
            })
            .collect();

        let sheet = SampleSheet::for_dataset(key, periods.clone(), rows);
        let path = out_dir.join(key.spec().file_name);
        sheet
            .write(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
