use anyhow::{Context, Result};
use serde::Serialize;

/// One row of the generated sample file.
#[derive(Debug, Serialize)]
struct SampleRow {
    customer_id: i64,
    age: i64,
    household_size: i64,
    income: Option<f64>,
    spend_score: f64,
    city: String,
    membership: Option<&'static str>,
    churned: bool,
}

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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const ROWS: i64 = 300;
const CITIES: [&str; 5] = ["Lisbon", "Oslo", "Madrid", "Vienna", "Prague"];
const TIERS: [&str; 3] = ["basic", "plus", "premium"];

fn generate_row(id: i64, rng: &mut SimpleRng) -> SampleRow {
    // 15 distinct ages keeps the column discrete.
    let age = 25 + rng.below(15) as i64;
    let household_size = 1 + rng.below(5) as i64;
    let base_income = 28_000.0 + 1_100.0 * (age - 25) as f64;
    let income = (rng.below(12) != 0).then(|| (base_income + rng.gauss(0.0, 6_000.0)).round());
    let spend_score = (rng.gauss(50.0, 15.0) * 10.0).round() / 10.0;
    let city = CITIES[rng.below(CITIES.len() as u64) as usize].to_string();
    let membership = (rng.below(8) != 0).then(|| TIERS[rng.below(TIERS.len() as u64) as usize]);
    let churned = spend_score < 40.0 && rng.below(3) != 0;

    SampleRow {
        customer_id: 1000 + id,
        age,
        household_size,
        income,
        spend_score,
        city,
        membership,
        churned,
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("Failed to create {output_path}"))?;
    for id in 0..ROWS {
        writer
            .serialize(generate_row(id, &mut rng))
            .context("Failed to write row")?;
    }
    writer.flush().context("Failed to flush writer")?;

    println!("Wrote {ROWS} rows to {output_path}");
    Ok(())
}
