//! Writes a synthetic, GSS-shaped CSV for offline runs:
//! `generate_sample [OUTPUT] [ROWS]`, then `gss-explorer --csv OUTPUT ...`.

use anyhow::{Context, Result};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }

    /// `value`, or a missing-answer token with probability `p`.
    fn or_missing(&mut self, p: f64, value: String) -> String {
        if self.next_f64() < p {
            self.pick(&["IAP", "DK", ".a", "IAP,DK,NA,uncodeable"]).to_string()
        } else {
            value
        }
    }

    /// A response label from `options`, sometimes missing.
    fn answer(&mut self, p: f64, options: &[&str]) -> String {
        let label = self.pick(options).to_string();
        self.or_missing(p, label)
    }

    /// A prestige-style score around `mean`, sometimes missing.
    fn score(&mut self, p: f64, mean: f64) -> String {
        let value = self.gauss(mean, 12.0).round().clamp(16.0, 80.0);
        self.or_missing(p, value.to_string())
    }
}

const HEADER: [&str; 18] = [
    "year", "id", "wtss", "sex", "educ", "region", "age", "coninc", "prestg10", "mapres10",
    "papres10", "sei10", "satjob", "fechld", "fefam", "fepol", "fepresch", "meovrwrk",
];

const REGIONS: [&str; 9] = [
    "new england",
    "middle atlantic",
    "e. nor. central",
    "w. nor. central",
    "south atlantic",
    "e. sou. central",
    "w. sou. central",
    "mountain",
    "pacific",
];

const SATJOB: [&str; 4] = [
    "very satisfied",
    "mod. satisfied",
    "a little dissat",
    "very dissatisfied",
];

const AGREE: [&str; 4] = ["strongly agree", "agree", "disagree", "strongly disagree"];

const AGREE_NEUTRAL: [&str; 5] = [
    "strongly agree",
    "agree",
    "neither agree nor disagree",
    "disagree",
    "strongly disagree",
];

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "gss2018_sample.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().context("ROWS must be a positive integer")?,
        None => 500,
    };

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    for id in 1..=rows {
        let sex = rng.pick(&["male", "female"]);
        let educ = rng.gauss(13.5, 3.0).round().clamp(0.0, 20.0);
        let prestige = rng.gauss(44.0 + educ, 12.0).round().clamp(16.0, 80.0);
        let gap = if sex == "male" { 1.0 } else { 0.8 };
        let income = (rng.gauss(prestige * 900.0, 15000.0) * gap).max(300.0).round();
        let age = rng.gauss(48.0, 17.0).round().clamp(18.0, 95.0);
        let age = if age >= 89.0 {
            "89 or older".to_string()
        } else {
            age.to_string()
        };

        let weight = format!("{:.6}", rng.gauss(1.0, 0.4).abs() + 0.3);
        let sei = format!("{:.1}", (prestige * 1.1 - 5.0).clamp(9.0, 92.8));
        let region = rng.pick(&REGIONS).to_string();

        let record = [
            "2018".to_string(),
            id.to_string(),
            weight,
            sex.to_string(),
            rng.or_missing(0.01, educ.to_string()),
            region,
            rng.or_missing(0.005, age),
            rng.or_missing(0.1, income.to_string()),
            rng.or_missing(0.05, prestige.to_string()),
            rng.score(0.2, 40.0),
            rng.score(0.2, 42.0),
            rng.or_missing(0.05, sei),
            rng.answer(0.3, &SATJOB),
            rng.answer(0.35, &AGREE),
            rng.answer(0.35, &AGREE),
            rng.answer(0.4, &AGREE),
            rng.answer(0.35, &AGREE),
            rng.answer(0.4, &AGREE_NEUTRAL),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {rows} synthetic respondents to {output_path}");
    Ok(())
}
