//! Writes a deterministic sample sensor log (`sample_log.h5`) for manual
//! testing: a tool-Z channel that steps on contact, a noisy spindle current,
//! a feed ramp, and one deliberately truncated channel so the
//! invalid-channel path is visible in consumers.

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
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // 10 s at 1 kHz, microsecond epoch starting at an arbitrary date.
    let n = 10_000usize;
    let t0: i64 = 1_700_000_000_000_000;
    let time: Vec<i64> = (0..n as i64).map(|i| t0 + i * 1000).collect();

    // Tool lands on the substrate at 5 s: constant level, then a step plus
    // light noise.
    let graver_z: Vec<f64> = (0..n)
        .map(|i| {
            let level = if i < n / 2 { 0.0 } else { 0.8 };
            level + rng.gauss(0.0, 0.01)
        })
        .collect();

    let spindle_current: Vec<f64> = (0..n)
        .map(|i| {
            let phase = i as f64 * 2.0 * std::f64::consts::PI * 35.0 / 1000.0;
            1.2 + 0.3 * phase.sin() + rng.gauss(0.0, 0.05)
        })
        .collect();

    let feed_x: Vec<f64> = (0..n).map(|i| i as f64 * 0.002).collect();

    // Truncated on purpose: listed by the store but flagged invalid.
    let aux_temp: Vec<f64> = (0..n / 2).map(|i| 24.0 + i as f64 * 1e-4).collect();

    let output_path = "sample_log.h5";
    let file = hdf5::File::create(output_path).context("creating sample log")?;
    let log = file.create_group("LOG").context("creating LOG group")?;

    log.new_dataset_builder().with_data(&time).create("TIME")?;
    log.new_dataset_builder()
        .with_data(&graver_z)
        .create("GRAVER_Z")?;
    log.new_dataset_builder()
        .with_data(&spindle_current)
        .create("SPINDLE_CURRENT")?;
    log.new_dataset_builder().with_data(&feed_x).create("FEED_X")?;
    log.new_dataset_builder()
        .with_data(&aux_temp)
        .create("AUX_TEMP")?;

    println!("Wrote {n} samples across 4 channels (1 truncated) to {output_path}");
    Ok(())
}
