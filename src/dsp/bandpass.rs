use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

// ---------------------------------------------------------------------------
// FilterSpec – band-pass parameters
// ---------------------------------------------------------------------------

/// Parameters of the band-pass filter. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub low_hz: f64,
    pub high_hz: f64,
    pub sample_rate_hz: f64,
    /// Butterworth order per band edge (the effective order doubles again in
    /// the zero-phase cascade).
    pub order: usize,
}

impl FilterSpec {
    /// Build a spec, enforcing `0 < low < high < sample_rate / 2`.
    pub fn new(low_hz: f64, high_hz: f64, sample_rate_hz: f64, order: usize) -> Result<Self> {
        let spec = Self {
            low_hz,
            high_hz,
            sample_rate_hz,
            order,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(LogError::InvalidConfig("order must be >= 1".into()));
        }
        if !(self.low_hz > 0.0 && self.low_hz < self.high_hz) {
            return Err(LogError::InvalidConfig(format!(
                "cutoffs must satisfy 0 < low < high, got {} / {}",
                self.low_hz, self.high_hz
            )));
        }
        if !(self.high_hz < self.sample_rate_hz / 2.0) {
            return Err(LogError::InvalidConfig(format!(
                "high cutoff {} must stay below Nyquist ({})",
                self.high_hz,
                self.sample_rate_hz / 2.0
            )));
        }
        Ok(())
    }

    /// Minimum sample count the zero-phase pass needs to establish its
    /// initial state (three transients of the doubled effective order).
    pub fn min_samples(&self) -> usize {
        3 * 2 * self.order
    }
}

// ---------------------------------------------------------------------------
// Biquad sections
// ---------------------------------------------------------------------------

/// One Direct Form II Transposed second-order section, a0 normalised to 1.
/// First-order sections set b2 = a2 = 0.
#[derive(Debug, Clone, Copy)]
struct Section {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Section {
    fn new(b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Set the delay line to the step steady state for a constant input
    /// `x0`, so the filter starts settled instead of ringing in from zero.
    /// Returns the steady-state output, the constant seen by the next
    /// section in the cascade.
    fn settle(&mut self, x0: f64) -> f64 {
        let y0 = self.dc_gain() * x0;
        self.z2 = self.b2 * x0 - self.a2 * y0;
        self.z1 = self.b1 * x0 - self.a1 * y0 + self.z2;
        y0
    }

    fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

/// RBJ-cookbook low-pass biquad.
fn lowpass_section(sample_rate: f64, freq: f64, q: f64) -> Section {
    let omega = 2.0 * PI * freq / sample_rate;
    let alpha = omega.sin() / (2.0 * q);
    let cos_omega = omega.cos();
    let a0 = 1.0 + alpha;
    Section::new(
        (1.0 - cos_omega) / 2.0 / a0,
        (1.0 - cos_omega) / a0,
        (1.0 - cos_omega) / 2.0 / a0,
        -2.0 * cos_omega / a0,
        (1.0 - alpha) / a0,
    )
}

/// RBJ-cookbook high-pass biquad.
fn highpass_section(sample_rate: f64, freq: f64, q: f64) -> Section {
    let omega = 2.0 * PI * freq / sample_rate;
    let alpha = omega.sin() / (2.0 * q);
    let cos_omega = omega.cos();
    let a0 = 1.0 + alpha;
    Section::new(
        (1.0 + cos_omega) / 2.0 / a0,
        -(1.0 + cos_omega) / a0,
        (1.0 + cos_omega) / 2.0 / a0,
        -2.0 * cos_omega / a0,
        (1.0 - alpha) / a0,
    )
}

/// First-order section via the bilinear transform. `highpass` flips the
/// numerator.
fn first_order_section(sample_rate: f64, freq: f64, highpass: bool) -> Section {
    let k = (PI * freq / sample_rate).tan();
    let a1 = (k - 1.0) / (k + 1.0);
    if highpass {
        Section::new(1.0 / (k + 1.0), -1.0 / (k + 1.0), 0.0, a1, 0.0)
    } else {
        Section::new(k / (k + 1.0), k / (k + 1.0), 0.0, a1, 0.0)
    }
}

/// Stage Q values of an order-`n` Butterworth filter: one per conjugate pole
/// pair, `Q_k = 1 / (2 sin((2k - 1)π / 2n))`. Odd orders carry one real pole
/// handled as a first-order section.
fn butterworth_qs(order: usize) -> Vec<f64> {
    (1..=order / 2)
        .map(|k| 1.0 / (2.0 * ((2 * k - 1) as f64 * PI / (2.0 * order as f64)).sin()))
        .collect()
}

/// Order-`n` Butterworth band-pass as cascaded sections: a high-pass chain
/// at the low cutoff followed by a low-pass chain at the high cutoff.
fn design_sections(spec: &FilterSpec) -> Vec<Section> {
    let fs = spec.sample_rate_hz;
    let mut sections = Vec::with_capacity(spec.order + 1);

    for q in butterworth_qs(spec.order) {
        sections.push(highpass_section(fs, spec.low_hz, q));
    }
    if spec.order % 2 == 1 {
        sections.push(first_order_section(fs, spec.low_hz, true));
    }
    for q in butterworth_qs(spec.order) {
        sections.push(lowpass_section(fs, spec.high_hz, q));
    }
    if spec.order % 2 == 1 {
        sections.push(first_order_section(fs, spec.high_hz, false));
    }
    sections
}

// ---------------------------------------------------------------------------
// Zero-phase application
// ---------------------------------------------------------------------------

/// One causal pass over `data` with every section settled to the steady
/// state implied by the first sample.
fn filter_once(spec: &FilterSpec, data: &[f64]) -> Vec<f64> {
    let mut sections = design_sections(spec);

    let mut x0 = data[0];
    for section in sections.iter_mut() {
        x0 = section.settle(x0);
    }

    data.iter()
        .map(|&x| sections.iter_mut().fold(x, |acc, s| s.process(acc)))
        .collect()
}

/// Apply the band-pass filter with zero phase lag.
///
/// The signal is filtered forward, reversed, filtered forward again, and
/// reversed back; the second pass cancels the phase lag of the first at the
/// cost of doubling the effective order. This needs the whole buffer up
/// front and is only valid over finite, already-captured windows, never a
/// live stream.
pub fn zero_phase_bandpass(samples: &[f64], spec: &FilterSpec) -> Result<Vec<f64>> {
    spec.validate()?;
    let needed = spec.min_samples();
    if samples.len() < needed {
        return Err(LogError::InsufficientData {
            needed,
            got: samples.len(),
        });
    }

    let mut y = filter_once(spec, samples);
    y.reverse();
    let mut y = filter_once(spec, &y);
    y.reverse();
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    /// Index of the maximum over a central region, away from edge
    /// transients.
    fn central_argmax(data: &[f64]) -> usize {
        let (lo, hi) = (data.len() / 4, 3 * data.len() / 4);
        let mut best = lo;
        for i in lo..hi {
            if data[i] > data[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn in_band_peak_location_is_preserved() {
        let spec = FilterSpec::new(5.0, 50.0, 1000.0, 2).unwrap();
        let input = sine(20.0, 1000.0, 1000);
        let output = zero_phase_bandpass(&input, &spec).unwrap();

        let peak_in = central_argmax(&input) as i64;
        let peak_out = central_argmax(&output) as i64;
        assert!(
            (peak_in - peak_out).abs() <= 1,
            "peak moved from {peak_in} to {peak_out}"
        );
    }

    #[test]
    fn out_of_band_sinusoid_is_attenuated() {
        let spec = FilterSpec::new(5.0, 50.0, 1000.0, 2).unwrap();
        let input = sine(200.0, 1000.0, 1000);
        let output = zero_phase_bandpass(&input, &spec).unwrap();

        let max_out = output[250..750].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(max_out < 0.1, "expected strong attenuation, got {max_out}");
    }

    #[test]
    fn constant_input_yields_zero_without_transient() {
        let spec = FilterSpec::new(5.0, 50.0, 1000.0, 3).unwrap();
        let input = vec![42.0; 256];
        let output = zero_phase_bandpass(&input, &spec).unwrap();

        // A band-pass blocks DC; the steady-state init means no start-up
        // ring either.
        let max_out = output.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(max_out < 1e-8, "unexpected transient: {max_out}");
    }

    #[test]
    fn short_buffer_fails_with_insufficient_data() {
        let spec = FilterSpec::new(5.0, 50.0, 1000.0, 4).unwrap();
        let input = sine(20.0, 1000.0, spec.min_samples() - 1);
        let err = zero_phase_bandpass(&input, &spec).unwrap_err();
        assert!(matches!(err, LogError::InsufficientData { .. }));
    }

    #[test]
    fn rejects_inverted_cutoffs_and_super_nyquist() {
        assert!(FilterSpec::new(50.0, 5.0, 1000.0, 2).is_err());
        assert!(FilterSpec::new(5.0, 600.0, 1000.0, 2).is_err());
        assert!(FilterSpec::new(5.0, 50.0, 1000.0, 0).is_err());
    }
}
