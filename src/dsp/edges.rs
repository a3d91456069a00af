use serde::{Deserialize, Serialize};

use crate::data::model::{EdgeCandidate, Timestamp};
use crate::error::{LogError, Result};

// ---------------------------------------------------------------------------
// EdgeDetectionConfig
// ---------------------------------------------------------------------------

/// Parameters of the gradient pipeline. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeDetectionConfig {
    /// Rolling-mean window as a wall-clock duration. The sample span it
    /// covers depends on local sampling density, not on a fixed count.
    pub window_us: i64,
    /// Lag compensation: how many samples the smoothed series is shifted
    /// back to realign it with the originating event time. A trailing
    /// rolling mean is delayed by about half its window.
    pub shift: usize,
    /// Gain applied to the bias-removed signal before differentiation.
    pub scale: f64,
    /// Minimum absolute smoothed-gradient value for a local extremum to be
    /// emitted as an edge candidate.
    pub threshold: f64,
}

impl EdgeDetectionConfig {
    pub fn new(window_us: i64, shift: usize, scale: f64, threshold: f64) -> Result<Self> {
        if window_us <= 0 {
            return Err(LogError::InvalidConfig(format!(
                "smoothing window must be positive, got {window_us} µs"
            )));
        }
        if !scale.is_finite() || !threshold.is_finite() || threshold < 0.0 {
            return Err(LogError::InvalidConfig(
                "scale and threshold must be finite, threshold non-negative".into(),
            ));
        }
        Ok(Self {
            window_us,
            shift,
            scale,
            threshold,
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Rolling mean over the time window `(t_i - window_us, t_i]`, then shifted
/// left by `shift` samples.
///
/// A position is defined only once a full window of history exists
/// (`t_i - t_0 >= window_us`); earlier positions are NAN, never zero. NAN
/// inputs inside a window are skipped; a window with no finite value stays
/// NAN. The left shift moves each smoothed value back to the time it
/// describes and leaves the tail NAN.
fn rolling_mean_shifted(
    values: &[f64],
    timestamps: &[Timestamp],
    window_us: i64,
    shift: usize,
) -> Vec<f64> {
    let n = values.len();
    let mut smoothed = vec![f64::NAN; n];

    let mut start = 0usize;
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        if values[i].is_finite() {
            sum += values[i];
            count += 1;
        }
        // Drop samples that fell out of (t_i - window, t_i].
        while timestamps[start] <= timestamps[i] - window_us {
            if values[start].is_finite() {
                sum -= values[start];
                count -= 1;
            }
            start += 1;
        }
        if timestamps[i] - timestamps[0] >= window_us && count > 0 {
            smoothed[i] = sum / count as f64;
        }
    }

    // shift(-shift): realign with the originating event time.
    let mut out = vec![f64::NAN; n];
    for i in 0..n.saturating_sub(shift) {
        out[i] = smoothed[i + shift];
    }
    out
}

/// numpy-style discrete gradient with unit spacing: central differences in
/// the interior, one-sided at the ends.
fn numeric_gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut grad = vec![f64::NAN; n];
    if n < 2 {
        return grad;
    }
    grad[0] = values[1] - values[0];
    grad[n - 1] = values[n - 1] - values[n - 2];
    for i in 1..n - 1 {
        grad[i] = (values[i + 1] - values[i - 1]) / 2.0;
    }
    grad
}

/// Compute the smoothed gradient of one channel.
///
/// Steps: remove the signal mean (non-finite samples count as zero there),
/// smooth with a lag-compensated rolling mean, take the scaled numeric
/// gradient, and smooth that again the same way. Positions without enough
/// history stay NAN throughout.
pub fn smoothed_gradient(
    samples: &[f64],
    timestamps: &[Timestamp],
    config: &EdgeDetectionConfig,
) -> Result<Vec<f64>> {
    if samples.len() != timestamps.len() {
        return Err(LogError::InsufficientData {
            needed: timestamps.len(),
            got: samples.len(),
        });
    }
    if samples.len() < 2 {
        return Err(LogError::InsufficientData {
            needed: 2,
            got: samples.len(),
        });
    }
    let span = timestamps[timestamps.len() - 1] - timestamps[0];
    if span < config.window_us {
        // Not one full smoothing window of data; estimate how many samples
        // that would take at the observed rate.
        let avg_dt = span.max(1) as f64 / (samples.len() - 1) as f64;
        return Err(LogError::InsufficientData {
            needed: (config.window_us as f64 / avg_dt).ceil() as usize + 1,
            got: samples.len(),
        });
    }

    // Deliberate numerical policy, not error suppression: non-finite values
    // contribute zero to the bias estimate.
    let offset =
        samples.iter().map(|v| if v.is_finite() { *v } else { 0.0 }).sum::<f64>() / samples.len() as f64;

    let smoothed = rolling_mean_shifted(samples, timestamps, config.window_us, config.shift);
    let biased: Vec<f64> = smoothed.iter().map(|v| (v - offset) * config.scale).collect();
    let gradient = numeric_gradient(&biased);

    Ok(rolling_mean_shifted(
        &gradient,
        timestamps,
        config.window_us,
        config.shift,
    ))
}

/// Extract edge candidates from a smoothed gradient series.
///
/// Rule: a position qualifies when it is finite, its magnitude is at
/// least `threshold`, and it is a local extremum of the absolute gradient
/// (at least its left neighbour, strictly above its right one); a flat
/// run emits a single candidate. Missing neighbours at the series edges
/// do not disqualify a point.
pub fn find_edges(
    gradient: &[f64],
    timestamps: &[Timestamp],
    config: &EdgeDetectionConfig,
) -> Result<Vec<EdgeCandidate>> {
    if gradient.len() != timestamps.len() {
        return Err(LogError::InsufficientData {
            needed: timestamps.len(),
            got: gradient.len(),
        });
    }

    let mag = |i: usize| -> f64 {
        gradient
            .get(i)
            .copied()
            .filter(|v| v.is_finite())
            .map_or(f64::NEG_INFINITY, f64::abs)
    };

    let mut candidates = Vec::new();
    for i in 0..gradient.len() {
        let m = mag(i);
        if !m.is_finite() || m < config.threshold {
            continue;
        }
        let left = if i == 0 { f64::NEG_INFINITY } else { mag(i - 1) };
        if m >= left && m > mag(i + 1) {
            candidates.push(EdgeCandidate {
                timestamp_us: timestamps[i],
                magnitude: gradient[i],
            });
        }
    }
    Ok(candidates)
}

/// The full pipeline: smoothed gradient, then candidate extraction.
pub fn detect_edges(
    samples: &[f64],
    timestamps: &[Timestamp],
    config: &EdgeDetectionConfig,
) -> Result<Vec<EdgeCandidate>> {
    let gradient = smoothed_gradient(samples, timestamps, config)?;
    find_edges(&gradient, timestamps, config)
}
