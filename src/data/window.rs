use crate::error::{LogError, Result};

use super::model::{SensorFrame, Timestamp, WindowRequest};
use super::store::{SensorStore, TIME_DATASET};

// ---------------------------------------------------------------------------
// ChannelSource – where the loader gets raw samples from
// ---------------------------------------------------------------------------

/// Anything that can hand out the canonical time vector and masked raw
/// channel reads. [`SensorStore`] is the production implementation; tests
/// use an in-memory source.
pub trait ChannelSource {
    fn time_vector(&self) -> &[Timestamp];
    fn read_raw(&self, name: &str, mask: &[bool]) -> Result<Vec<f64>>;
}

impl ChannelSource for SensorStore {
    fn time_vector(&self) -> &[Timestamp] {
        SensorStore::time_vector(self)
    }

    fn read_raw(&self, name: &str, mask: &[bool]) -> Result<Vec<f64>> {
        SensorStore::read_raw(self, name, mask)
    }
}

// ---------------------------------------------------------------------------
// LoadReport – per-channel outcome of one windowed load
// ---------------------------------------------------------------------------

/// What happened to each requested channel. A failing channel never aborts
/// the rest of the request; it ends up in `failed` and the others load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Channels read from the source and merged into the frame.
    pub loaded: Vec<String>,
    /// Channels already present in the frame (cache hit, no force-reload).
    pub skipped: Vec<String>,
    /// Channels that could not be read, with the per-channel error.
    pub failed: Vec<(String, LogError)>,
}

// ---------------------------------------------------------------------------
// load_window – incremental, idempotent windowed loading
// ---------------------------------------------------------------------------

/// Load the requested channels over `[start_us, start_us + duration_us)`
/// into `frame`.
///
/// * A non-positive duration or an empty channel list is a no-op, not an
///   error: the frame is returned untouched.
/// * Channels already present are skipped unless `force_reload` is set, so
///   repeating a request is idempotent.
/// * `force_reload` drops all cached columns and rebuilds the frame index
///   from this window alone.
/// * New columns are outer-joined on timestamp; overlapping windows coalesce
///   rather than duplicate rows. After the merge every column is
///   forward-filled; gaps before a column's first value stay undefined.
pub fn load_window(
    frame: &mut SensorFrame,
    source: &impl ChannelSource,
    request: &WindowRequest,
) -> LoadReport {
    let mut report = LoadReport::default();

    if request.duration_us <= 0 || request.channels.is_empty() {
        return report;
    }

    let time = source.time_vector();
    let end_us = request.start_us.saturating_add(request.duration_us);

    // Half-open window mask over the canonical time vector. Repeated
    // timestamps keep only their first occurrence so the sub-frame index is
    // strictly increasing.
    let mut mask = vec![false; time.len()];
    let mut sub_index: Vec<Timestamp> = Vec::new();
    for (i, &t) in time.iter().enumerate() {
        if t >= request.start_us && t < end_us && sub_index.last() != Some(&t) {
            mask[i] = true;
            sub_index.push(t);
        }
    }

    if request.force_reload {
        frame.clear();
    }

    let mut staged: Vec<(String, Vec<f64>)> = Vec::new();
    for name in &request.channels {
        // TIME is the index, never a column.
        if name == TIME_DATASET {
            continue;
        }
        if frame.has_column(name) && !request.force_reload {
            report.skipped.push(name.clone());
            continue;
        }
        match source.read_raw(name, &mask) {
            Ok(values) => {
                staged.push((name.clone(), values));
                report.loaded.push(name.clone());
            }
            Err(err) => {
                log::warn!("channel '{name}' not loaded: {err}");
                report.failed.push((name.clone(), err));
            }
        }
    }

    if !staged.is_empty() || request.force_reload {
        frame.merge(&sub_index, staged);
    }
    frame.forward_fill();

    report
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    struct MockSource {
        time: Vec<Timestamp>,
        channels: BTreeMap<String, Vec<f64>>,
    }

    impl MockSource {
        fn new() -> Self {
            // 10 samples at 10 µs spacing.
            let time: Vec<Timestamp> = (0..10).map(|i| i * 10).collect();
            let mut channels = BTreeMap::new();
            channels.insert("A".to_string(), (0..10).map(f64::from).collect());
            channels.insert("B".to_string(), (0..10).map(|i| f64::from(i) * 2.0).collect());
            Self { time, channels }
        }
    }

    impl ChannelSource for MockSource {
        fn time_vector(&self) -> &[Timestamp] {
            &self.time
        }

        fn read_raw(&self, name: &str, mask: &[bool]) -> Result<Vec<f64>> {
            let values = self
                .channels
                .get(name)
                .ok_or_else(|| LogError::UnknownChannel(name.to_string()))?;
            Ok(values
                .iter()
                .zip(mask)
                .filter_map(|(&v, &keep)| keep.then_some(v))
                .collect())
        }
    }

    fn request(channels: &[&str], start: Timestamp, duration: i64, force: bool) -> WindowRequest {
        WindowRequest {
            start_us: start,
            duration_us: duration,
            channels: channels.iter().map(|s| s.to_string()).collect(),
            force_reload: force,
        }
    }

    #[test]
    fn repeated_load_is_idempotent() {
        let source = MockSource::new();
        let mut frame = SensorFrame::new();

        let first = load_window(&mut frame, &source, &request(&["A"], 0, 50, false));
        assert_eq!(first.loaded, vec!["A"]);

        let snapshot = frame.clone();
        let second = load_window(&mut frame, &source, &request(&["A"], 0, 50, false));
        assert_eq!(second.skipped, vec!["A"]);
        assert!(second.loaded.is_empty());

        assert_eq!(frame.column_names().count(), 1);
        assert_eq!(frame.index(), snapshot.index());
        assert!(frame.index_is_monotonic());
    }

    #[test]
    fn overlapping_windows_do_not_duplicate_timestamps() {
        let source = MockSource::new();
        let mut frame = SensorFrame::new();

        load_window(&mut frame, &source, &request(&["A"], 0, 50, false));
        load_window(&mut frame, &source, &request(&["B"], 30, 50, false));

        assert!(frame.index_is_monotonic());
        assert_eq!(frame.index(), &[0, 10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    fn window_is_half_open() {
        let source = MockSource::new();
        let mut frame = SensorFrame::new();

        // [10, 40) → samples at 10, 20, 30 but not 40.
        load_window(&mut frame, &source, &request(&["A"], 10, 30, false));
        assert_eq!(frame.index(), &[10, 20, 30]);
    }

    #[test]
    fn forward_fill_extends_old_columns_not_leading_gaps() {
        let source = MockSource::new();
        let mut frame = SensorFrame::new();

        // A covers [0, 30), B covers [20, 60). After the merge A has a gap
        // at 30..50 (filled forward) while B's rows before 20 stay NAN.
        load_window(&mut frame, &source, &request(&["A"], 0, 30, false));
        load_window(&mut frame, &source, &request(&["B"], 20, 40, false));

        assert_eq!(frame.index(), &[0, 10, 20, 30, 40, 50]);
        let a = frame.column("A").unwrap();
        assert_eq!(a, &[0.0, 1.0, 2.0, 2.0, 2.0, 2.0]);
        let b = frame.column("B").unwrap();
        assert!(b[0].is_nan() && b[1].is_nan());
        assert_eq!(&b[2..], &[4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn empty_request_and_zero_duration_are_noops() {
        let source = MockSource::new();
        let mut frame = SensorFrame::new();
        load_window(&mut frame, &source, &request(&["A"], 0, 50, false));
        let snapshot = frame.clone();

        load_window(&mut frame, &source, &request(&[], 0, 50, false));
        assert_eq!(frame.index(), snapshot.index());

        load_window(&mut frame, &source, &request(&["B"], 0, 0, false));
        assert!(!frame.has_column("B"));
        assert_eq!(frame.index(), snapshot.index());
    }

    #[test]
    fn failing_channel_does_not_abort_the_rest() {
        let source = MockSource::new();
        let mut frame = SensorFrame::new();

        let report = load_window(&mut frame, &source, &request(&["A", "NOPE", "B"], 0, 50, false));
        assert_eq!(report.loaded, vec!["A", "B"]);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, LogError::UnknownChannel(_)));
        assert!(frame.has_column("A") && frame.has_column("B"));
    }

    #[test]
    fn force_reload_rebuilds_the_index() {
        let source = MockSource::new();
        let mut frame = SensorFrame::new();

        load_window(&mut frame, &source, &request(&["A"], 0, 80, false));
        assert_eq!(frame.len(), 8);

        load_window(&mut frame, &source, &request(&["A"], 20, 30, true));
        assert_eq!(frame.index(), &[20, 30, 40]);
        assert_eq!(frame.column("A").unwrap(), &[2.0, 3.0, 4.0]);
        assert!(frame.index_is_monotonic());
    }
}
