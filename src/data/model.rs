use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Microsecond-resolution epoch timestamp, the native domain of the archive's
/// TIME dataset.
pub type Timestamp = i64;

// ---------------------------------------------------------------------------
// ChannelInfo – one entry of a store's channel listing
// ---------------------------------------------------------------------------

/// A channel as listed by a store: its name and whether its length matches
/// the canonical TIME vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub name: String,
    /// True when the channel has exactly one sample per TIME entry.
    pub valid: bool,
}

// ---------------------------------------------------------------------------
// WindowRequest – one windowed load
// ---------------------------------------------------------------------------

/// A request to load a time window of named channels into a frame.
///
/// `start_us` is a timestamp in the archive's domain, not an offset; the
/// window covers `[start_us, start_us + duration_us)`.
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub start_us: Timestamp,
    pub duration_us: i64,
    pub channels: Vec<String>,
    /// Drop cached columns and rebuild the frame index from this window.
    pub force_reload: bool,
}

// ---------------------------------------------------------------------------
// EdgeCandidate – one detected contact/separation event
// ---------------------------------------------------------------------------

/// A point where the smoothed gradient of a monitored channel indicates a
/// tool/substrate contact or separation. Produced once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCandidate {
    pub timestamp_us: Timestamp,
    /// Signed smoothed-gradient value at the candidate position.
    pub magnitude: f64,
}

// ---------------------------------------------------------------------------
// SensorFrame – the accumulating time-aligned table
// ---------------------------------------------------------------------------

/// A table of channel columns keyed by a shared timestamp index.
///
/// Missing cells are encoded as `f64::NAN`. Invariants, maintained by
/// [`SensorFrame::merge`]:
/// * the index is strictly increasing (duplicates coalesced, never repeated),
/// * every column has exactly `index.len()` values.
#[derive(Debug, Clone, Default)]
pub struct SensorFrame {
    index: Vec<Timestamp>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl SensorFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// The timestamp index.
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// One column's values, aligned with [`SensorFrame::index`].
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Drop all rows and columns.
    pub fn clear(&mut self) {
        self.index.clear();
        self.columns.clear();
    }

    /// Whether the index is strictly increasing.
    pub fn index_is_monotonic(&self) -> bool {
        self.index.windows(2).all(|w| w[0] < w[1])
    }

    /// Outer-join `staged` columns (aligned with `sub_index`, which must be
    /// strictly increasing) into the frame.
    ///
    /// The new frame index is the sorted union of the old index and
    /// `sub_index`. Pre-existing columns keep their rows and gain NAN at
    /// timestamps they never saw; staged columns get NAN outside their own
    /// window. A staged column replaces an existing one of the same name.
    pub fn merge(&mut self, sub_index: &[Timestamp], staged: Vec<(String, Vec<f64>)>) {
        debug_assert!(staged.iter().all(|(_, v)| v.len() == sub_index.len()));

        let merged = union_sorted(&self.index, sub_index);

        if merged != self.index {
            for values in self.columns.values_mut() {
                *values = reindex(&self.index, values, &merged);
            }
        }
        for (name, values) in staged {
            self.columns.insert(name, reindex(sub_index, &values, &merged));
        }
        self.index = merged;
    }

    /// Carry the last known value of every column forward over NAN gaps.
    /// Leading gaps (before a column's first finite value) stay NAN.
    pub fn forward_fill(&mut self) {
        for values in self.columns.values_mut() {
            let mut last = f64::NAN;
            for v in values.iter_mut() {
                if v.is_nan() {
                    *v = last;
                } else {
                    last = *v;
                }
            }
        }
    }
}

/// Sorted union of two strictly increasing timestamp slices.
fn union_sorted(a: &[Timestamp], b: &[Timestamp]) -> Vec<Timestamp> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Re-align `values` (keyed by `from`) onto the `onto` index, inserting NAN
/// at timestamps absent from `from`. Both indices are strictly increasing
/// and `from ⊆ onto`.
fn reindex(from: &[Timestamp], values: &[f64], onto: &[Timestamp]) -> Vec<f64> {
    let mut out = Vec::with_capacity(onto.len());
    let mut i = 0;
    for &t in onto {
        if i < from.len() && from[i] == t {
            out.push(values[i]);
            i += 1;
        } else {
            out.push(f64::NAN);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_outer_joins_on_timestamp() {
        let mut frame = SensorFrame::new();
        frame.merge(&[0, 10, 20], vec![("A".into(), vec![1.0, 2.0, 3.0])]);
        frame.merge(&[10, 20, 30], vec![("B".into(), vec![7.0, 8.0, 9.0])]);

        assert_eq!(frame.index(), &[0, 10, 20, 30]);
        let a = frame.column("A").unwrap();
        assert_eq!(&a[..3], &[1.0, 2.0, 3.0]);
        assert!(a[3].is_nan());
        let b = frame.column("B").unwrap();
        assert!(b[0].is_nan());
        assert_eq!(&b[1..], &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn merge_coalesces_duplicate_timestamps() {
        let mut frame = SensorFrame::new();
        frame.merge(&[0, 10], vec![("A".into(), vec![1.0, 2.0])]);
        frame.merge(&[10, 20], vec![("A".into(), vec![2.5, 3.0])]);

        assert_eq!(frame.index(), &[0, 10, 20]);
        assert!(frame.index_is_monotonic());
    }

    #[test]
    fn forward_fill_keeps_leading_gaps() {
        let mut frame = SensorFrame::new();
        frame.merge(
            &[0, 1, 2, 3],
            vec![("A".into(), vec![f64::NAN, 5.0, f64::NAN, 6.0])],
        );
        frame.forward_fill();

        let a = frame.column("A").unwrap();
        assert!(a[0].is_nan());
        assert_eq!(&a[1..], &[5.0, 5.0, 6.0]);
    }
}
