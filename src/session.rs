use std::path::Path;

use crate::data::model::{SensorFrame, Timestamp, WindowRequest};
use crate::data::store::SensorStore;
use crate::data::window::{load_window, LoadReport};
use crate::error::Result;

// ---------------------------------------------------------------------------
// LogSession – one store plus its accumulating frame
// ---------------------------------------------------------------------------

/// A store paired with the frame it feeds.
///
/// The frame is owned exclusively by its session and grows monotonically as
/// windows are requested; it is discarded with the session. A session is a
/// single-writer unit: concurrent access to the same session must be
/// serialised by the caller, while independent sessions over different
/// archives share nothing and may run fully in parallel.
pub struct LogSession {
    store: SensorStore,
    frame: SensorFrame,
}

impl LogSession {
    /// Open an archive and start with an empty frame.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            store: SensorStore::open(path)?,
            frame: SensorFrame::new(),
        })
    }

    pub fn store(&self) -> &SensorStore {
        &self.store
    }

    pub fn frame(&self) -> &SensorFrame {
        &self.frame
    }

    /// Load one window into the session frame. Per-channel failures are
    /// reported, never fatal to the rest of the request.
    pub fn load(&mut self, request: &WindowRequest) -> LoadReport {
        load_window(&mut self.frame, &self.store, request)
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.frame.has_column(name)
    }

    /// A loaded channel as `(timestamps, values)`, aligned and
    /// forward-filled.
    pub fn channel_series(&self, name: &str) -> Option<(&[Timestamp], &[f64])> {
        self.frame.column(name).map(|col| (self.frame.index(), col))
    }

    /// Whether the frame index is strictly increasing.
    pub fn time_is_monotonic(&self) -> bool {
        self.frame.index_is_monotonic()
    }

    /// Drop everything loaded so far, keeping the store open.
    pub fn reset(&mut self) {
        self.frame.clear();
    }
}
