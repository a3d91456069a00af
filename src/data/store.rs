use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

use super::model::{ChannelInfo, Timestamp};

/// Name of the root group holding the channel datasets.
pub const LOG_GROUP: &str = "LOG";
/// Name of the canonical time dataset inside [`LOG_GROUP`].
pub const TIME_DATASET: &str = "TIME";
/// Optional root group with previously stored edge annotations.
pub const CUTS_GROUP: &str = "CUTS";

// ---------------------------------------------------------------------------
// SensorStore – read-only accessor over one archived log
// ---------------------------------------------------------------------------

/// A read-only session over one HDF5 sensor log.
///
/// The archive layout is a root group `LOG` with one mandatory 1-D `i64`
/// dataset `TIME` (microsecond epoch, monotonically non-decreasing) and zero
/// or more sibling 1-D numeric datasets, one per channel. A channel is valid
/// when it has exactly one sample per TIME entry; shorter or longer channels
/// are listed but refuse to be read.
///
/// The store holds the file handle open for its lifetime; dropping the store
/// releases it. The canonical time vector is read once at open.
#[derive(Debug)]
pub struct SensorStore {
    path: PathBuf,
    log: hdf5::Group,
    cuts: Option<hdf5::Group>,
    time: Vec<Timestamp>,
    channels: Vec<ChannelInfo>,
    // Keeps the read handle alive.
    _file: hdf5::File,
}

impl SensorStore {
    /// Open an archived log for reading.
    ///
    /// Fails with [`LogError::InvalidFormat`] when the `LOG` group or its
    /// `TIME` dataset is absent. Channels whose length differs from TIME are
    /// *not* an error here: heterogeneous logs are common, so the store
    /// opens and lists them as invalid.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = hdf5::File::open(&path)?;

        let log = file.group(LOG_GROUP).map_err(|_| LogError::InvalidFormat {
            path: path.clone(),
            reason: format!("missing '{LOG_GROUP}' group"),
        })?;
        let time_ds = log
            .dataset(TIME_DATASET)
            .map_err(|_| LogError::InvalidFormat {
                path: path.clone(),
                reason: format!("missing '{LOG_GROUP}/{TIME_DATASET}' dataset"),
            })?;
        let time: Vec<Timestamp> = time_ds.read_raw()?;

        let mut channels = Vec::new();
        for name in log.member_names()? {
            let valid = match log.dataset(&name) {
                Ok(ds) => ds.size() == time.len(),
                // Non-dataset members (nested groups etc.) are never valid.
                Err(_) => false,
            };
            channels.push(ChannelInfo { name, valid });
        }

        let cuts = file.group(CUTS_GROUP).ok();
        if cuts.is_none() {
            log::debug!("{}: no stored cut annotations", path.display());
        }

        Ok(Self {
            path,
            log,
            cuts,
            time,
            channels,
            _file: file,
        })
    }

    /// Path of the backing archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every channel in archive order, including `TIME` itself, with its
    /// validity flag.
    pub fn list_channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    /// Names of channels whose length matches the canonical time vector.
    pub fn valid_channel_names(&self) -> Vec<&str> {
        self.channels
            .iter()
            .filter(|c| c.valid)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// The full, unfiltered canonical time vector.
    pub fn time_vector(&self) -> &[Timestamp] {
        &self.time
    }

    /// First and last timestamp of the log, or `None` for an empty log.
    pub fn time_bounds(&self) -> Option<(Timestamp, Timestamp)> {
        Some((*self.time.first()?, *self.time.last()?))
    }

    /// Read one channel's samples at the positions where `mask` is true.
    ///
    /// `mask` must be as long as the canonical time vector. Fails with
    /// [`LogError::UnknownChannel`] for names not in the archive and
    /// [`LogError::InvalidChannel`] for channels whose validity flag is
    /// false.
    pub fn read_raw(&self, name: &str, mask: &[bool]) -> Result<Vec<f64>> {
        let info = self
            .channels
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| LogError::UnknownChannel(name.to_string()))?;
        if !info.valid {
            return Err(LogError::InvalidChannel(name.to_string()));
        }

        let raw: Vec<f64> = self.log.dataset(name)?.read_raw()?;
        Ok(raw
            .iter()
            .zip(mask)
            .filter_map(|(&v, &keep)| keep.then_some(v))
            .collect())
    }

    /// Whether the archive carries a stored-edges group. Its internal schema
    /// is opaque to the core and passed through to consumers by name only.
    pub fn has_cut_annotations(&self) -> bool {
        self.cuts.is_some()
    }

    /// Member names of the stored-edges group, empty when absent.
    pub fn cut_annotation_names(&self) -> Vec<String> {
        self.cuts
            .as_ref()
            .and_then(|g| g.member_names().ok())
            .unwrap_or_default()
    }
}
