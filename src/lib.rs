//! Analysis core for archived multi-channel sensor logs.
//!
//! The crate ingests HDF5 logs recorded by an engraving machine (one `TIME`
//! vector plus arbitrary sensor channels), loads caller-chosen time windows
//! into an aligned frame, and detects tool/substrate contact events from the
//! smoothed gradient of a channel. Presentation (plotting, dialogs,
//! spectrograms) lives outside this crate and consumes the frames, filtered
//! series, and edge candidates produced here.

pub mod config;
pub mod data;
pub mod dsp;
pub mod error;
pub mod session;
pub mod worker;

pub use config::OptionDocument;
pub use data::model::{ChannelInfo, EdgeCandidate, SensorFrame, Timestamp, WindowRequest};
pub use data::store::SensorStore;
pub use data::window::{load_window, ChannelSource, LoadReport};
pub use dsp::bandpass::{zero_phase_bandpass, FilterSpec};
pub use dsp::edges::{detect_edges, find_edges, smoothed_gradient, EdgeDetectionConfig};
pub use error::{LogError, Result};
pub use session::LogSession;
pub use worker::{EdgeWorker, StageOutput, WorkerState, WorkerTask};
