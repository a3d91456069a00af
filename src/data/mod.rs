/// Data layer: archive access, core types, and windowed loading.
///
/// Architecture:
/// ```text
///   .h5 sensor log
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  open archive → channels + canonical TIME vector
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  window   │  mask a time range → merge channels into the frame
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SensorFrame   │  strictly sorted index, forward-filled columns
///   └──────────────┘
/// ```

pub mod model;
pub mod store;
pub mod window;
