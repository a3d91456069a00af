/// Signal-processing layer: pure functions over finite, already-captured
/// buffers.
///
/// ```text
///   aligned channel + timestamps
///        │
///        ├──► bandpass  zero-phase band-pass (forward/reverse IIR cascade)
///        │
///        └──► edges     bias removal → lag-compensated smoothing →
///                       scaled gradient → re-smoothing → edge candidates
/// ```
///
/// Nothing here holds locks or shared state; filtering and gradient
/// computation over different channels or different logs may run fully in
/// parallel.

pub mod bandpass;
pub mod edges;
