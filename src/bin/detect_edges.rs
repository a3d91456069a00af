//! Thin command-line consumer of the analysis core: load a window of one
//! channel and print the detected contact edges.
//!
//! Usage: `detect_edges <logfile> <channel> [start_us] [duration_s]`

use anyhow::{bail, Context, Result};
use gravelog::{
    EdgeDetectionConfig, EdgeWorker, LogSession, StageOutput, WindowRequest, WorkerTask,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, channel) = match args.as_slice() {
        [path, channel, ..] => (path.clone(), channel.clone()),
        _ => bail!("usage: detect_edges <logfile> <channel> [start_us] [duration_s]"),
    };

    let mut session = LogSession::open(&path).with_context(|| format!("opening {path}"))?;

    let (first, last) = session
        .store()
        .time_bounds()
        .context("log contains no samples")?;
    let start_us: i64 = match args.get(2) {
        Some(raw) => raw.parse().context("start_us must be an integer")?,
        None => first,
    };
    let duration_s: i64 = match args.get(3) {
        Some(raw) => raw.parse().context("duration_s must be an integer")?,
        None => 120,
    };

    log::info!(
        "log spans {first}..{last} µs, {} valid channels",
        session.store().valid_channel_names().len()
    );

    let report = session.load(&WindowRequest {
        start_us,
        duration_us: duration_s * 1_000_000,
        channels: vec![channel.clone()],
        force_reload: false,
    });
    if let Some((name, err)) = report.failed.first() {
        bail!("channel '{name}' failed to load: {err}");
    }

    let (timestamps, samples) = session
        .channel_series(&channel)
        .context("channel missing after load")?;

    // 50 ms smoothing, 25-sample lag compensation, the conventional gain of
    // 500 and a conservative threshold; a real frontend resolves these from
    // its option document instead.
    let config = EdgeDetectionConfig::new(50_000, 25, 500.0, 5.0)?;

    let mut worker = EdgeWorker::new();
    worker.bind(WorkerTask::Gradient {
        samples: samples.to_vec(),
        timestamps: timestamps.to_vec(),
        config,
    })?;
    worker.start()?;
    let gradient = match worker.collect()? {
        StageOutput::Gradient(gradient) => gradient,
        other => bail!("unexpected worker output: {other:?}"),
    };

    worker.bind(WorkerTask::Edges {
        gradient,
        timestamps: timestamps.to_vec(),
        config,
    })?;
    worker.start()?;
    let candidates = match worker.collect()? {
        StageOutput::Edges(candidates) => candidates,
        other => bail!("unexpected worker output: {other:?}"),
    };

    if candidates.is_empty() {
        println!("no edges above threshold {} in this window", config.threshold);
    }
    for c in candidates {
        println!("edge at {} µs (gradient {:+.3})", c.timestamp_us, c.magnitude);
    }
    Ok(())
}
