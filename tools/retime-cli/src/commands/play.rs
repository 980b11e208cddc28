//! Loop playback of a computed result at a fixed frame rate.

use std::path::PathBuf;

use retime_common::AppConfig;
use retime_engine::preview::{output_path, tick_interval, PlaybackLoop};
use retime_model::RemapResult;

use super::load_document;

pub fn run(config: &AppConfig, path: PathBuf, loops: usize, fps: u32) -> anyhow::Result<()> {
    let document = load_document(&path)?;
    document
        .ensure_valid()
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    let request = document.to_request();
    let result = retime_engine::remap(&request).map_err(|e| anyhow::anyhow!("Remap failed: {e}"))?;

    let interval = tick_interval(fps);
    tracing::info!(frames = result.total, loops, fps, "Playback started");

    let output = &config.output;
    for (tick, (index, frame)) in playlist(&result, loops).enumerate() {
        if tick > 0 {
            std::thread::sleep(interval);
        }
        println!(
            "{}  frame {frame:.3}",
            output_path(&output.path_prefix, index, result.skip_start, output.frame_digits)
        );
    }

    Ok(())
}

/// Output positions and frames for `loops` passes over `result`.
fn playlist(result: &RemapResult, loops: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
    let len = result.len();
    let mut playback = PlaybackLoop::new(result);
    std::iter::from_fn(move || {
        let index = if playback.counter() >= len { 0 } else { playback.counter() };
        playback.next().map(|frame| (index, frame))
    })
    .take(len.saturating_mul(loops))
}
