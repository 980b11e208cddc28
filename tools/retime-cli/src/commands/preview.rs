//! Replay preview navigation over a computed result.

use std::path::PathBuf;

use retime_common::AppConfig;
use retime_engine::preview::{output_path, ExitMode, FramePass, PreviewSession};

use super::load_document;

pub fn run(config: &AppConfig, path: PathBuf, steps: String, exit: String) -> anyhow::Result<()> {
    let exit: ExitMode = exit.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let steps = parse_steps(&steps)?;

    let document = load_document(&path)?;
    document
        .ensure_valid()
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    let request = document.to_request();
    let result = retime_engine::remap(&request).map_err(|e| anyhow::anyhow!("Remap failed: {e}"))?;

    let output = &config.output;
    let show = |label: &str, pass: Option<FramePass>| match pass {
        Some(pass) => {
            let blur = pass
                .blur
                .iter()
                .map(|s| format!("{} {:.3}/{}", s.scene, s.shutter, s.samples))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "{label:>6}  {}  frame {:.3}  {blur}",
                output_path(&output.path_prefix, pass.index, result.skip_start, output.frame_digits),
                pass.frame
            );
        }
        None => println!("{label:>6}  (no frames)"),
    };

    let mut session = PreviewSession::new(&result);
    show("start", session.current());
    for step in steps {
        let pass = session.step(step);
        show(&format!("{step:+}"), pass);
    }

    let frame = session.finish(exit);
    println!("Exit ({exit:?}): cursor to frame {frame:.3}");

    Ok(())
}

/// Parse "+1,-10,+50" into signed steps.
fn parse_steps(steps: &str) -> anyhow::Result<Vec<i64>> {
    steps
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_start_matches('+')
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Invalid step '{s}' (expected e.g. +1 or -10)"))
        })
        .collect()
}
