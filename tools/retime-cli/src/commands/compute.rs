//! Compute the remapped frame list of a document.

use std::path::PathBuf;

use retime_common::AppConfig;
use retime_engine::preview::{frame_pass, output_path};

use super::load_document;

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    json: bool,
    output: Option<PathBuf>,
    prefix: Option<String>,
) -> anyhow::Result<()> {
    let document = load_document(&path)?;
    document
        .ensure_valid()
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    let request = document.to_request();
    let result = retime_engine::remap(&request).map_err(|e| anyhow::anyhow!("Remap failed: {e}"))?;

    if let Some(output) = output {
        let content = serde_json::to_string_pretty(&result)?;
        std::fs::write(&output, content)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;
        tracing::info!(path = %output.display(), frames = result.total, "Result written");
        println!("Wrote {} frame(s) to {}", result.total, output.display());
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let prefix = prefix.as_deref().unwrap_or(config.output.path_prefix.as_str());
    let digits = config.output.frame_digits;

    println!(
        "{} frame(s) ({} before crop), mode {}",
        result.total,
        result.uncropped_len,
        result.mode.parameter()
    );
    println!(
        "Cursor: position {} at frame {:.3}",
        result.cursor.number, result.cursor.actual
    );
    println!();

    for index in 0..result.len() {
        let Some(pass) = frame_pass(&result, index) else {
            break;
        };
        let mut line = format!(
            "{:<24} {:>10.3}  ({} {:+.3})",
            output_path(prefix, index, result.skip_start, digits),
            pass.frame,
            pass.position.frame,
            pass.position.subframe
        );
        for scene in &pass.blur {
            line.push_str(&format!(
                "  {}: shutter={:.3} samples={}",
                scene.scene, scene.shutter, scene.samples
            ));
        }
        println!("{line}");
    }

    Ok(())
}
