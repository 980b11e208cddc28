//! Create a sample remap document.

use std::path::PathBuf;

use retime_common::AppConfig;
use retime_model::{RemapDocument, RemapMode};

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    mode: Option<String>,
    start: i64,
    end: i64,
) -> anyhow::Result<()> {
    let defaults = &config.defaults;
    let mode: RemapMode = mode
        .as_deref()
        .unwrap_or(defaults.mode.as_str())
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    if start > end {
        anyhow::bail!("--start ({start}) must not be after --end ({end})");
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "remap".to_string());

    println!("Creating remap document '{}' at {}", name, path.display());

    let document = RemapDocument::sample(
        &name,
        mode,
        start,
        end,
        defaults.speed_percent,
        defaults.blur_stretch,
    );
    document
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write document: {e}"))?;

    tracing::info!(path = %path.display(), mode = ?mode, "Document created");

    println!("Document created successfully:");
    println!("  Mode: {}", mode.parameter());
    println!("  Range: {start}..={end}");
    println!("  Speed: {}%", defaults.speed_percent);
    println!("  Blur stretch: {}", defaults.blur_stretch);
    println!("  Scenes: {}", document.scenes.len());

    Ok(())
}
