//! Validate a remap document and dry-run the engine on it.

use std::path::PathBuf;

use super::load_document;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating document at: {}", path.display());

    let document = load_document(&path)?;
    let s = &document.settings;

    println!("  Name: {}", document.name);
    println!("  Version: {}", document.version);
    println!("  Mode: {}", s.mode.parameter());
    println!("  Range: {}..={}", s.frame_start, s.frame_end);
    println!("  Crop: skip_start={} skip_end={}", s.skip_start, s.skip_end);
    println!("  Scenes: {}", document.scenes.len());

    let issues = document.validate();
    if !issues.is_empty() {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
    }

    let request = document.to_request();
    match retime_engine::remap(&request) {
        Ok(result) => {
            println!(
                "\nEngine: {} frame(s) to render ({} before crop), {} blurred scene(s)",
                result.total,
                result.uncropped_len,
                result.blur.len()
            );
        }
        Err(e) => {
            println!("\nEngine rejected the document [{}]: {e}", e.code());
        }
    }

    if issues.is_empty() {
        println!("\nDocument is valid.");
    } else {
        println!(
            "\n{} issue(s) found. Document may not be fully usable.",
            issues.len()
        );
    }

    Ok(())
}
