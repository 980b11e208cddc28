pub mod compute;
pub mod init;
pub mod play;
pub mod preview;
pub mod validate;

use std::path::Path;

use retime_common::RetimeError;
use retime_model::RemapDocument;

/// Load a document, wrapping failures in the shared error type.
pub fn load_document(path: &Path) -> anyhow::Result<RemapDocument> {
    let document = RemapDocument::load(path).map_err(|e| RetimeError::document(e.to_string()))?;
    Ok(document)
}
