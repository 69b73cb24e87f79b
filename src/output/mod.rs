//! Document rendering and artifact writing

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::Result;

/// Render a document in the selected format
pub fn render(document: &Value, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(document)?,
        OutputFormat::Json => serde_json::to_string_pretty(document)?,
    };
    Ok(rendered)
}

/// Write the rendered document to disk.
///
/// Writes to a sibling temp file and renames it into place, so a run that
/// dies mid-write never leaves a truncated artifact at the target path.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = match path.file_name() {
        Some(name) => {
            let mut tmp_name = name.to_os_string();
            tmp_name.push(".tmp");
            path.with_file_name(tmp_name)
        }
        None => path.with_file_name("artifact.tmp"),
    };

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
