//! CSV export of company rows

use std::path::{Path, PathBuf};

use zefix_core::{CompanyRow, ExportConfig, Result, ZefixError};

/// File name for a search key; path separators are replaced
pub fn file_name(search_key: &str, suffix: &str) -> String {
    let stem: String = search_key
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{stem}{suffix}")
}

/// Write `rows` to `{search_key}{suffix}` in the configured directory.
///
/// Returns the written path, or `None` when there is nothing to write.
pub fn write_csv(
    config: &ExportConfig,
    search_key: &str,
    rows: &[CompanyRow],
) -> Result<Option<PathBuf>> {
    if rows.is_empty() {
        tracing::info!("No rows to export for {:?}", search_key);
        return Ok(None);
    }

    std::fs::create_dir_all(&config.output_dir)?;
    let path = config
        .output_dir
        .join(file_name(search_key, &config.file_suffix));

    write_rows(&path, rows)?;
    tracing::info!("Exported {} companies to {}", rows.len(), path.display());
    Ok(Some(path))
}

fn write_rows(path: &Path, rows: &[CompanyRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| ZefixError::ExportError(format!("{}: {e}", path.display())))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ZefixError::ExportError(format!("{}: {e}", path.display())))?;
    }
    writer.flush()?;
    Ok(())
}
