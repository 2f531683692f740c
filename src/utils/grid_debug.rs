// src/utils/grid_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::ocr::grid::PageGrid;
use crate::utils::error::AppError;

/// How many rows of each table grid the preview shows.
const PREVIEW_ROWS: usize = 5;

/// Saves a plain-text preview of the recognized table grids.
/// Useful for checking what the layout model actually returned when the
/// parser cannot find the expected column structure.
pub fn save_grid_preview(pages: &[PageGrid], path: &Path) -> Result<(), AppError> {
    let mut preview = String::new();

    for grid in pages {
        preview.push_str(&format!(
            "page {} ({} rows)\n",
            grid.page_number(),
            grid.row_count()
        ));

        for (row, cells) in grid.rows().take(PREVIEW_ROWS) {
            preview.push_str(&format!("  row {:>3}:", row));
            for (column, text) in cells {
                preview.push_str(&format!(" [{}]='{}'", column, text));
            }
            preview.push('\n');
        }

        if grid.row_count() > PREVIEW_ROWS {
            preview.push_str(&format!(
                "  ... {} more rows\n",
                grid.row_count() - PREVIEW_ROWS
            ));
        }
        preview.push('\n');
    }

    let mut file = File::create(path)?;
    file.write_all(preview.as_bytes())?;

    tracing::info!("Saved grid preview to {}", path.display());
    Ok(())
}
