// src/parser/layout.rs
use std::collections::BTreeMap;

use crate::ocr::grid::PageGrid;
use crate::utils::error::ParseError;

/// Semantic meaning of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Year,
    Amount,
    Code,
}

/// One entry of the declarative indicator-row pattern: for a row to
/// qualify, its cell at `column` must equal `marker` after trimming.
///
/// The markers are the column numbers the document prints in its own
/// numbering row, so a layout revision is a data change here rather than
/// a code change.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorAnchor {
    pub column: u32,
    pub marker: String,
    pub role: Option<ColumnRole>,
}

impl IndicatorAnchor {
    pub fn new(column: u32, marker: &str, role: Option<ColumnRole>) -> Self {
        IndicatorAnchor {
            column,
            marker: marker.to_string(),
            role,
        }
    }
}

/// Column positions of the four fields the extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoleMap {
    pub year: u32,
    pub amount: u32,
    pub code: u32,
    pub name: u32,
}

/// Where the indicator row was found: index of the grid within the input
/// sequence, and the row inside that grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorPosition {
    pub grid_index: usize,
    pub row: u32,
}

/// Scans the grids in reading order for the first row matching every
/// anchor, and derives the column role map from the anchor set.
///
/// The name column is not marked by a role of its own; it sits at a fixed
/// offset after the code column.
pub fn detect_column_roles(
    pages: &[PageGrid],
    anchors: &[IndicatorAnchor],
    name_offset: u32,
) -> Result<(ColumnRoleMap, IndicatorPosition), ParseError> {
    for (grid_index, grid) in pages.iter().enumerate() {
        for (row, _cells) in grid.rows() {
            let is_indicator = anchors
                .iter()
                .all(|anchor| grid.text(row, anchor.column).trim() == anchor.marker);
            if !is_indicator {
                continue;
            }

            let roles = role_map_from_anchors(anchors, name_offset);
            tracing::info!(
                "Indicator row found on page {} row {} (year col {}, amount col {}, code col {})",
                grid.page_number(),
                row,
                roles.year,
                roles.amount,
                roles.code
            );
            return Ok((roles, IndicatorPosition { grid_index, row }));
        }
    }

    Err(ParseError::StructureNotFound)
}

fn role_map_from_anchors(anchors: &[IndicatorAnchor], name_offset: u32) -> ColumnRoleMap {
    let mut year = None;
    let mut amount = None;
    let mut code = None;

    for anchor in anchors {
        match anchor.role {
            Some(ColumnRole::Year) => year = Some(anchor.column),
            Some(ColumnRole::Amount) => amount = Some(anchor.column),
            Some(ColumnRole::Code) => code = Some(anchor.column),
            None => {}
        }
    }

    // The anchor list is parser configuration; a set that does not mark
    // all three columns cannot drive extraction at all.
    let code = code.expect("anchor specification must mark a code column");
    ColumnRoleMap {
        year: year.expect("anchor specification must mark a year column"),
        amount: amount.expect("anchor specification must mark an amount column"),
        code,
        name: code + name_offset,
    }
}

/// A data-candidate row surviving the merge, with its origin retained for
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow<'a> {
    pub page: u32,
    pub row: u32,
    cells: &'a BTreeMap<u32, String>,
}

impl<'a> MergedRow<'a> {
    pub(crate) fn new(page: u32, row: u32, cells: &'a BTreeMap<u32, String>) -> Self {
        MergedRow { page, row, cells }
    }

    /// Cell text at the given column, or "" when the cell is absent.
    pub fn text(&self, column: u32) -> &'a str {
        self.cells.get(&column).map(String::as_str).unwrap_or("")
    }
}

/// Concatenates the per-page grids into one ordered data stream.
///
/// Grids before the one carrying the indicator row are front matter and
/// are dropped whole. On the indicator grid itself, every row at or above
/// the indicator is header noise. Continuation grids contribute all their
/// rows, with the same role map applied throughout.
pub fn merge_pages<'a>(pages: &'a [PageGrid], indicator: IndicatorPosition) -> Vec<MergedRow<'a>> {
    let mut merged = Vec::new();

    for (grid_index, grid) in pages.iter().enumerate() {
        if grid_index < indicator.grid_index {
            continue;
        }
        for (row, cells) in grid.rows() {
            if grid_index == indicator.grid_index && row <= indicator.row {
                continue;
            }
            merged.push(MergedRow::new(grid.page_number(), row, cells));
        }
    }

    tracing::debug!("Merged {} data rows from the table grids", merged.len());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors() -> Vec<IndicatorAnchor> {
        vec![
            IndicatorAnchor::new(0, "1", None),
            IndicatorAnchor::new(4, "5", Some(ColumnRole::Year)),
            IndicatorAnchor::new(7, "8", Some(ColumnRole::Amount)),
            IndicatorAnchor::new(13, "14", Some(ColumnRole::Code)),
        ]
    }

    fn indicator_cells(row: u32) -> Vec<(u32, u32, &'static str)> {
        vec![(row, 0, "1"), (row, 4, "5"), (row, 7, "8"), (row, 13, "14")]
    }

    #[test]
    fn derives_role_map_from_indicator_row() {
        let mut cells = indicator_cells(5);
        cells.push((6, 4, "2023"));
        let pages = vec![PageGrid::from_cells(1, &cells)];

        let (roles, position) = detect_column_roles(&pages, &anchors(), 1).unwrap();
        assert_eq!(roles.year, 4);
        assert_eq!(roles.amount, 7);
        assert_eq!(roles.code, 13);
        assert_eq!(roles.name, 14);
        assert_eq!(position, IndicatorPosition { grid_index: 0, row: 5 });
    }

    #[test]
    fn indicator_markers_match_after_trimming() {
        let pages = vec![PageGrid::from_cells(
            1,
            &[(2, 0, " 1 "), (2, 4, "5\n"), (2, 7, " 8"), (2, 13, "14 ")],
        )];

        let (_, position) = detect_column_roles(&pages, &anchors(), 1).unwrap();
        assert_eq!(position.row, 2);
    }

    #[test]
    fn missing_indicator_row_is_a_structure_error() {
        // Plausible header text, but no column-numbering row anywhere.
        let pages = vec![
            PageGrid::from_cells(1, &[(0, 0, "Довідка"), (1, 4, "Рік")]),
            PageGrid::from_cells(2, &[(0, 4, "2023"), (0, 7, "100.00")]),
        ];

        let result = detect_column_roles(&pages, &anchors(), 1);
        assert!(matches!(result, Err(ParseError::StructureNotFound)));
    }

    #[test]
    fn rows_at_or_above_indicator_are_excluded() {
        let cells = vec![
            (0, 0, "Додаток 1"),
            (3, 4, "Рік"),
            (5, 0, "1"),
            (5, 4, "5"),
            (5, 7, "8"),
            (5, 13, "14"),
            (6, 4, "2023"),
            (7, 4, "2024"),
        ];
        let pages = vec![PageGrid::from_cells(1, &cells)];

        let (_, position) = detect_column_roles(&pages, &anchors(), 1).unwrap();
        let rows = merge_pages(&pages, position);

        let positions: Vec<(u32, u32)> = rows.iter().map(|r| (r.page, r.row)).collect();
        assert_eq!(positions, vec![(1, 6), (1, 7)]);
        assert_eq!(rows[0].text(4), "2023");
    }

    #[test]
    fn front_matter_grids_are_dropped_and_continuations_kept_whole() {
        let mut indicator_page = indicator_cells(4);
        indicator_page.push((5, 4, "2023"));
        let pages = vec![
            // A cover table with no indicator row at all.
            PageGrid::from_cells(1, &[(0, 0, "Титульна сторінка")]),
            PageGrid::from_cells(2, &indicator_page),
            // Continuation data starts at row 0.
            PageGrid::from_cells(3, &[(0, 4, "2024"), (1, 4, "2025")]),
        ];

        let (_, position) = detect_column_roles(&pages, &anchors(), 1).unwrap();
        assert_eq!(position.grid_index, 1);

        let rows = merge_pages(&pages, position);
        let positions: Vec<(u32, u32)> = rows.iter().map(|r| (r.page, r.row)).collect();
        assert_eq!(positions, vec![(2, 5), (3, 0), (3, 1)]);
    }
}
