// src/ocr/grid.rs
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::ocr::models::AnalyzeResult;

/// One recognized table, addressed by zero-based row and column indices.
///
/// Rows and columns are kept in ordered maps so iteration order is fixed by
/// the indices alone, never by insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGrid {
    page_number: u32,
    rows: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl PageGrid {
    pub fn new(page_number: u32) -> Self {
        PageGrid {
            page_number,
            rows: BTreeMap::new(),
        }
    }

    /// Stores a cell. When the service reports two cells at the same
    /// position, the first one wins and the duplicate is logged.
    pub fn insert(&mut self, row: u32, column: u32, text: String) {
        let cells = self.rows.entry(row).or_default();
        match cells.entry(column) {
            Entry::Vacant(slot) => {
                slot.insert(text);
            }
            Entry::Occupied(_) => {
                tracing::warn!(
                    "Duplicate cell at page {} row {} column {}; keeping the first value",
                    self.page_number,
                    row,
                    column
                );
            }
        }
    }

    /// Page the table was recognized on (one-based, as reported).
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Number of rows that contain at least one cell.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell text at the given position, or "" when the cell is absent.
    pub fn text(&self, row: u32, column: u32) -> &str {
        self.rows
            .get(&row)
            .and_then(|cells| cells.get(&column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Iterates rows in ascending row order.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &BTreeMap<u32, String>)> {
        self.rows.iter().map(|(row, cells)| (*row, cells))
    }
}

#[cfg(test)]
impl PageGrid {
    /// Test helper: builds a grid from (row, column, text) triples.
    pub(crate) fn from_cells(page_number: u32, cells: &[(u32, u32, &str)]) -> Self {
        let mut grid = PageGrid::new(page_number);
        for (row, column, text) in cells {
            grid.insert(*row, *column, text.to_string());
        }
        grid
    }
}

/// Converts an analyze result into one grid per recognized table, in the
/// order the service returned them.
///
/// The page number comes from the table's bounding regions; tables without
/// any region fall back to their ordinal position.
pub fn pages_from_analyze(result: &AnalyzeResult) -> Vec<PageGrid> {
    let mut grids = Vec::with_capacity(result.tables.len());

    for (index, table) in result.tables.iter().enumerate() {
        let page_number = table
            .cells
            .first()
            .and_then(|cell| cell.boundingRegions.first())
            .or_else(|| table.boundingRegions.first())
            .map(|region| region.pageNumber)
            .unwrap_or(index as u32 + 1);

        let mut grid = PageGrid::new(page_number);
        let mut dropped = 0u32;

        for cell in &table.cells {
            // The layout model occasionally emits cells outside the declared
            // table bounds; those carry no usable position.
            if cell.rowIndex >= table.rowCount || cell.columnIndex >= table.columnCount {
                dropped += 1;
                continue;
            }
            grid.insert(cell.rowIndex, cell.columnIndex, cell.content.clone());
        }

        if dropped > 0 {
            tracing::warn!(
                "Table {} on page {}: dropped {} cells outside the declared {}x{} bounds",
                index,
                page_number,
                dropped,
                table.rowCount,
                table.columnCount
            );
        }

        grids.push(grid);
    }

    grids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::models::parse_envelope;

    #[test]
    fn builds_one_grid_per_table_with_page_numbers() {
        let json = r#"{
            "status": "succeeded",
            "analyzeResult": {
                "tables": [
                    {
                        "rowCount": 2, "columnCount": 3,
                        "cells": [
                            {"rowIndex": 0, "columnIndex": 0, "content": "a",
                             "boundingRegions": [{"pageNumber": 1}]},
                            {"rowIndex": 1, "columnIndex": 2, "content": "b"}
                        ]
                    },
                    {
                        "rowCount": 1, "columnCount": 1,
                        "cells": [{"rowIndex": 0, "columnIndex": 0, "content": "c"}],
                        "boundingRegions": [{"pageNumber": 2}]
                    }
                ]
            }
        }"#;
        let envelope = parse_envelope(json).unwrap();
        let grids = pages_from_analyze(envelope.require_result().unwrap());

        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0].page_number(), 1);
        assert_eq!(grids[0].text(0, 0), "a");
        assert_eq!(grids[0].text(1, 2), "b");
        assert_eq!(grids[1].page_number(), 2);
        assert_eq!(grids[1].text(0, 0), "c");
    }

    #[test]
    fn drops_cells_outside_declared_bounds() {
        let json = r#"{
            "status": "succeeded",
            "analyzeResult": {
                "tables": [{
                    "rowCount": 2, "columnCount": 2,
                    "cells": [
                        {"rowIndex": 0, "columnIndex": 0, "content": "kept"},
                        {"rowIndex": 5, "columnIndex": 0, "content": "row overflow"},
                        {"rowIndex": 0, "columnIndex": 9, "content": "column overflow"}
                    ]
                }]
            }
        }"#;
        let envelope = parse_envelope(json).unwrap();
        let grids = pages_from_analyze(envelope.require_result().unwrap());

        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].row_count(), 1);
        assert_eq!(grids[0].text(0, 0), "kept");
        assert_eq!(grids[0].text(5, 0), "");
    }

    #[test]
    fn missing_cells_read_as_empty_text() {
        let grid = PageGrid::from_cells(1, &[(0, 0, "only")]);
        assert_eq!(grid.text(0, 0), "only");
        assert_eq!(grid.text(0, 1), "");
        assert_eq!(grid.text(7, 7), "");
    }

    #[test]
    fn first_write_wins_on_duplicate_position() {
        let mut grid = PageGrid::new(1);
        grid.insert(0, 0, "first".to_string());
        grid.insert(0, 0, "second".to_string());
        assert_eq!(grid.text(0, 0), "first");
    }
}
