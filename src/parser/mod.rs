// src/parser/mod.rs
pub mod aggregate;
pub mod layout;
pub mod records;
pub mod report;
pub mod verify;

use serde::Serialize;

use crate::ocr::grid::PageGrid;
use crate::utils::error::ParseError;

use aggregate::YearBucket;
use layout::{ColumnRole, IndicatorAnchor};
use records::AmountParseError;
use verify::VerificationReport;

/// Tunable parameters of the parsing pipeline.
///
/// The defaults describe the current revision of the income statement
/// form; a layout revision means new anchors, not new code.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Declarative indicator-row pattern identifying the column layout.
    pub anchors: Vec<IndicatorAnchor>,
    /// Offset of the name column relative to the code column.
    pub name_offset: u32,
    /// Lowercase words marking a stated-total row.
    pub total_markers: Vec<String>,
    /// Absolute tolerance for reconciling computed against stated totals.
    pub tolerance: f64,
    /// Resource guard: maximum number of table grids per document.
    pub max_pages: u32,
    /// Resource guard: maximum number of populated rows per document.
    pub max_rows: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            anchors: vec![
                IndicatorAnchor::new(0, "1", None),
                IndicatorAnchor::new(4, "5", Some(ColumnRole::Year)),
                IndicatorAnchor::new(7, "8", Some(ColumnRole::Amount)),
                IndicatorAnchor::new(13, "14", Some(ColumnRole::Code)),
            ],
            name_offset: 1,
            total_markers: vec![
                "всього".to_string(),
                "усього".to_string(),
                "разом".to_string(),
            ],
            tolerance: 0.01,
            max_pages: 50,
            max_rows: 5_000,
        }
    }
}

/// Everything one parse produces. Built once and immutable; a new
/// document requires a new parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub years: Vec<YearBucket>,
    pub grand_total: f64,
    pub verification: VerificationReport,
    pub diagnostics: Vec<AmountParseError>,
}

/// The full pipeline from per-page table grids to the aggregated,
/// verified income summary.
pub struct IncomeStatementParser {
    config: ParserConfig,
}

impl IncomeStatementParser {
    pub fn new() -> Self {
        IncomeStatementParser {
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(config: ParserConfig) -> Self {
        IncomeStatementParser { config }
    }

    /// Runs detection, merge, extraction, aggregation and reconciliation
    /// over the document's table grids.
    pub fn parse(&self, pages: &[PageGrid]) -> Result<ParseResult, ParseError> {
        self.check_size(pages)?;
        tracing::info!("Parsing document with {} table grids", pages.len());

        let (roles, indicator) =
            layout::detect_column_roles(pages, &self.config.anchors, self.config.name_offset)?;
        let rows = layout::merge_pages(pages, indicator);
        let extracted = records::extract_rows(&rows, roles, &self.config.total_markers);

        let years = aggregate::aggregate_records(&extracted.records);
        let grand_total = aggregate::grand_total(&years);
        let verification = verify::reconcile(&years, &extracted.stated_totals, self.config.tolerance);

        tracing::info!(
            "Parsed {} years, grand total {:.2}, {} diagnostics",
            years.len(),
            grand_total,
            extracted.diagnostics.len()
        );

        Ok(ParseResult {
            years,
            grand_total,
            verification,
            diagnostics: extracted.diagnostics,
        })
    }

    fn check_size(&self, pages: &[PageGrid]) -> Result<(), ParseError> {
        let page_count = pages.len() as u32;
        let row_count: u32 = pages.iter().map(|grid| grid.row_count() as u32).sum();

        if page_count > self.config.max_pages || row_count > self.config.max_rows {
            return Err(ParseError::DocumentTooLarge {
                pages: page_count,
                rows: row_count,
                max_pages: self.config.max_pages,
                max_rows: self.config.max_rows,
            });
        }
        Ok(())
    }
}

impl Default for IncomeStatementParser {
    fn default() -> Self {
        Self::new()
    }
}
