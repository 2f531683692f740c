// src/parser/verify.rs
use serde::Serialize;

use crate::parser::aggregate::{round2, YearBucket};
use crate::parser::records::StatedTotal;

/// One reconciled year: the computed bucket total against the figure
/// printed in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCheck {
    pub year: String,
    pub computed: f64,
    pub expected: f64,
}

/// Outcome of comparing computed year totals against stated ones.
/// Advisory only; a mismatch never blocks producing the parse result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub matches: Vec<YearCheck>,
    pub mismatches: Vec<YearCheck>,
    pub total_match: bool,
}

/// Compares each computed year total against the stated total for that
/// year, within an absolute tolerance that absorbs rounding.
///
/// A document may print a total more than once for the same year (a page
/// subtotal followed by the final figure); the last one wins. Years
/// present on only one side are informational gaps, not mismatches.
pub fn reconcile(
    buckets: &[YearBucket],
    stated: &[StatedTotal],
    tolerance: f64,
) -> VerificationReport {
    let mut expected: Vec<(String, f64)> = Vec::new();
    for total in stated {
        match expected.iter_mut().find(|(year, _)| *year == total.year) {
            Some((_, amount)) => *amount = total.amount,
            None => expected.push((total.year.clone(), total.amount)),
        }
    }

    let mut matches = Vec::new();
    let mut mismatches = Vec::new();

    for bucket in buckets {
        let stated_amount = expected
            .iter()
            .find(|(year, _)| *year == bucket.year)
            .map(|(_, amount)| *amount);

        match stated_amount {
            Some(amount) => {
                let check = YearCheck {
                    year: bucket.year.clone(),
                    computed: bucket.total,
                    expected: amount,
                };
                // Both figures carry two printed decimals, so the difference
                // is rounded back to that precision before the tolerance
                // check; the raw f64 subtraction can inflate an exact 0.01
                // gap past the threshold.
                if round2((bucket.total - amount).abs()) <= tolerance {
                    matches.push(check);
                } else {
                    tracing::warn!(
                        "Year {}: computed total {:.2} differs from stated total {:.2}",
                        bucket.year,
                        bucket.total,
                        amount
                    );
                    mismatches.push(check);
                }
            }
            None => {
                tracing::debug!("Year {}: no stated total to check against", bucket.year);
            }
        }
    }

    for (year, _) in &expected {
        if !buckets.iter().any(|bucket| bucket.year == *year) {
            tracing::debug!("Stated total for year {} has no computed records", year);
        }
    }

    let checked = matches.len() + mismatches.len();
    VerificationReport {
        total_match: checked > 0 && mismatches.is_empty(),
        matches,
        mismatches,
    }
}
