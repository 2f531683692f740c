// src/parser/aggregate.rs
use std::cmp::Ordering;

use serde::Serialize;

use crate::parser::records::IncomeRecord;

/// One income code within a year, with amounts summed across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeLine {
    pub code: String,
    pub name: String,
    pub amount: f64,
}

/// All income lines of one reporting year plus the computed year total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBucket {
    pub year: String,
    pub codes: Vec<CodeLine>,
    pub total: f64,
}

/// Rounds to two decimal places, the precision amounts are printed with.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Orders numeric text numerically and ahead of non-numeric labels, which
// compare lexically among themselves. This keeps the ordering total even
// when keys mix forms.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

struct CodeAcc {
    code: String,
    name: String,
    sum: f64,
}

struct YearAcc {
    year: String,
    codes: Vec<CodeAcc>,
}

/// Groups records by year, then by code within each year.
///
/// The same code recurring across pages of one year has its amounts
/// summed. Year keys are kept verbatim, so a non-numeric label forms its
/// own bucket instead of being coerced. Output order is deterministic:
/// years ascending, codes ascending, first-seen order on ties.
pub fn aggregate_records(records: &[IncomeRecord]) -> Vec<YearBucket> {
    let mut years: Vec<YearAcc> = Vec::new();

    for record in records {
        let year_index = match years.iter().position(|year| year.year == record.year) {
            Some(index) => index,
            None => {
                years.push(YearAcc {
                    year: record.year.clone(),
                    codes: Vec::new(),
                });
                years.len() - 1
            }
        };
        let year = &mut years[year_index];

        match year.codes.iter_mut().find(|code| code.code == record.code) {
            Some(code) => {
                code.sum += record.amount;
                // Keep the first non-empty name seen for the code.
                if code.name.is_empty() && !record.name.is_empty() {
                    code.name = record.name.clone();
                }
            }
            None => {
                year.codes.push(CodeAcc {
                    code: record.code.clone(),
                    name: record.name.clone(),
                    sum: record.amount,
                });
            }
        }
    }

    years.sort_by(|a, b| compare_keys(&a.year, &b.year));

    years
        .into_iter()
        .map(|year| {
            let mut codes: Vec<CodeLine> = year
                .codes
                .into_iter()
                .map(|code| CodeLine {
                    code: code.code,
                    name: code.name,
                    amount: round2(code.sum),
                })
                .collect();
            codes.sort_by(|a, b| compare_keys(&a.code, &b.code));

            let total = round2(codes.iter().map(|code| code.amount).sum());
            YearBucket {
                year: year.year,
                codes,
                total,
            }
        })
        .collect()
}

/// Sum of all year totals.
pub fn grand_total(years: &[YearBucket]) -> f64 {
    round2(years.iter().map(|year| year.total).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: &str, code: &str, name: &str, amount: f64) -> IncomeRecord {
        IncomeRecord {
            year: year.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            amount,
        }
    }

    #[test]
    fn sums_the_same_code_across_pages() {
        let records = vec![
            record("2023", "101", "Заробітна плата", 50.0),
            record("2023", "101", "Заробітна плата", 25.5),
        ];

        let buckets = aggregate_records(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].codes.len(), 1);
        assert_eq!(buckets[0].codes[0].amount, 75.5);
        assert_eq!(buckets[0].total, 75.5);
    }

    #[test]
    fn orders_years_and_codes_ascending() {
        let records = vec![
            record("2024", "126", "Продаж", 1.0),
            record("2023", "126", "Продаж", 2.0),
            record("2023", "101", "Зарплата", 3.0),
            record("довідково", "101", "Зарплата", 4.0),
        ];

        let buckets = aggregate_records(&records);
        let years: Vec<&str> = buckets.iter().map(|b| b.year.as_str()).collect();
        assert_eq!(years, vec!["2023", "2024", "довідково"]);

        let codes: Vec<&str> = buckets[0].codes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["101", "126"]);
    }

    #[test]
    fn first_non_empty_name_wins() {
        let records = vec![
            record("2023", "101", "", 1.0),
            record("2023", "101", "Заробітна плата", 1.0),
            record("2023", "101", "інша назва", 1.0),
        ];

        let buckets = aggregate_records(&records);
        assert_eq!(buckets[0].codes[0].name, "Заробітна плата");
        assert_eq!(buckets[0].codes[0].amount, 3.0);
    }

    #[test]
    fn year_total_equals_sum_of_its_code_amounts() {
        let records = vec![
            record("2023", "101", "Зарплата", 156000.10),
            record("2023", "126", "Продаж", 45000.25),
            record("2023", "133", "Інше", 0.65),
        ];

        let buckets = aggregate_records(&records);
        let sum: f64 = buckets[0].codes.iter().map(|c| c.amount).sum();
        assert!((sum - buckets[0].total).abs() < 0.01);
        assert_eq!(buckets[0].total, 201001.0);
    }

    #[test]
    fn grand_total_equals_sum_of_year_totals() {
        let records = vec![
            record("2023", "101", "Зарплата", 201000.0),
            record("2024", "101", "Зарплата", 180000.0),
        ];

        let buckets = aggregate_records(&records);
        let summed: f64 = buckets.iter().map(|b| b.total).sum();
        assert_eq!(grand_total(&buckets), round2(summed));
        assert_eq!(grand_total(&buckets), 381000.0);
    }
}
