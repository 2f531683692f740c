// src/parser/report.rs
use serde_json::{json, Map, Value};

use crate::parser::verify::VerificationReport;
use crate::parser::ParseResult;

/// Renders the result as the nested mapping the CRM side consumes:
/// year -> (code -> {name, amount}) plus a synthetic "_total" per year.
pub fn machine_json(result: &ParseResult) -> Value {
    let mut years = Map::new();

    for bucket in &result.years {
        let mut entries = Map::new();
        for code in &bucket.codes {
            entries.insert(
                code.code.clone(),
                json!({ "name": code.name, "amount": code.amount }),
            );
        }
        entries.insert("_total".to_string(), json!(bucket.total));
        years.insert(bucket.year.clone(), Value::Object(entries));
    }

    Value::Object(years)
}

/// Renders the result as the human-readable timeline text.
pub fn text_summary(result: &ParseResult) -> String {
    if result.years.is_empty() {
        return "Не знайдено даних про доходи у документі".to_string();
    }

    let ruler_heavy = "=".repeat(80);
    let ruler_light = "-".repeat(80);

    let mut lines = Vec::new();
    lines.push(ruler_heavy.clone());
    lines.push("АНАЛІЗ СПРАВКИ ПРО ДОХОДИ".to_string());
    lines.push(ruler_heavy.clone());
    lines.push(String::new());

    lines.push(format!("Загальна сума: {:.2} грн", result.grand_total));
    let years: Vec<&str> = result.years.iter().map(|bucket| bucket.year.as_str()).collect();
    lines.push(format!("Періоди: {}", years.join(", ")));
    lines.push(reconciliation_status(&result.verification));
    lines.push(String::new());

    for bucket in &result.years {
        lines.push(ruler_light.clone());
        lines.push(format!("{} рік • Всього: {:.2} грн", bucket.year, bucket.total));
        lines.push(ruler_light.clone());
        lines.push(String::new());

        for code in &bucket.codes {
            let name = if code.name.is_empty() {
                "-"
            } else {
                code.name.as_str()
            };
            lines.push(format!("   Код {}: {}", code.code, name));
            lines.push(format!("      Сума: {:.2} грн", code.amount));
            lines.push(String::new());
        }

        if let Some(line) = year_check_line(&result.verification, &bucket.year) {
            lines.push(line);
            lines.push(String::new());
        }
    }

    lines.push(ruler_heavy);
    lines.join("\n")
}

fn reconciliation_status(verification: &VerificationReport) -> String {
    let checked = verification.matches.len() + verification.mismatches.len();
    if checked == 0 {
        "Звірка: підсумкові рядки не знайдено".to_string()
    } else if verification.mismatches.is_empty() {
        "Звірка: підсумки збігаються".to_string()
    } else {
        format!(
            "Звірка: розбіжність у {} з {} періодів",
            verification.mismatches.len(),
            checked
        )
    }
}

fn year_check_line(verification: &VerificationReport, year: &str) -> Option<String> {
    if let Some(check) = verification.matches.iter().find(|check| check.year == year) {
        return Some(format!("Звірка: збігається ({:.2} грн)", check.expected));
    }
    if let Some(check) = verification.mismatches.iter().find(|check| check.year == year) {
        return Some(format!(
            "Звірка: розбіжність (обчислено {:.2} грн, у документі {:.2} грн)",
            check.computed, check.expected
        ));
    }
    None
}
