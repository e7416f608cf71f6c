//! Terminal output for reports.

use owo_colors::OwoColorize;
use schemacheck::{AttributeValue, CheckStatus, ComparisonReport, StoredResult};

pub fn print_report(report: &ComparisonReport) {
    let status = match report.status {
        CheckStatus::Pass => "PASS".green().bold().to_string(),
        CheckStatus::Fail => "FAIL".red().bold().to_string(),
    };
    println!("{} {}", status, report.table.bold());

    for mismatch in &report.mismatches {
        println!(
            "  {} {}.{}: {} {} {}",
            "~".yellow(),
            mismatch.column_name,
            mismatch.attribute.dimmed(),
            value(&mismatch.expected),
            "->".dimmed(),
            value(&mismatch.actual),
        );
    }
    for column in &report.missing_columns {
        println!("  {} {} {}", "-".red(), column, "(missing)".dimmed());
    }
    for column in report.extra_columns() {
        println!("  {} {} {}", "+".cyan(), column, "(extra)".dimmed());
    }

    println!("{}", summary(report).dimmed());
}

pub fn print_stored(stored: &StoredResult) {
    println!("{} {}", "Report saved to".dimmed(), stored);
}

fn value(value: &Option<AttributeValue>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}

fn summary(report: &ComparisonReport) -> String {
    let mut summary = format!(
        "{} mismatch(es), {} missing column(s)",
        report.mismatches.len(),
        report.missing_columns.len()
    );
    if let Some(extra) = &report.extra_columns {
        summary.push_str(&format!(", {} extra column(s)", extra.len()));
    }
    summary
}
