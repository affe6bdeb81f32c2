//! Check command - report which records fail validation and why

use crate::cmd::read_records;
use crate::domain::{check, record_counts, RecordCounts};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckCommand {
    /// CSV file containing transaction rows (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A rejected record for output
#[derive(Debug, Clone, Serialize)]
struct Issue {
    index: usize,
    bill_number: String,
    item_code: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    counts: RecordCounts,
    issues: Vec<Issue>,
}

impl CheckCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = read_records(&self.file)?;
        let counts = record_counts(&records);

        let issues: Vec<Issue> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                check(record).err().map(|violation| Issue {
                    index,
                    bill_number: record.bill_number().to_string(),
                    item_code: record.item_code().to_string(),
                    reason: violation.to_string(),
                })
            })
            .collect();

        if self.json {
            let output = CheckOutput {
                counts,
                issues: issues.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(counts, &issues);
        }

        // Exit with code 1 if any record was rejected
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn print_text(counts: RecordCounts, issues: &[Issue]) {
    println!();
    println!(
        "RECORDS: {} total | {} valid | {} invalid",
        counts.total, counts.valid, counts.invalid
    );
    println!();

    if issues.is_empty() {
        println!("\u{2713} All records passed validation.");
        return;
    }

    println!("\u{26A0} {} record(s) rejected:", issues.len());
    println!();
    for issue in issues {
        println!(
            "  #{} bill {} item {}",
            issue.index, issue.bill_number, issue.item_code
        );
        println!("     {}", issue.reason);
    }
    println!();
}
