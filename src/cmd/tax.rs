//! Tax command - final tax over the valid records of a batch

use crate::cmd::load_processor;
use crate::domain::{RecordCounts, TaxBreakdown};
use anyhow::Context;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TaxCommand {
    /// CSV file containing transaction rows (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Tax rate as a percentage (e.g. 20 for 20%)
    #[arg(short, long, default_value_t = Decimal::ZERO, allow_negative_numbers = true)]
    rate: Decimal,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct TaxOutput {
    counts: RecordCounts,
    #[serde(flatten)]
    breakdown: TaxBreakdown,
}

impl TaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut processor = load_processor(&self.file)?;
        processor.set_tax_rate(self.rate);

        let counts = processor.counts();
        for record in processor.invalid_transactions() {
            log::debug!(
                "Excluding invalid record: bill {} item {}",
                record.bill_number(),
                record.item_code()
            );
        }
        let breakdown = processor
            .tax_breakdown()
            .with_context(|| format!("tax at {}%", processor.tax_rate()))?;
        log::info!(
            "Tax {} on taxable amount {} at {}%",
            breakdown.tax,
            breakdown.taxable_amount,
            processor.tax_rate()
        );

        if self.json {
            let output = TaxOutput { counts, breakdown };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_summary(counts, &breakdown);
        }
        Ok(())
    }
}

fn print_summary(counts: RecordCounts, breakdown: &TaxBreakdown) {
    println!();
    println!("TAX SUMMARY ({}%)", breakdown.tax_rate);
    println!();
    println!(
        "  Records: {} | Counted: {} | Excluded (invalid): {}",
        counts.total, breakdown.counted, breakdown.excluded
    );
    println!(
        "  Profit: {} | Loss: {} | Taxable: {}",
        breakdown.total_profit, breakdown.total_loss, breakdown.taxable_amount
    );
    println!("  Rate fraction: {}", breakdown.rate_fraction);
    println!();
    println!("FINAL TAX: {}", breakdown.tax);
    println!();
}
