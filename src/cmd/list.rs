//! List command - record-level view with derived profit and validity

use crate::cmd::read_records;
use crate::domain::TransactionRecord;
use crate::records::{self, Projection};
use clap::{Args, ValueEnum};
use std::{io, path::PathBuf};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ListCommand {
    /// CSV file containing transaction rows (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Which records to show
    #[arg(long, value_enum, default_value_t = RecordFilter::All)]
    filter: RecordFilter,

    /// Output as CSV (with profit and validity columns) instead of a table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum RecordFilter {
    #[default]
    All,
    Valid,
    Invalid,
}

impl RecordFilter {
    fn admits(self, record: &TransactionRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Valid => record.is_valid(),
            RecordFilter::Invalid => !record.is_valid(),
        }
    }
}

/// Row for the records table output
#[derive(Debug, Clone, Tabled)]
struct RecordLine {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Bill")]
    bill_number: String,
    #[tabled(rename = "Item")]
    item_code: String,
    #[tabled(rename = "Internal")]
    internal_price: String,
    #[tabled(rename = "Discount")]
    discount: String,
    #[tabled(rename = "Sale")]
    sale_price: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Line Total")]
    line_total: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Checksum")]
    checksum: i64,
    #[tabled(rename = "Valid")]
    valid: &'static str,
}

impl RecordLine {
    fn new(index: usize, record: &TransactionRecord) -> Self {
        RecordLine {
            index,
            bill_number: record.bill_number().to_string(),
            item_code: record.item_code().to_string(),
            internal_price: record.internal_price().to_string(),
            discount: record.discount().to_string(),
            sale_price: record.sale_price().to_string(),
            quantity: record.quantity(),
            line_total: record.line_total().to_string(),
            profit: record.profit().to_string(),
            checksum: record.checksum(),
            valid: if record.is_valid() { "yes" } else { "no" },
        }
    }
}

impl ListCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = read_records(&self.file)?;

        if self.csv {
            let selected: Vec<_> = records
                .into_iter()
                .filter(|r| self.filter.admits(r))
                .collect();
            records::write_csv(&selected, Projection::WithDerived, io::stdout().lock())?;
            return Ok(());
        }

        let lines: Vec<_> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.filter.admits(r))
            .map(|(index, r)| RecordLine::new(index, r))
            .collect();

        if lines.is_empty() {
            println!("No records found matching filter");
            return Ok(());
        }

        let table = Table::new(&lines)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(3..10)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}
