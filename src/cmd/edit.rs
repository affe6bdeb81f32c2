//! Edit command - change fields of one record and re-export the batch

use crate::cmd::{load_processor, settle, write_records};
use crate::domain::FieldEdit;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct EditCommand {
    /// CSV file containing transaction rows (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Zero-based index of the record to edit
    #[arg(short, long)]
    index: usize,

    #[arg(long)]
    bill_number: Option<String>,

    #[arg(long)]
    item_code: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    internal_price: Option<Decimal>,

    #[arg(long, allow_negative_numbers = true)]
    discount: Option<Decimal>,

    #[arg(long, allow_negative_numbers = true)]
    sale_price: Option<Decimal>,

    #[arg(long)]
    quantity: Option<u32>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail instead of warning when the index is out of range
    #[arg(long)]
    strict: bool,
}

impl EditCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let edits = self.field_edits();
        if edits.is_empty() {
            anyhow::bail!("No field changes given for record {}", self.index);
        }

        let mut processor = load_processor(&self.file)?;
        let outcome = processor.edit_record(self.index, edits);
        settle(outcome, self.strict, "edit")?;

        if let Some(record) = processor.transactions().get(self.index).filter(|_| outcome.is_applied()) {
            log::info!(
                "Record {} now has checksum {} and is {}",
                self.index,
                record.checksum(),
                if record.is_valid() { "valid" } else { "invalid" }
            );
        }

        write_records(processor.transactions(), self.output.as_deref())
    }

    fn field_edits(&self) -> Vec<FieldEdit> {
        let mut edits = Vec::new();
        if let Some(bill_number) = &self.bill_number {
            edits.push(FieldEdit::BillNumber(bill_number.clone()));
        }
        if let Some(item_code) = &self.item_code {
            edits.push(FieldEdit::ItemCode(item_code.clone()));
        }
        if let Some(price) = self.internal_price {
            edits.push(FieldEdit::InternalPrice(price));
        }
        if let Some(discount) = self.discount {
            edits.push(FieldEdit::Discount(discount));
        }
        if let Some(price) = self.sale_price {
            edits.push(FieldEdit::SalePrice(price));
        }
        if let Some(quantity) = self.quantity {
            edits.push(FieldEdit::Quantity(quantity));
        }
        edits
    }
}
