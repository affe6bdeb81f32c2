//! Delete command - drop one record by index

use crate::cmd::{load_processor, settle, write_records};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// CSV file containing transaction rows (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Zero-based index of the record to delete
    #[arg(short, long)]
    index: usize,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail instead of warning when the index is out of range
    #[arg(long)]
    strict: bool,
}

impl DeleteCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut processor = load_processor(&self.file)?;
        settle(processor.delete_record(self.index), self.strict, "delete")?;
        write_records(processor.transactions(), self.output.as_deref())
    }
}
