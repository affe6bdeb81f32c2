//! Prune command - sweep out records that made exactly zero profit

use crate::cmd::{load_processor, write_records};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PruneCommand {
    /// CSV file containing transaction rows (or "-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl PruneCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut processor = load_processor(&self.file)?;
        let removed = processor.delete_zero_profit_records();
        log::info!(
            "Removed {} zero-profit records, {} left",
            removed,
            processor.transactions().len()
        );
        write_records(processor.transactions(), self.output.as_deref())
    }
}
