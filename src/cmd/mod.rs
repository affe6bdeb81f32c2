pub mod check;
pub mod delete;
pub mod edit;
pub mod list;
pub mod prune;
pub mod schema;
pub mod tax;

use crate::domain::{Edit, TaxProcessor, TransactionRecord};
use crate::records::{self, Projection};
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::Path;

/// Read transaction rows from a CSV file (or stdin with "-")
pub fn read_records(path: &Path) -> anyhow::Result<Vec<TransactionRecord>> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        records::read_csv(BufReader::new(file))
            .with_context(|| format!("reading {}", path.display()))
    }
}

fn read_from_stdin() -> anyhow::Result<Vec<TransactionRecord>> {
    let mut buffer = Vec::new();
    io::stdin().lock().read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    Ok(records::read_csv(io::Cursor::new(buffer))?)
}

/// Load a file into a fresh processor
pub fn load_processor(path: &Path) -> anyhow::Result<TaxProcessor> {
    let mut processor = TaxProcessor::new();
    processor.set_transactions(read_records(path)?);
    Ok(processor)
}

/// Write the core eight columns to `output`, or stdout when absent
pub fn write_records(records: &[TransactionRecord], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            records::write_csv(records, Projection::Core, BufWriter::new(file))?;
            log::info!("Wrote {} records to {}", records.len(), path.display());
        }
        None => records::write_csv(records, Projection::Core, io::stdout().lock())?,
    }
    Ok(())
}

/// Resolve an index-addressed mutation. A bad index is an error in strict
/// mode and a warning otherwise; a rejected record is always an error.
pub fn settle(outcome: Edit, strict: bool, action: &str) -> anyhow::Result<()> {
    match outcome {
        Edit::IndexOutOfRange { index, len } if !strict => {
            log::warn!("Ignoring {action} of record {index}: only {len} records loaded");
            Ok(())
        }
        _ => outcome
            .into_result()
            .with_context(|| format!("cannot {action} record")),
    }
}
