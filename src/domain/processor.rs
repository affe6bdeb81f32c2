use super::record::{FieldEdit, Overflow, TransactionRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

/// Decimal places kept on the rate fraction before it is applied.
const RATE_SCALE: u32 = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProcessorError {
    #[error("record index {index} out of range ({len} records)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("record {index} rejected: {source}")]
    RecordOverflow { index: usize, source: Overflow },
    #[error("tax cannot be computed: {0}")]
    TaxOverflow(#[from] Overflow),
}

/// Outcome of an index-addressed mutation.
///
/// Ignoring it gives the permissive behaviour where a bad index is a no-op;
/// [`Edit::into_result`] turns it into an error for stricter callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Applied,
    IndexOutOfRange { index: usize, len: usize },
    /// The edited record could not be derived; the collection is unchanged
    Rejected { index: usize, cause: Overflow },
}

impl Edit {
    pub fn is_applied(self) -> bool {
        matches!(self, Edit::Applied)
    }

    pub fn into_result(self) -> Result<(), ProcessorError> {
        match self {
            Edit::Applied => Ok(()),
            Edit::IndexOutOfRange { index, len } => {
                Err(ProcessorError::IndexOutOfRange { index, len })
            }
            Edit::Rejected { index, cause } => Err(ProcessorError::RecordOverflow {
                index,
                source: cause,
            }),
        }
    }
}

/// Record tallies, `invalid` is always `total - valid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecordCounts {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

pub fn record_counts(records: &[TransactionRecord]) -> RecordCounts {
    let total = records.len();
    let valid = records.iter().filter(|r| r.is_valid()).count();
    RecordCounts {
        total,
        valid,
        invalid: total - valid,
    }
}

/// Intermediate values of the final tax computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxBreakdown {
    /// Configured percentage
    pub tax_rate: Decimal,
    /// tax_rate / 100, rounded half-up to four places
    pub rate_fraction: Decimal,
    /// Sum of strictly positive profits
    pub total_profit: Decimal,
    /// Sum of the absolute value of non-positive profits
    pub total_loss: Decimal,
    /// max(0, total_profit - total_loss)
    pub taxable_amount: Decimal,
    pub tax: Decimal,
    /// Records that took part (valid ones)
    pub counted: usize,
    /// Invalid records left out
    pub excluded: usize,
}

/// Owns a batch of records and the tax rate applied to it.
#[derive(Debug, Clone, Default)]
pub struct TaxProcessor {
    transactions: Vec<TransactionRecord>,
    tax_rate: Decimal,
}

impl TaxProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the batch. Records are taken as they are, without revalidation.
    pub fn set_transactions(&mut self, transactions: Vec<TransactionRecord>) {
        self.transactions = transactions;
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn valid_transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.iter().filter(|r| r.is_valid())
    }

    pub fn invalid_transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.iter().filter(|r| !r.is_valid())
    }

    pub fn counts(&self) -> RecordCounts {
        record_counts(&self.transactions)
    }

    /// Stored as given, negative or above 100 included.
    pub fn set_tax_rate(&mut self, tax_rate: Decimal) {
        self.tax_rate = tax_rate;
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Replace the record at `index`.
    ///
    /// The replacement is re-derived, its checksum is recomputed from its
    /// content (whatever checksum it carried is discarded) and it is
    /// revalidated before it goes in.
    pub fn update_record(&mut self, index: usize, updated: TransactionRecord) -> Edit {
        let len = self.transactions.len();
        let Some(slot) = self.transactions.get_mut(index) else {
            return Edit::IndexOutOfRange { index, len };
        };

        let mut updated = match updated.recompute() {
            Ok(updated) => updated,
            Err(cause) => return Edit::Rejected { index, cause },
        };
        updated.reseal();
        updated.revalidate();
        *slot = updated;
        Edit::Applied
    }

    /// Apply field edits to a copy of the record at `index` and commit it
    /// through [`TaxProcessor::update_record`].
    pub fn edit_record<I>(&mut self, index: usize, edits: I) -> Edit
    where
        I: IntoIterator<Item = FieldEdit>,
    {
        let Some(current) = self.transactions.get(index) else {
            return Edit::IndexOutOfRange {
                index,
                len: self.transactions.len(),
            };
        };

        let mut updated = current.clone();
        for edit in edits {
            if let Err(cause) = updated.apply(edit) {
                return Edit::Rejected { index, cause };
            }
        }
        self.update_record(index, updated)
    }

    pub fn delete_record(&mut self, index: usize) -> Edit {
        if index < self.transactions.len() {
            self.transactions.remove(index);
            Edit::Applied
        } else {
            Edit::IndexOutOfRange {
                index,
                len: self.transactions.len(),
            }
        }
    }

    /// Drop every record whose profit is exactly zero. Returns how many went.
    pub fn delete_zero_profit_records(&mut self) -> usize {
        let before = self.transactions.len();
        self.transactions.retain(|r| !r.profit().is_zero());
        before - self.transactions.len()
    }

    pub fn calculate_final_tax(&self) -> Result<Decimal, ProcessorError> {
        Ok(self.tax_breakdown()?.tax)
    }

    /// Tax over the valid records only.
    ///
    /// Profits and losses are netted, floored at zero, then multiplied by the
    /// rate fraction. The fraction is rounded before the multiplication.
    /// Fails when a sum or the tax itself leaves the `Decimal` range.
    pub fn tax_breakdown(&self) -> Result<TaxBreakdown, ProcessorError> {
        let mut total_profit = Decimal::ZERO;
        let mut total_loss = Decimal::ZERO;
        let mut counted = 0;

        for record in self.valid_transactions() {
            let profit = record.profit();
            if profit > Decimal::ZERO {
                total_profit = total_profit
                    .checked_add(profit)
                    .ok_or(Overflow("total profit"))?;
            } else {
                total_loss = total_loss
                    .checked_add(profit.abs())
                    .ok_or(Overflow("total loss"))?;
            }
            counted += 1;
        }

        // Both sums are non-negative, so the difference always fits
        let taxable_amount = (total_profit - total_loss).max(Decimal::ZERO);
        let rate_fraction = rate_fraction(self.tax_rate);
        let tax = taxable_amount
            .checked_mul(rate_fraction)
            .ok_or(Overflow("tax"))?;

        Ok(TaxBreakdown {
            tax_rate: self.tax_rate,
            rate_fraction,
            total_profit,
            total_loss,
            taxable_amount,
            tax,
            counted,
            excluded: self.transactions.len() - counted,
        })
    }
}

fn rate_fraction(tax_rate: Decimal) -> Decimal {
    let mut fraction = (tax_rate / dec!(100))
        .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    fraction.rescale(RATE_SCALE);
    fraction
}
