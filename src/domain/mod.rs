pub mod processor;
pub mod record;
pub mod validator;

// Flat public surface for domain types and functions.
#[allow(unused_imports)]
pub use processor::{record_counts, Edit, ProcessorError, RecordCounts, TaxBreakdown, TaxProcessor};
#[allow(unused_imports)]
pub use record::{FieldEdit, Overflow, TransactionRecord};
#[allow(unused_imports)]
pub use validator::{check, checksum, is_valid_item_code, validate, Violation};
