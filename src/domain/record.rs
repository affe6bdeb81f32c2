use super::validator;
use rust_decimal::Decimal;
use std::borrow::Cow;

/// A derived amount that does not fit in a [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} does not fit in a decimal")]
pub struct Overflow(pub &'static str);

/// A change to one input field of a [`TransactionRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    BillNumber(String),
    ItemCode(String),
    InternalPrice(Decimal),
    Discount(Decimal),
    SalePrice(Decimal),
    Quantity(u32),
}

impl FieldEdit {
    /// Whether the edit changes an input of `line_total` or `profit`
    pub fn is_economic(&self) -> bool {
        matches!(
            self,
            FieldEdit::InternalPrice(_)
                | FieldEdit::Discount(_)
                | FieldEdit::SalePrice(_)
                | FieldEdit::Quantity(_)
        )
    }
}

/// One line of a transaction batch.
///
/// `line_total`, `profit` and `valid` are derived and can only change through
/// [`TransactionRecord::recompute`] and [`TransactionRecord::revalidate`].
/// A record only exists once its derived amounts fit in a `Decimal`.
/// The `checksum` is whatever the source file carried until the record is
/// resealed by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Bill the line belongs to, not required to be unique
    bill_number: String,
    /// Item identifier, letters, digits and underscore only
    item_code: String,
    internal_price: Decimal,
    discount: Decimal,
    sale_price: Decimal,
    quantity: u32,
    /// sale_price * quantity - discount * quantity
    line_total: Decimal,
    /// Content checksum, imported or recomputed on edit
    checksum: i64,
    /// line_total - internal_price * quantity
    profit: Decimal,
    /// Outcome of the last validation
    valid: bool,
}

impl TransactionRecord {
    /// Build a record from an imported row.
    ///
    /// The imported checksum is kept as is. The imported line total is
    /// replaced by the derived one before validation runs.
    #[allow(clippy::too_many_arguments)]
    pub fn imported(
        bill_number: impl Into<String>,
        item_code: impl Into<String>,
        internal_price: Decimal,
        discount: Decimal,
        sale_price: Decimal,
        quantity: u32,
        line_total: Decimal,
        checksum: i64,
    ) -> Result<Self, Overflow> {
        let mut record = TransactionRecord {
            bill_number: bill_number.into(),
            item_code: item_code.into(),
            internal_price,
            discount,
            sale_price,
            quantity,
            line_total,
            checksum,
            profit: Decimal::ZERO,
            valid: false,
        }
        .recompute()?;

        if record.line_total != line_total {
            log::debug!(
                "Bill {} item {}: imported line total {} replaced by {}",
                record.bill_number,
                record.item_code,
                line_total,
                record.line_total
            );
        }
        record.revalidate();
        Ok(record)
    }

    /// Build a record on the edit path, with a checksum computed from its content.
    pub fn new(
        bill_number: impl Into<String>,
        item_code: impl Into<String>,
        internal_price: Decimal,
        discount: Decimal,
        sale_price: Decimal,
        quantity: u32,
    ) -> Result<Self, Overflow> {
        let mut record = TransactionRecord {
            bill_number: bill_number.into(),
            item_code: item_code.into(),
            internal_price,
            discount,
            sale_price,
            quantity,
            line_total: Decimal::ZERO,
            checksum: 0,
            profit: Decimal::ZERO,
            valid: false,
        }
        .recompute()?;
        record.reseal();
        record.revalidate();
        Ok(record)
    }

    /// Derive `line_total` and then `profit` from the economic fields.
    pub fn recompute(mut self) -> Result<Self, Overflow> {
        self.derive()?;
        Ok(self)
    }

    fn derive(&mut self) -> Result<(), Overflow> {
        let quantity = Decimal::from(self.quantity);
        let sale_total = self
            .sale_price
            .checked_mul(quantity)
            .ok_or(Overflow("sale price times quantity"))?;
        let discount_total = self
            .discount
            .checked_mul(quantity)
            .ok_or(Overflow("discount times quantity"))?;
        let internal_total = self
            .internal_price
            .checked_mul(quantity)
            .ok_or(Overflow("internal price times quantity"))?;

        let line_total = sale_total
            .checked_sub(discount_total)
            .ok_or(Overflow("line total"))?;
        let profit = line_total
            .checked_sub(internal_total)
            .ok_or(Overflow("profit"))?;

        self.line_total = line_total;
        self.profit = profit;
        Ok(())
    }

    /// Set one field. Economic edits re-derive `line_total` and `profit`;
    /// checksum and validity are left for the processor to settle.
    ///
    /// On overflow the record is left as it was.
    pub fn apply(&mut self, edit: FieldEdit) -> Result<(), Overflow> {
        let economic = edit.is_economic();
        let mut next = self.clone();
        match edit {
            FieldEdit::BillNumber(bill_number) => next.bill_number = bill_number,
            FieldEdit::ItemCode(item_code) => next.item_code = item_code,
            FieldEdit::InternalPrice(price) => next.internal_price = price,
            FieldEdit::Discount(discount) => next.discount = discount,
            FieldEdit::SalePrice(price) => next.sale_price = price,
            FieldEdit::Quantity(quantity) => next.quantity = quantity,
        }
        if economic {
            next.derive()?;
        }
        *self = next;
        Ok(())
    }

    /// Overwrite the checksum with the one computed from the current content.
    pub fn reseal(&mut self) {
        self.checksum = validator::checksum(&self.content_line());
    }

    /// Run the validator and store its verdict.
    pub fn revalidate(&mut self) -> bool {
        self.valid = validator::validate(self);
        self.valid
    }

    /// The seven content fields joined by commas, used as checksum input.
    ///
    /// Commas and backslashes inside the text fields are escaped with a
    /// backslash. Neither counts towards the checksum.
    pub fn content_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            escape_field(&self.bill_number),
            escape_field(&self.item_code),
            self.internal_price,
            self.discount,
            self.sale_price,
            self.quantity,
            self.line_total
        )
    }

    pub fn bill_number(&self) -> &str {
        &self.bill_number
    }

    pub fn item_code(&self) -> &str {
        &self.item_code
    }

    pub fn internal_price(&self) -> Decimal {
        self.internal_price
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn sale_price(&self) -> Decimal {
        self.sale_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn line_total(&self) -> Decimal {
        self.line_total
    }

    pub fn checksum(&self) -> i64 {
        self.checksum
    }

    pub fn profit(&self) -> Decimal {
        self.profit
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if !field.contains([',', '\\']) {
        return Cow::Borrowed(field);
    }
    let mut escaped = String::with_capacity(field.len() + 2);
    for c in field.chars() {
        if c == ',' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}
