use super::record::TransactionRecord;
use rust_decimal::Decimal;

/// Why a record failed validation. Rules are checked in declaration order
/// and only the first failure is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("checksum mismatch: record carries {expected}, content counts {actual}")]
    ChecksumMismatch { expected: i64, actual: i64 },
    #[error("item code {0:?} may only contain letters, digits and '_'")]
    InvalidItemCode(String),
    #[error("sale price {0} is negative")]
    NegativeSalePrice(Decimal),
}

/// Letters of either case, digits and '.' each count once.
pub fn checksum(line: &str) -> i64 {
    let (mut uppercase, mut lowercase, mut numeric) = (0i64, 0i64, 0i64);
    for c in line.chars() {
        if c.is_ascii_uppercase() {
            uppercase += 1;
        } else if c.is_ascii_lowercase() {
            lowercase += 1;
        } else if c.is_ascii_digit() || c == '.' {
            numeric += 1;
        }
    }
    uppercase + lowercase + numeric
}

pub fn is_valid_item_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn check(record: &TransactionRecord) -> Result<(), Violation> {
    let actual = checksum(&record.content_line());
    if actual != record.checksum() {
        return Err(Violation::ChecksumMismatch {
            expected: record.checksum(),
            actual,
        });
    }

    if !is_valid_item_code(record.item_code()) {
        return Err(Violation::InvalidItemCode(record.item_code().to_string()));
    }

    if record.sale_price() < Decimal::ZERO {
        return Err(Violation::NegativeSalePrice(record.sale_price()));
    }

    Ok(())
}

pub fn validate(record: &TransactionRecord) -> bool {
    check(record).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldEdit;
    use rust_decimal_macros::dec;

    #[test]
    fn checksum_counts_letters_digits_and_points() {
        assert_eq!(checksum("ABC123"), 6);
        assert_eq!(checksum("Abc123"), 6);
        assert_eq!(checksum("123.45,6.7"), 9);
        assert_eq!(checksum("B001,ITEM123,100,10,150,2,290"), 23);
    }

    #[test]
    fn checksum_ignores_separators_signs_and_non_ascii() {
        assert_eq!(checksum(""), 0);
        assert_eq!(checksum(",,-_ @!"), 0);
        assert_eq!(checksum("-1.5"), 3);
        assert_eq!(checksum("Ünïcödé"), 3);
    }

    #[test]
    fn accepts_plain_item_codes() {
        for code in ["ITEM123", "item456", "Item_789", "A1B2C3"] {
            assert!(is_valid_item_code(code), "{code} should be accepted");
        }
    }

    #[test]
    fn rejects_item_codes_with_special_characters() {
        for code in ["ITEM@123", "item-456", "Item 789", "A1B2C3!", "", "ITEMé"] {
            assert!(!is_valid_item_code(code), "{code:?} should be rejected");
        }
    }

    #[test]
    fn sealed_record_passes() {
        let record = TransactionRecord::new("B001", "ITEM123", dec!(100), dec!(10), dec!(150), 2).unwrap();
        assert_eq!(check(&record), Ok(()));
        assert!(validate(&record));
    }

    #[test]
    fn each_rule_rejects_on_its_own() {
        let bad_code = TransactionRecord::new("B002", "ITEM@456", dec!(75), dec!(0), dec!(75), 1).unwrap();
        assert_eq!(
            check(&bad_code),
            Err(Violation::InvalidItemCode("ITEM@456".to_string()))
        );

        let negative = TransactionRecord::new("B003", "ITEM789", dec!(200), dec!(20), dec!(-150), 1).unwrap();
        assert_eq!(check(&negative), Err(Violation::NegativeSalePrice(dec!(-150))));

        let tampered = TransactionRecord::imported(
            "B004",
            "ITEM456",
            dec!(50),
            dec!(5),
            dec!(70),
            3,
            dec!(195),
            999,
        )
        .unwrap();
        assert!(matches!(
            check(&tampered),
            Err(Violation::ChecksumMismatch { expected: 999, .. })
        ));
        assert!(!validate(&tampered));
    }

    #[test]
    fn negative_cost_and_loss_do_not_invalidate() {
        let record = TransactionRecord::new("B005", "ITEM1", dec!(-10), dec!(-1), dec!(0), 4).unwrap();
        assert!(validate(&record));

        let loss = TransactionRecord::new("B006", "ITEM1", dec!(500), dec!(0), dec!(1), 1).unwrap();
        assert!(loss.profit() < Decimal::ZERO);
        assert!(validate(&loss));
    }

    #[test]
    fn rules_short_circuit_in_order() {
        let mut record = TransactionRecord::imported(
            "B999",
            "ITEM@123",
            dec!(100),
            dec!(10),
            dec!(-50),
            2,
            dec!(-110),
            999,
        )
        .unwrap();
        assert!(matches!(check(&record), Err(Violation::ChecksumMismatch { .. })));

        record.apply(FieldEdit::SalePrice(dec!(50))).unwrap();
        assert!(matches!(check(&record), Err(Violation::ChecksumMismatch { .. })));

        record.apply(FieldEdit::ItemCode("ITEM123".to_string())).unwrap();
        assert!(matches!(check(&record), Err(Violation::ChecksumMismatch { .. })));

        record.reseal();
        assert_eq!(check(&record), Ok(()));

        record.apply(FieldEdit::ItemCode("ITEM@123".to_string())).unwrap();
        record.reseal();
        assert!(matches!(check(&record), Err(Violation::InvalidItemCode(_))));
    }
}
