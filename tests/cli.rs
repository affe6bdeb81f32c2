//! E2E tests running the txaudit binary against fixture batches

use std::process::{Command, Output};

fn txaudit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_txaudit"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Test that check reports counts and fails on rejected records
#[test]
fn check_reports_rejected_records() {
    let output = txaudit(&["check", "-f", "tests/data/batch.csv"]);
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1), "Command output: {:?}", output);
    assert!(stdout.contains("5 total | 3 valid | 2 invalid"));
    assert!(stdout.contains("ITEM@456"));
    assert!(stdout.contains("checksum mismatch"));
}

#[test]
fn check_passes_clean_batch() {
    let output = txaudit(&["check", "-f", "tests/data/all_valid.csv", "--json"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["counts"]["total"], 2);
    assert_eq!(json["counts"]["invalid"], 0);
    assert_eq!(json["issues"].as_array().map(Vec::len), Some(0));
}

/// Test the tax over valid records only
#[test]
fn tax_at_twenty_percent() {
    let output = txaudit(&["tax", "-f", "tests/data/batch.csv", "-r", "20"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Profit: 80 | Loss: 70 | Taxable: 10"));
    assert!(stdout.contains("Rate fraction: 0.2000"));
    assert!(stdout.contains("FINAL TAX: 2.0000"));
}

#[test]
fn tax_json_output() {
    let output = txaudit(&["tax", "-f", "tests/data/batch.csv", "-r", "12.345", "--json"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["rate_fraction"], "0.1235");
    assert_eq!(json["taxable_amount"], "10");
    assert_eq!(json["tax"], "1.2350");
    assert_eq!(json["excluded"], 2);
    assert_eq!(json["counts"]["valid"], 3);
}

#[test]
fn list_csv_includes_derived_columns() {
    let output = txaudit(&["list", "-f", "tests/data/batch.csv", "--csv", "--filter", "invalid"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines[0],
        "Bill Number,Item Code,Internal Price,Discount,Sale Price,Quantity,Line Total,Checksum,Profit,Valid"
    );
    assert_eq!(lines[1], "B004,ITEM@456,50,5,70,3,195,20,45,false");
    assert_eq!(lines[2], "B005,ITEM456,30,0,40,2,80,999,20,false");
    assert_eq!(lines.len(), 3);
}

#[test]
fn list_table() {
    let output = txaudit(&["list", "-f", "tests/data/batch.csv"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Line Total"));
    assert!(stdout.contains("B003"));
    assert!(stdout.contains("-70"));
}

/// Test that editing re-seals the checksum of a tampered record
#[test]
fn edit_reseals_checksum() {
    let output = txaudit(&["edit", "-f", "tests/data/batch.csv", "-i", "4", "--quantity", "3"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[5], "B005,ITEM456,30,0,40,3,120,20");
    // Untouched records keep their imported checksum
    assert_eq!(lines[1], "B001,ITEM123,100,10,150,2,280,23");
}

#[test]
fn edit_accepts_negative_prices() {
    let output = txaudit(&["edit", "-f", "tests/data/all_valid.csv", "-i", "0", "--sale-price", "-5"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.lines().nth(1).unwrap().starts_with("B001,ITEM123,100,10,-5,2,-30,"));
}

#[test]
fn edit_without_changes_fails() {
    let output = txaudit(&["edit", "-f", "tests/data/batch.csv", "-i", "0"]);
    assert!(!output.status.success());
}

#[test]
fn delete_out_of_range_is_ignored_unless_strict() {
    let output = txaudit(&["delete", "-f", "tests/data/all_valid.csv", "-i", "7"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(stdout(&output).lines().count(), 3);

    let strict = txaudit(&["delete", "-f", "tests/data/all_valid.csv", "-i", "7", "--strict"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("out of range"));
}

#[test]
fn delete_removes_record() {
    let output = txaudit(&["delete", "-f", "tests/data/batch.csv", "-i", "0"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(stdout.lines().count(), 5);
    assert!(!stdout.contains("B001"));
}

#[test]
fn prune_drops_zero_profit_records() {
    let output = txaudit(&["prune", "-f", "tests/data/batch.csv"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let bills: Vec<_> = stdout
        .lines()
        .skip(1)
        .filter_map(|l| l.split(',').next())
        .collect();
    assert_eq!(bills, vec!["B001", "B003", "B004", "B005"]);
}

#[test]
fn malformed_number_is_reported() {
    let output = txaudit(&["tax", "-f", "tests/data/malformed.csv", "-r", "20"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Sale Price"), "stderr: {stderr}");
}

#[test]
fn schema_header_matches_export() {
    let output = txaudit(&["schema", "csv-header"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        stdout(&output).trim(),
        "Bill Number,Item Code,Internal Price,Discount,Sale Price,Quantity,Line Total,Checksum"
    );

    let json = txaudit(&["schema", "json-schema"]);
    assert!(json.status.success());
    let schema: serde_json::Value = serde_json::from_str(&stdout(&json)).unwrap();
    assert!(schema["properties"]["Line Total"].is_object());
    assert!(schema["properties"]["Profit"].is_object());
}

#[test]
fn oversized_row_is_reported_not_panicked() {
    let output = txaudit(&["check", "-f", "tests/data/oversized.csv"]);
    assert_eq!(output.status.code(), Some(1), "Command output: {:?}", output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not fit in a decimal"), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");
}
