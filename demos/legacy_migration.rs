//! Legacy record migration example.
//!
//! Loads a stored history that mixes pre- and post-cutover payment layouts,
//! migrates it once into canonical events, and settles the result.

use expense_settler::core::balance::BalanceSheet;
use expense_settler::core::migration::{migrate_records, StoredRecord};
use expense_settler::settlement::plan::SettlementPlan;

const RECORDS: &str = r#"[
  { "description": "flat deposit", "amount": "900.00", "paid_by": "kim",
    "splits": [
      { "member": "kim", "amount": "300.00" },
      { "member": "lee", "amount": "300.00" },
      { "member": "max", "amount": "300.00" }
    ],
    "created_at": "2023-02-10T10:00:00Z" },
  { "description": "lee pays kim (old layout)", "amount": "300.00", "paid_by": "kim",
    "splits": [{ "member": "lee", "amount": "300.00" }],
    "is_payment": true, "created_at": "2023-03-01T18:30:00Z" },
  { "description": "internet", "amount": "45.00", "paid_by": "max",
    "splits": [
      { "member": "kim", "amount": "15.00" },
      { "member": "lee", "amount": "15.00" },
      { "member": "max", "amount": "15.00" }
    ],
    "created_at": "2023-09-01T08:00:00Z" },
  { "description": "max pays kim (new layout)", "amount": "100.00", "paid_by": "max",
    "splits": [{ "member": "kim", "amount": "100.00" }],
    "is_payment": true, "created_at": "2023-09-15T20:00:00Z" }
]"#;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  expense-settler: Legacy Record Migration  ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let records: Vec<StoredRecord> = match serde_json::from_str(RECORDS) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("invalid records: {}", e);
            return;
        }
    };

    for record in &records {
        println!(
            "  {:<28} legacy layout: {}",
            record.description.as_deref().unwrap_or("-"),
            record.is_legacy_payment()
        );
    }
    println!();

    let log = match migrate_records(&records) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("migration failed: {}", e);
            return;
        }
    };

    let balances = BalanceSheet::from_events(&log);
    println!("{}", balances);
    println!("{}", SettlementPlan::from_balances(balances));
}
