use chrono::{TimeZone, Utc};
use expense_settler::core::balance::BalanceSheet;
use expense_settler::core::currency::CurrencyCode;
use expense_settler::core::event::{EventKind, Share};
use expense_settler::core::group::Group;
use expense_settler::core::member::MemberId;
use expense_settler::core::migration::{migrate_records, StoredRecord};
use expense_settler::core::split::SplitRule;
use expense_settler::settlement::plan::SettlementPlan;
use expense_settler::settlement::simplifier::{simplify, Transfer, PRECISION};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn balances(entries: &[(&str, Decimal)]) -> HashMap<MemberId, Decimal> {
    entries
        .iter()
        .map(|(id, b)| (MemberId::new(*id), *b))
        .collect()
}

/// Full pipeline: stored records → migration → balances → plan → settle.
#[test]
fn full_pipeline_shared_flat() {
    let json = r#"[
      { "amount": "1200.00", "paid_by": "ines",
        "splits": [
          { "member": "ines", "amount": "400.00" },
          { "member": "jon",  "amount": "400.00" },
          { "member": "kai",  "amount": "400.00" }
        ],
        "created_at": "2023-01-05T09:00:00Z" },
      { "amount": "150.00", "paid_by": "ines",
        "splits": [{ "member": "jon", "amount": "150.00" }],
        "is_payment": true, "created_at": "2023-02-01T09:00:00Z" },
      { "amount": "90.00", "paid_by": "kai",
        "splits": [
          { "member": "ines", "amount": "30.00" },
          { "member": "jon",  "amount": "30.00" },
          { "member": "kai",  "amount": "30.00" }
        ],
        "created_at": "2024-04-01T09:00:00Z" },
      { "amount": "100.00", "paid_by": "kai",
        "splits": [{ "member": "ines", "amount": "100.00" }],
        "is_payment": true, "created_at": "2024-04-02T09:00:00Z" }
    ]"#;

    let records: Vec<StoredRecord> = serde_json::from_str(json).unwrap();
    let log = migrate_records(&records).unwrap();
    assert_eq!(log.len(), 4);
    assert_eq!(log.total_spent(), dec!(1290.00));

    // ines: +1200 - 400 - 150 (legacy: jon paid ines) - 30 - 100 (kai paid ines) = 520
    // jon:  -400 + 150 - 30 = -280
    // kai:  -400 + 90 - 30 + 100 = -240
    let sheet = BalanceSheet::from_events(&log);
    assert_eq!(sheet.balance(&MemberId::new("ines")), dec!(520));
    assert_eq!(sheet.balance(&MemberId::new("jon")), dec!(-280));
    assert_eq!(sheet.balance(&MemberId::new("kai")), dec!(-240));
    assert_eq!(sheet.total(), Decimal::ZERO);

    let plan = SettlementPlan::from_balances(sheet);
    assert_eq!(
        plan.transfers(),
        &[
            Transfer::new("jon", "ines", dec!(280)),
            Transfer::new("kai", "ines", dec!(240)),
        ]
    );
    assert_eq!(plan.total_outstanding(), dec!(520));

    let mut group = Group::from_log("flat", CurrencyCode::new("EUR"), log);
    assert_eq!(group.settle_all(Utc::now()).unwrap(), 2);
    assert!(group.is_archivable());
}

#[test]
fn scenario_simple_triangle() {
    let transfers = simplify(&balances(&[("A", dec!(-30)), ("B", dec!(-20)), ("C", dec!(50))]));
    assert_eq!(
        transfers,
        vec![
            Transfer::new("A", "C", dec!(30)),
            Transfer::new("B", "C", dec!(20)),
        ]
    );
}

#[test]
fn scenario_exact_match_single_pair() {
    let transfers = simplify(&balances(&[("A", dec!(-15)), ("B", dec!(15))]));
    assert_eq!(transfers, vec![Transfer::new("A", "B", dec!(15))]);
}

#[test]
fn scenario_all_settled() {
    let transfers = simplify(&balances(&[
        ("A", dec!(0)),
        ("B", dec!(0.005)),
        ("C", dec!(-0.005)),
    ]));
    assert!(transfers.is_empty());
}

#[test]
fn scenario_empty_input() {
    assert!(simplify(&balances(&[])).is_empty());
}

/// Three-way splits leave sub-cent residue in exact arithmetic.
#[test]
fn thirds_residue_settles_cleanly() {
    let third = dec!(100) / dec!(3);
    let input = balances(&[("A", dec!(100) - third), ("B", -third), ("C", -third)]);
    let transfers = simplify(&input);
    assert_eq!(transfers.len(), 2);
    for t in &transfers {
        assert_eq!(t.to, MemberId::new("A"));
        assert!(t.amount > PRECISION);
    }

    let mut sheet = BalanceSheet::from(input);
    for t in &transfers {
        sheet.apply_transfer(t);
    }
    assert!(sheet.is_settled());
}

#[test]
fn group_records_are_validated_before_logging() {
    let mut group = Group::new("club", CurrencyCode::new("USD"));
    group.add_member(MemberId::new("a"));
    group.add_member(MemberId::new("b"));

    assert!(group
        .record_expense(
            MemberId::new("a"),
            dec!(10),
            &SplitRule::Exact(vec![Share::new("a", dec!(5)), Share::new("b", dec!(4))]),
        )
        .is_err());
    assert!(group
        .record_expense(
            MemberId::new("a"),
            dec!(10),
            &SplitRule::Equal(vec![MemberId::new("a"), MemberId::new("c")]),
        )
        .is_err());
    assert!(group.events().is_empty());
}

#[test]
fn settlement_events_serialize_and_fold() {
    let plan = SettlementPlan::from_balances(
        balances(&[("A", dec!(-30)), ("B", dec!(-20)), ("C", dec!(50))]).into(),
    );
    let at = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let events = plan.to_settlement_events(at).unwrap();

    let json = serde_json::to_string(&events).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["type"], "settlement");
    assert_eq!(parsed[0]["from"], "A");
    assert_eq!(parsed[0]["to"], "C");

    for event in &events {
        assert_eq!(event.occurred_at(), at);
        assert!(matches!(event.kind(), EventKind::Settlement { .. }));
    }

    let mut after = plan.balances().clone();
    for event in &events {
        after.apply_event(event);
    }
    assert!(after.is_settled());
}

#[test]
fn zero_decimal_currency_group() {
    let mut group = Group::new("tokyo", CurrencyCode::new("JPY"));
    for id in ["a", "b", "c"] {
        group.add_member(MemberId::new(id));
    }
    group
        .record_expense(
            MemberId::new("a"),
            dec!(10000),
            &SplitRule::Equal(vec![MemberId::new("a"), MemberId::new("b"), MemberId::new("c")]),
        )
        .unwrap();

    let sheet = group.balances();
    assert_eq!(sheet.balance(&MemberId::new("a")), dec!(6666));
    assert_eq!(sheet.balance(&MemberId::new("b")), dec!(-3333));
    assert_eq!(sheet.balance(&MemberId::new("c")), dec!(-3333));
}
