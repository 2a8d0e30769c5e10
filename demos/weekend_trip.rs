//! Weekend trip settle-up example.
//!
//! Four friends share costs over a weekend, one pays a friend back
//! directly, and the engine works out who still owes whom.

use expense_settler::core::currency::CurrencyCode;
use expense_settler::core::event::Share;
use expense_settler::core::group::Group;
use expense_settler::core::member::MemberId;
use expense_settler::core::split::SplitRule;
use chrono::Utc;
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════╗");
    println!("║  expense-settler: Weekend Trip Example  ║");
    println!("╚════════════════════════════════════════╝\n");

    let ana = MemberId::new("ana");
    let ben = MemberId::new("ben");
    let chloe = MemberId::new("chloe");
    let dev = MemberId::new("dev");
    let everyone = SplitRule::Equal(vec![ana.clone(), ben.clone(), chloe.clone(), dev.clone()]);

    let mut trip = Group::new("Weekend in Porto", CurrencyCode::new("EUR"));
    for member in [&ana, &ben, &chloe, &dev] {
        trip.add_member(member.clone());
    }

    // --- Shared costs ---
    println!("━━━ Expenses ━━━\n");
    println!("  ana   paid 420.00 for the apartment (split 4 ways)");
    println!("  ben   paid 126.40 for dinner (split 4 ways)");
    println!("  chloe paid  60.00 for museum tickets (ana and dev only)");
    println!("  dev   paid  45.00 for wine (weighted: dev 2, ben 1)");
    println!("  ben   paid ana 50.00 back in cash\n");

    let steps = [
        trip.record_expense(ana.clone(), dec!(420.00), &everyone).map(|_| ()),
        trip.record_expense(ben.clone(), dec!(126.40), &everyone).map(|_| ()),
        trip.record_expense(
            chloe.clone(),
            dec!(60.00),
            &SplitRule::Exact(vec![
                Share::new(ana.clone(), dec!(30.00)),
                Share::new(dev.clone(), dec!(30.00)),
            ]),
        )
        .map(|_| ()),
        trip.record_expense(
            dev.clone(),
            dec!(45.00),
            &SplitRule::Weighted(vec![(dev.clone(), 2), (ben.clone(), 1)]),
        )
        .map(|_| ()),
        trip.record_settlement(ben.clone(), ana.clone(), dec!(50.00))
            .map(|_| ()),
    ];
    for step in steps {
        if let Err(e) = step {
            eprintln!("could not record event: {}", e);
            return;
        }
    }

    // --- Balances ---
    println!("{}", trip.balances());

    // --- Plan ---
    let plan = trip.settlement_plan();
    println!("{}", plan);

    // --- Settle and archive ---
    match trip.settle_all(Utc::now()) {
        Ok(count) => println!("Recorded {} settlement payments.", count),
        Err(e) => eprintln!("could not settle: {}", e),
    }
    println!("Archivable now: {}", trip.is_archivable());
}
