//! expense-settler CLI
//!
//! Fold expense histories into balances and compute settle-up transfers.
//!
//! # Usage
//!
//! ```bash
//! # Show each member's balance
//! expense-settler balances --input records.json
//!
//! # Compute the transfers that settle the group
//! expense-settler settle --input records.json --format json
//!
//! # Simplify a raw balance map
//! expense-settler simplify --input balances.json
//!
//! # Generate a random history for testing
//! expense-settler generate --members 8 --expenses 40
//! ```
//!
//! Set `RUST_LOG=debug` to see migration and simplification details.

use expense_settler::core::balance::{BalanceSheet, Standing};
use expense_settler::core::event::EventKind;
use expense_settler::core::member::MemberId;
use expense_settler::core::migration::{migrate_records, StoredRecord, StoredSplit};
use expense_settler::settlement::plan::SettlementPlan;
use expense_settler::simulation::random_group::{generate_random_group, GroupConfig};
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"expense-settler — shared-expense balances and settle-up transfers

USAGE:
    expense-settler <COMMAND> [OPTIONS]

COMMANDS:
    balances    Show each member's net balance from an expense history
    settle      Compute the transfers that settle an expense history
    simplify    Compute the transfers that settle a raw balance map
    generate    Generate a random expense history (for testing)
    help        Show this message

OPTIONS (balances, settle, simplify):
    --input <FILE>      Path to JSON input file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --members <N>       Number of members (default: 6)
    --expenses <N>      Number of expenses (default: 20)
    --seed <N>          Seed for reproducible output
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    expense-settler balances --input records.json
    expense-settler settle --input records.json --format json
    expense-settler simplify --input balances.json
    expense-settler generate --members 8 --expenses 40 --output records.json"#
    );
}

/// JSON schema for an expense history.
#[derive(serde::Deserialize, serde::Serialize)]
struct RecordsFile {
    records: Vec<StoredRecord>,
}

/// JSON schema for a raw balance map.
#[derive(serde::Deserialize)]
struct BalancesFile {
    balances: BTreeMap<MemberId, Decimal>,
}

#[derive(serde::Serialize)]
struct BalanceOutput {
    member: String,
    balance: String,
    status: Standing,
}

#[derive(serde::Serialize)]
struct TransferOutput {
    from: String,
    to: String,
    amount: String,
}

#[derive(serde::Serialize)]
struct PlanOutput {
    transfers: Vec<TransferOutput>,
    total_outstanding: String,
    coverage_percent: f64,
    archivable: bool,
}

struct CommonArgs {
    input: String,
    json: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn parse_common_args(args: &[String]) -> CommonArgs {
    let mut input = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--input requires a file path")),
                );
            }
            "--format" => {
                i += 1;
                format = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail("--format requires 'text' or 'json'"));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let input = input.unwrap_or_else(|| fail("--input <FILE> is required"));
    let json = match format.as_str() {
        "json" => true,
        "text" => false,
        other => fail(format!("unknown format '{}', expected 'text' or 'json'", other)),
    };
    CommonArgs { input, json }
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read file '{}': {}", path, e)))
}

fn load_balances_from_records(path: &str) -> BalanceSheet {
    let file: RecordsFile = serde_json::from_str(&read_input(path)).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "records": [
    {{ "amount": "30.00", "paid_by": "alice",
       "splits": [{{ "member": "bob", "amount": "30.00" }}],
       "is_payment": false, "created_at": "2024-05-01T12:00:00Z" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let log = migrate_records(&file.records).unwrap_or_else(|e| fail(e));
    debug!("loaded {} events from '{}'", log.len(), path);

    BalanceSheet::from_events(&log)
}

fn load_raw_balances(path: &str) -> BalanceSheet {
    let file: BalancesFile = serde_json::from_str(&read_input(path)).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(r#"{{ "balances": {{ "alice": "-30", "bob": -20, "carol": "50" }} }}"#);
        process::exit(1);
    });

    file.balances.into_iter().collect()
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(format!("cannot serialize output: {}", e)));
    println!("{}", json);
}

fn print_plan(sheet: BalanceSheet, json: bool) {
    let plan = SettlementPlan::from_balances(sheet);
    info!("{} transfers settle {} members", plan.len(), plan.balances().len());

    if json {
        print_json(&PlanOutput {
            transfers: plan
                .transfers()
                .iter()
                .map(|t| TransferOutput {
                    from: t.from.to_string(),
                    to: t.to.to_string(),
                    amount: t.amount.to_string(),
                })
                .collect(),
            total_outstanding: plan.total_outstanding().to_string(),
            coverage_percent: plan.coverage_percent(),
            archivable: plan.is_archivable(),
        });
    } else {
        println!("{}", plan);
    }
}

fn cmd_balances(args: &[String]) {
    let args = parse_common_args(args);
    let sheet = load_balances_from_records(&args.input);

    if args.json {
        let rows: Vec<BalanceOutput> = sheet
            .sorted()
            .into_iter()
            .map(|(member, balance)| BalanceOutput {
                member: member.to_string(),
                balance: balance.to_string(),
                status: Standing::of(balance),
            })
            .collect();
        print_json(&rows);
    } else {
        println!("{}", sheet);
    }
}

fn cmd_settle(args: &[String]) {
    let args = parse_common_args(args);
    print_plan(load_balances_from_records(&args.input), args.json);
}

fn cmd_simplify(args: &[String]) {
    let args = parse_common_args(args);
    print_plan(load_raw_balances(&args.input), args.json);
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| fail(format!("{} requires a number", flag)))
}

fn cmd_generate(args: &[String]) {
    let mut config = GroupConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                config.member_count = parse_number(args, i, "--members");
            }
            "--expenses" => {
                i += 1;
                config.expense_count = parse_number(args, i, "--expenses");
            }
            "--seed" => {
                i += 1;
                config.seed = Some(parse_number(args, i, "--seed"));
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let log = generate_random_group(&config).unwrap_or_else(|e| fail(e));

    let records = log
        .events()
        .iter()
        .filter_map(|event| match event.kind() {
            EventKind::Expense {
                payer,
                amount,
                shares,
            } => Some(StoredRecord {
                id: event.id(),
                description: event.description().map(str::to_string),
                amount: *amount,
                paid_by: payer.clone(),
                splits: shares
                    .iter()
                    .map(|s| StoredSplit {
                        member: s.member.clone(),
                        amount: s.amount,
                    })
                    .collect(),
                is_payment: false,
                created_at: event.occurred_at(),
            }),
            EventKind::Settlement { .. } => None,
        })
        .collect();

    let json = serde_json::to_string_pretty(&RecordsFile { records })
        .unwrap_or_else(|e| fail(format!("cannot serialize output: {}", e)));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("cannot write to '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} members → {}",
            log.len(),
            config.member_count,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "simplify" => cmd_simplify(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
