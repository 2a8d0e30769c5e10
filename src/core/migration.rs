//! One-time conversion of stored expense records into canonical events.
//!
//! Stored payment records come in two layouts. Records created before
//! [`LEGACY_PAYMENT_CUTOVER`] put the *recipient* in `paid_by` and the sender
//! in the single split; later records put the sender in `paid_by` and the
//! recipient in the split. Migration resolves the layout once, at ingestion,
//! and produces [`GroupEvent`]s that always name the sender explicitly.

use crate::core::event::{EventError, EventLog, GroupEvent, Share};
use crate::core::member::MemberId;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Payment records created before this Unix timestamp (2023-06-01T00:00:00Z)
/// use the legacy layout.
pub const LEGACY_PAYMENT_CUTOVER: i64 = 1_685_577_600;

/// Errors raised while migrating stored records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("payment record {id} must have exactly one split, found {found}")]
    MalformedPayment { id: Uuid, found: usize },
    #[error("record {id}: {source}")]
    InvalidRecord {
        id: Uuid,
        #[source]
        source: EventError,
    },
}

/// One split line as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSplit {
    pub member: MemberId,
    pub amount: Decimal,
}

/// The persisted document shape of an expense or payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
    pub paid_by: MemberId,
    pub splits: Vec<StoredSplit>,
    #[serde(default)]
    pub is_payment: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredRecord {
    /// True for payment records written in the pre-cutover layout.
    pub fn is_legacy_payment(&self) -> bool {
        self.is_payment && self.created_at.timestamp() < LEGACY_PAYMENT_CUTOVER
    }
}

/// Convert one stored record into a canonical event.
pub fn migrate_record(record: &StoredRecord) -> Result<GroupEvent, MigrationError> {
    let invalid = |source| MigrationError::InvalidRecord {
        id: record.id,
        source,
    };

    let event = if record.is_payment {
        let [split] = record.splits.as_slice() else {
            return Err(MigrationError::MalformedPayment {
                id: record.id,
                found: record.splits.len(),
            });
        };
        let (from, to) = if record.is_legacy_payment() {
            debug!("record {} uses the legacy payment layout", record.id);
            (split.member.clone(), record.paid_by.clone())
        } else {
            (record.paid_by.clone(), split.member.clone())
        };
        GroupEvent::settlement(from, to, record.amount).map_err(invalid)?
    } else {
        let shares = record
            .splits
            .iter()
            .map(|s| Share::new(s.member.clone(), s.amount))
            .collect();
        GroupEvent::expense(record.paid_by.clone(), record.amount, shares).map_err(invalid)?
    };

    let event = event.with_id(record.id).with_occurred_at(record.created_at);
    Ok(match &record.description {
        Some(description) => event.with_description(description.clone()),
        None => event,
    })
}

/// Migrate a batch of records into a chronologically ordered log.
///
/// Fails on the first invalid record; nothing is partially migrated.
pub fn migrate_records(records: &[StoredRecord]) -> Result<EventLog, MigrationError> {
    let mut log = records
        .iter()
        .map(migrate_record)
        .collect::<Result<EventLog, _>>()?;
    log.sort_chronologically();

    let legacy = records.iter().filter(|r| r.is_legacy_payment()).count();
    info!(
        "migrated {} records ({} legacy payments)",
        log.len(),
        legacy
    );
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::balance::BalanceSheet;
    use crate::core::event::EventKind;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn payment(paid_by: &str, split: &str, amount: Decimal, created_at: DateTime<Utc>) -> StoredRecord {
        StoredRecord {
            id: Uuid::new_v4(),
            description: None,
            amount,
            paid_by: MemberId::new(paid_by),
            splits: vec![StoredSplit {
                member: MemberId::new(split),
                amount,
            }],
            is_payment: true,
            created_at,
        }
    }

    #[test]
    fn test_cutover_constant_matches_date() {
        let cutover = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(cutover.timestamp(), LEGACY_PAYMENT_CUTOVER);
    }

    #[test]
    fn test_new_layout_payment() {
        let record = payment("bob", "alice", dec!(20), at(2024, 3, 1));
        assert!(!record.is_legacy_payment());
        let event = migrate_record(&record).unwrap();
        assert_eq!(
            event.kind(),
            &EventKind::Settlement {
                from: MemberId::new("bob"),
                to: MemberId::new("alice"),
                amount: dec!(20),
            }
        );
        assert_eq!(event.id(), record.id);
    }

    #[test]
    fn test_legacy_layout_payment_is_reversed() {
        let record = payment("alice", "bob", dec!(20), at(2022, 11, 5));
        assert!(record.is_legacy_payment());
        let event = migrate_record(&record).unwrap();
        assert_eq!(
            event.kind(),
            &EventKind::Settlement {
                from: MemberId::new("bob"),
                to: MemberId::new("alice"),
                amount: dec!(20),
            }
        );
    }

    #[test]
    fn test_both_layouts_fold_to_same_balances() {
        let expense = StoredRecord {
            id: Uuid::new_v4(),
            description: Some("groceries".into()),
            amount: dec!(40),
            paid_by: MemberId::new("alice"),
            splits: vec![
                StoredSplit { member: MemberId::new("alice"), amount: dec!(20) },
                StoredSplit { member: MemberId::new("bob"), amount: dec!(20) },
            ],
            is_payment: false,
            created_at: at(2022, 10, 1),
        };
        let legacy = payment("alice", "bob", dec!(20), at(2022, 11, 1));
        let modern = payment("bob", "alice", dec!(20), at(2024, 1, 1));

        let old = BalanceSheet::from_events(&migrate_records(&[expense.clone(), legacy]).unwrap());
        let new = BalanceSheet::from_events(&migrate_records(&[expense, modern]).unwrap());

        assert!(old.is_settled());
        assert_eq!(old, new);
    }

    #[test]
    fn test_records_sorted_chronologically() {
        let late = payment("bob", "alice", dec!(5), at(2024, 5, 1));
        let early = payment("carol", "alice", dec!(7), at(2024, 1, 1));
        let log = migrate_records(&[late, early]).unwrap();
        assert_eq!(log.events()[0].kind().amount(), dec!(7));
        assert_eq!(log.events()[1].kind().amount(), dec!(5));
    }

    #[test]
    fn test_malformed_payment() {
        let mut record = payment("bob", "alice", dec!(5), at(2024, 5, 1));
        record.splits.clear();
        assert_eq!(
            migrate_record(&record),
            Err(MigrationError::MalformedPayment {
                id: record.id,
                found: 0
            })
        );
    }

    #[test]
    fn test_expense_with_bad_splits() {
        let record = StoredRecord {
            id: Uuid::new_v4(),
            description: None,
            amount: dec!(10),
            paid_by: MemberId::new("alice"),
            splits: vec![StoredSplit { member: MemberId::new("bob"), amount: dec!(9) }],
            is_payment: false,
            created_at: at(2024, 1, 1),
        };
        assert!(matches!(
            migrate_record(&record),
            Err(MigrationError::InvalidRecord {
                source: EventError::SplitMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_record_json_defaults() {
        let json = r#"{
            "amount": "12.00",
            "paid_by": "alice",
            "splits": [{ "member": "bob", "amount": "12.00" }],
            "created_at": "2024-02-01T09:30:00Z"
        }"#;
        let record: StoredRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_payment);
        assert!(record.description.is_none());
        assert!(migrate_record(&record).is_ok());
    }
}
