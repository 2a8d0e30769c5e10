use crate::core::event::{EventLog, GroupEvent};
use crate::core::member::MemberId;
use crate::settlement::simplifier::{DebtSimplifier, Transfer, PRECISION};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a single balance stands, judged with [`PRECISION`] tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Standing {
    Creditor,
    Debtor,
    Settled,
}

impl Standing {
    pub fn of(balance: Decimal) -> Self {
        if balance > PRECISION {
            Standing::Creditor
        } else if balance < -PRECISION {
            Standing::Debtor
        } else {
            Standing::Settled
        }
    }
}

/// Net balance of each member of a group.
///
/// A positive balance means the member is owed money (net creditor).
/// A negative balance means the member owes money (net debtor).
///
/// Built as a fold over an [`EventLog`]. Every event applied to it is
/// zero-sum, so a sheet built from valid events always totals zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    balances: HashMap<MemberId, Decimal>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every event of a log into a fresh sheet.
    pub fn from_events(log: &EventLog) -> Self {
        log.events().iter().fold(Self::new(), |mut sheet, event| {
            sheet.apply_event(event);
            sheet
        })
    }

    /// Start a sheet where every member of `members` is present at zero.
    pub fn with_members<'a>(members: impl IntoIterator<Item = &'a MemberId>) -> Self {
        Self {
            balances: members
                .into_iter()
                .map(|m| (m.clone(), Decimal::ZERO))
                .collect(),
        }
    }

    /// Apply an event: the paying side gains, the owing side loses.
    pub fn apply_event(&mut self, event: &GroupEvent) {
        for (member, delta) in event.kind().deltas() {
            *self.balances.entry(member.clone()).or_insert(Decimal::ZERO) += delta;
        }
    }

    /// Apply a transfer as if it had been paid.
    pub fn apply_transfer(&mut self, transfer: &Transfer) {
        *self
            .balances
            .entry(transfer.from.clone())
            .or_insert(Decimal::ZERO) += transfer.amount;
        *self
            .balances
            .entry(transfer.to.clone())
            .or_insert(Decimal::ZERO) -= transfer.amount;
    }

    /// Balance of one member; unknown members are at zero.
    pub fn balance(&self, member: &MemberId) -> Decimal {
        self.balances.get(member).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn balances(&self) -> &HashMap<MemberId, Decimal> {
        &self.balances
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances. Zero for any sheet built from valid events.
    pub fn total(&self) -> Decimal {
        self.balances.values().sum()
    }

    /// True when the balances sum to zero within [`PRECISION`].
    pub fn is_balanced(&self) -> bool {
        self.total().abs() <= PRECISION
    }

    /// True when no member holds a balance beyond [`PRECISION`].
    pub fn is_settled(&self) -> bool {
        self.balances.values().all(|b| b.abs() <= PRECISION)
    }

    /// Total owed to creditors (sum of positive balances).
    pub fn total_owed(&self) -> Decimal {
        self.balances
            .values()
            .filter(|b| **b > Decimal::ZERO)
            .sum()
    }

    /// Members and balances sorted by member id.
    pub fn sorted(&self) -> Vec<(&MemberId, Decimal)> {
        let mut entries: Vec<_> = self.balances.iter().map(|(m, b)| (m, *b)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Transfers that settle this sheet, using the default tolerance.
    pub fn simplify(&self) -> Vec<Transfer> {
        DebtSimplifier::new().simplify(&self.balances)
    }
}

impl FromIterator<(MemberId, Decimal)> for BalanceSheet {
    fn from_iter<T: IntoIterator<Item = (MemberId, Decimal)>>(iter: T) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<MemberId, Decimal>> for BalanceSheet {
    fn from(balances: HashMap<MemberId, Decimal>) -> Self {
        Self { balances }
    }
}

impl std::fmt::Display for BalanceSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Balances ===")?;
        for (member, balance) in self.sorted() {
            let status = match Standing::of(balance) {
                Standing::Creditor => "is owed",
                Standing::Debtor => "owes",
                Standing::Settled => "settled",
            };
            writeln!(f, "  {:<16} {:>12}  [{}]", member, balance, status)?;
        }
        writeln!(f, "Total owed:      {}", self.total_owed())?;
        writeln!(f, "Balanced:        {}", self.is_balanced())?;
        Ok(())
    }
}
