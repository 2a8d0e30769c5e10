use crate::core::balance::BalanceSheet;
use crate::core::event::{EventError, GroupEvent};
use crate::core::member::MemberId;
use crate::settlement::simplifier::{DebtSimplifier, Transfer, PRECISION};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The transfers that settle a balance snapshot, together with that snapshot.
///
/// This is what settlement screens, exports and archive checks consume:
/// the ordered transfer list plus the totals derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Balances the plan was computed from.
    balances: BalanceSheet,
    /// Transfers in the order the simplifier produced them.
    transfers: Vec<Transfer>,
}

impl SettlementPlan {
    /// Simplify `balances` with the default tolerance.
    pub fn from_balances(balances: BalanceSheet) -> Self {
        Self::with_simplifier(balances, &DebtSimplifier::new())
    }

    pub fn with_simplifier(balances: BalanceSheet, simplifier: &DebtSimplifier) -> Self {
        let transfers = simplifier.simplify(balances.balances());
        Self {
            balances,
            transfers,
        }
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total outstanding debt: the sum of all transfer amounts.
    pub fn total_outstanding(&self) -> Decimal {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    /// Total owed to creditors in the input snapshot.
    pub fn total_owed(&self) -> Decimal {
        self.balances.total_owed()
    }

    /// Share of the owed total that the transfers cover, as a percentage.
    ///
    /// 100 for zero-sum input; lower when the snapshot was not zero-sum and
    /// part of a creditor's balance had no matching debtor.
    pub fn coverage_percent(&self) -> f64 {
        let owed = self.total_owed();
        if owed == Decimal::ZERO {
            return 100.0;
        }
        let pct = self.total_outstanding() * Decimal::from(100) / owed;
        pct.to_string().parse::<f64>().unwrap_or(0.0)
    }

    /// A group with nothing left to transfer can be archived.
    pub fn is_archivable(&self) -> bool {
        self.total_outstanding() <= PRECISION
    }

    /// Transfers where `member` pays or receives.
    pub fn transfers_for<'a>(&'a self, member: &'a MemberId) -> impl Iterator<Item = &'a Transfer> {
        self.transfers
            .iter()
            .filter(move |t| &t.from == member || &t.to == member)
    }

    /// The input balances with every transfer applied.
    pub fn resulting_balances(&self) -> BalanceSheet {
        let mut sheet = self.balances.clone();
        for transfer in &self.transfers {
            sheet.apply_transfer(transfer);
        }
        sheet
    }

    /// Record each transfer as a settlement event dated `at`.
    pub fn to_settlement_events(&self, at: DateTime<Utc>) -> Result<Vec<GroupEvent>, EventError> {
        self.transfers
            .iter()
            .map(|t| {
                GroupEvent::settlement(t.from.clone(), t.to.clone(), t.amount)
                    .map(|e| e.with_occurred_at(at).with_description("settle up"))
            })
            .collect()
    }
}

impl std::fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Plan ===")?;
        writeln!(f, "Members:         {}", self.balances.len())?;
        writeln!(f, "Transfers:       {}", self.transfers.len())?;
        writeln!(f, "Outstanding:     {}", self.total_outstanding())?;
        writeln!(f, "Coverage:        {:.1}%", self.coverage_percent())?;
        writeln!(f, "Archivable:      {}", self.is_archivable())?;

        if !self.transfers.is_empty() {
            writeln!(f)?;
            for (i, transfer) in self.transfers.iter().enumerate() {
                writeln!(f, "  {:>3}. {}", i + 1, transfer)?;
            }
        }
        Ok(())
    }
}
