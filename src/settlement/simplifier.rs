use crate::core::member::MemberId;
use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Smallest balance treated as non-zero: one minor currency unit.
pub const PRECISION: Decimal = dec!(0.01);

/// A directed payment instruction: `from` owes `to` exactly `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

impl Transfer {
    pub fn new(from: impl Into<MemberId>, to: impl Into<MemberId>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

impl std::fmt::Display for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}: {}", self.from, self.to, self.amount)
    }
}

/// A member with an unsettled magnitude still to be matched.
struct Position<'a> {
    member: &'a MemberId,
    remaining: Decimal,
}

/// Larger magnitude first; equal magnitudes by ascending member id.
fn by_magnitude(a: &Position<'_>, b: &Position<'_>) -> Ordering {
    b.remaining
        .cmp(&a.remaining)
        .then_with(|| a.member.cmp(b.member))
}

/// Greedy debt simplifier.
///
/// Turns a set of net balances into a list of transfers that settles them,
/// by repeatedly matching the largest remaining debtor with the largest
/// remaining creditor.
///
/// # Algorithm
///
/// 1. Members with balance below `-precision` are debtors, above `precision`
///    creditors. Everyone else is already settled and ignored.
/// 2. Both sides are sorted by magnitude, descending, ties by member id.
/// 3. Walk both lists with one cursor each. Each step moves
///    `min(debtor, creditor)` from the current debtor to the current creditor
///    and advances whichever side dropped below `precision` (possibly both).
///
/// This emits at most `debtors + creditors - 1` transfers. It is a heuristic:
/// finding the true minimum number of transfers is NP-hard and not attempted.
///
/// Balances are expected to sum to zero. If they do not, the walk still
/// terminates when one side runs out and the unmatched remainder is simply
/// left without a transfer.
///
/// # Examples
///
/// ```
/// use expense_settler::core::member::MemberId;
/// use expense_settler::settlement::simplifier::{DebtSimplifier, Transfer};
/// use rust_decimal_macros::dec;
/// use std::collections::HashMap;
///
/// let balances: HashMap<MemberId, _> = [
///     (MemberId::new("A"), dec!(-30)),
///     (MemberId::new("B"), dec!(-20)),
///     (MemberId::new("C"), dec!(50)),
/// ]
/// .into_iter()
/// .collect();
///
/// let transfers = DebtSimplifier::new().simplify(&balances);
/// assert_eq!(
///     transfers,
///     vec![
///         Transfer::new("A", "C", dec!(30)),
///         Transfer::new("B", "C", dec!(20)),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtSimplifier {
    precision: Decimal,
}

impl DebtSimplifier {
    /// A simplifier using [`PRECISION`] as its tolerance.
    pub fn new() -> Self {
        Self {
            precision: PRECISION,
        }
    }

    /// Override the settlement tolerance. A tolerance of zero matches balances
    /// exactly.
    pub fn with_precision(precision: Decimal) -> Self {
        Self {
            precision: precision.abs(),
        }
    }

    pub fn precision(&self) -> Decimal {
        self.precision
    }

    /// Compute transfers that settle `balances`.
    pub fn simplify<'a, I>(&self, balances: I) -> Vec<Transfer>
    where
        I: IntoIterator<Item = (&'a MemberId, &'a Decimal)>,
    {
        let mut debtors = Vec::new();
        let mut creditors = Vec::new();

        for (member, &balance) in balances {
            if balance < -self.precision {
                debtors.push(Position {
                    member,
                    remaining: -balance,
                });
            } else if balance > self.precision {
                creditors.push(Position {
                    member,
                    remaining: balance,
                });
            }
        }

        debtors.sort_by(by_magnitude);
        creditors.sort_by(by_magnitude);

        debug!(
            "simplifying {} debtors against {} creditors",
            debtors.len(),
            creditors.len()
        );

        let mut transfers = Vec::new();
        let mut d = 0;
        let mut c = 0;

        while d < debtors.len() && c < creditors.len() {
            let debtor = &mut debtors[d];
            let creditor = &mut creditors[c];

            let amount = debtor.remaining.min(creditor.remaining);
            if amount > self.precision {
                trace!("{} pays {} {}", debtor.member, creditor.member, amount);
                transfers.push(Transfer {
                    from: debtor.member.clone(),
                    to: creditor.member.clone(),
                    amount,
                });
            }

            debtor.remaining -= amount;
            creditor.remaining -= amount;

            // With a zero tolerance a side is done only once fully drained.
            if debtor.remaining < self.precision || debtor.remaining.is_zero() {
                d += 1;
            }
            if creditor.remaining < self.precision || creditor.remaining.is_zero() {
                c += 1;
            }
        }

        let unmatched: Decimal = debtors[d..]
            .iter()
            .chain(&creditors[c..])
            .map(|p| p.remaining)
            .sum();
        if unmatched > Decimal::ZERO {
            debug!("{} left unmatched; balances were not zero-sum", unmatched);
        }

        transfers
    }
}

impl Default for DebtSimplifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute transfers that settle `balances` with the default tolerance.
pub fn simplify<'a, I>(balances: I) -> Vec<Transfer>
where
    I: IntoIterator<Item = (&'a MemberId, &'a Decimal)>,
{
    DebtSimplifier::new().simplify(balances)
}
