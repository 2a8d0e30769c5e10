use crate::core::event::{EventError, Share};
use crate::core::member::MemberId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a shared cost is divided between participants.
///
/// Every rule allocates shares that sum to exactly the expense amount.
/// When the amount does not divide evenly into minor units, the leftover
/// units go one each to participants in ascending id order.
///
/// # Examples
///
/// ```
/// use expense_settler::core::member::MemberId;
/// use expense_settler::core::split::SplitRule;
/// use rust_decimal_macros::dec;
///
/// let rule = SplitRule::Equal(vec![
///     MemberId::new("alice"),
///     MemberId::new("bob"),
///     MemberId::new("carol"),
/// ]);
/// let shares = rule.allocate(dec!(100), dec!(0.01)).unwrap();
///
/// assert_eq!(shares[0].amount, dec!(33.34));
/// assert_eq!(shares[1].amount, dec!(33.33));
/// assert_eq!(shares[2].amount, dec!(33.33));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "with", rename_all = "snake_case")]
pub enum SplitRule {
    Equal(Vec<MemberId>),
    Exact(Vec<Share>),
    Weighted(Vec<(MemberId, u32)>),
}

impl SplitRule {
    /// Allocate `amount` across participants, rounding to `minor_unit`.
    pub fn allocate(&self, amount: Decimal, minor_unit: Decimal) -> Result<Vec<Share>, EventError> {
        if amount <= Decimal::ZERO {
            return Err(EventError::NonPositiveAmount(amount));
        }
        if minor_unit <= Decimal::ZERO {
            return Err(EventError::NonPositiveMinorUnit(minor_unit));
        }
        match self {
            SplitRule::Equal(members) => {
                let weighted: Vec<(MemberId, u32)> =
                    members.iter().map(|m| (m.clone(), 1)).collect();
                allocate_weighted(&weighted, amount, minor_unit)
            }
            SplitRule::Weighted(weights) => allocate_weighted(weights, amount, minor_unit),
            SplitRule::Exact(shares) => {
                check_participants(shares.iter().map(|s| &s.member))?;
                if let Some(share) = shares.iter().find(|s| s.amount < Decimal::ZERO) {
                    return Err(EventError::NegativeShare {
                        member: share.member.clone(),
                        amount: share.amount,
                    });
                }
                let allocated: Decimal = shares.iter().map(|s| s.amount).sum();
                if allocated != amount {
                    return Err(EventError::SplitMismatch { amount, allocated });
                }
                Ok(shares.clone())
            }
        }
    }

    /// Members taking part in this split.
    pub fn participants(&self) -> Vec<&MemberId> {
        match self {
            SplitRule::Equal(members) => members.iter().collect(),
            SplitRule::Exact(shares) => shares.iter().map(|s| &s.member).collect(),
            SplitRule::Weighted(weights) => weights.iter().map(|(m, _)| m).collect(),
        }
    }
}

fn check_participants<'a>(members: impl Iterator<Item = &'a MemberId>) -> Result<(), EventError> {
    let mut seen = HashSet::new();
    let mut any = false;
    for member in members {
        any = true;
        if !seen.insert(member) {
            return Err(EventError::DuplicateParticipant(member.clone()));
        }
    }
    if !any {
        return Err(EventError::NoParticipants);
    }
    Ok(())
}

fn allocate_weighted(
    weights: &[(MemberId, u32)],
    amount: Decimal,
    minor_unit: Decimal,
) -> Result<Vec<Share>, EventError> {
    check_participants(weights.iter().map(|(m, _)| m))?;
    if let Some((member, weight)) = weights.iter().find(|(_, w)| *w == 0) {
        return Err(EventError::NonPositiveWeight {
            member: member.clone(),
            weight: *weight,
        });
    }

    let total_weight: Decimal = weights.iter().map(|(_, w)| Decimal::from(*w)).sum();
    let scale = minor_unit.scale();

    let mut shares: Vec<Share> = weights
        .iter()
        .map(|(member, weight)| {
            let exact = amount * Decimal::from(*weight) / total_weight;
            Share {
                member: member.clone(),
                amount: exact.round_dp_with_strategy(scale, RoundingStrategy::ToZero),
            }
        })
        .collect();

    // Rounding toward zero leaves a non-negative remainder of whole minor units.
    let allocated: Decimal = shares.iter().map(|s| s.amount).sum();
    let mut leftover = amount - allocated;

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| shares[a].member.cmp(&shares[b].member));
    for idx in order.into_iter().cycle() {
        if leftover < minor_unit {
            break;
        }
        shares[idx].amount += minor_unit;
        leftover -= minor_unit;
    }

    // Any sub-minor-unit dust (an amount finer than the currency allows)
    // lands on the first participant so the total stays exact.
    if leftover > Decimal::ZERO {
        shares[0].amount += leftover;
    }

    Ok(shares)
}
