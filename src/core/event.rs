use crate::core::member::MemberId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while constructing group events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("share for {member} must not be negative, got {amount}")]
    NegativeShare { member: MemberId, amount: Decimal },
    #[error("shares sum to {allocated} but the expense amount is {amount}")]
    SplitMismatch { amount: Decimal, allocated: Decimal },
    #[error("a split needs at least one participant")]
    NoParticipants,
    #[error("{0} appears more than once in the split")]
    DuplicateParticipant(MemberId),
    #[error("weight for {member} must be positive, got {weight}")]
    NonPositiveWeight { member: MemberId, weight: u32 },
    #[error("minor unit must be positive, got {0}")]
    NonPositiveMinorUnit(Decimal),
    #[error("{0} cannot settle with themselves")]
    SelfSettlement(MemberId),
}

/// One member's portion of a shared expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub member: MemberId,
    pub amount: Decimal,
}

impl Share {
    pub fn new(member: impl Into<MemberId>, amount: Decimal) -> Self {
        Self {
            member: member.into(),
            amount,
        }
    }
}

/// What happened in a group event.
///
/// Both variants name the paying member explicitly, so a balance fold never
/// has to infer direction from the record's age or layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// `payer` covered a shared cost of `amount`, owed back by `shares`.
    Expense {
        payer: MemberId,
        amount: Decimal,
        shares: Vec<Share>,
    },
    /// `from` paid `to` directly, reducing what `from` owes.
    Settlement {
        from: MemberId,
        to: MemberId,
        amount: Decimal,
    },
}

impl EventKind {
    /// Signed balance changes this event causes, in payer-first order.
    ///
    /// Positive means the member is owed more afterwards.
    pub fn deltas(&self) -> Vec<(&MemberId, Decimal)> {
        match self {
            EventKind::Expense {
                payer,
                amount,
                shares,
            } => {
                let mut deltas = Vec::with_capacity(shares.len() + 1);
                deltas.push((payer, *amount));
                deltas.extend(shares.iter().map(|s| (&s.member, -s.amount)));
                deltas
            }
            EventKind::Settlement { from, to, amount } => vec![(from, *amount), (to, -*amount)],
        }
    }

    /// Total amount moved by this event.
    pub fn amount(&self) -> Decimal {
        match self {
            EventKind::Expense { amount, .. } | EventKind::Settlement { amount, .. } => *amount,
        }
    }

    /// Every member this event touches.
    pub fn members(&self) -> Vec<&MemberId> {
        self.deltas().into_iter().map(|(m, _)| m).collect()
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self, EventKind::Settlement { .. })
    }
}

/// A single entry in a group's event log.
///
/// Events are immutable once created. Constructors validate that amounts
/// are positive and that an expense's shares add up to exactly what was paid,
/// which keeps every balance fold zero-sum.
///
/// # Examples
///
/// ```
/// use expense_settler::core::event::{GroupEvent, Share};
/// use expense_settler::core::member::MemberId;
/// use rust_decimal_macros::dec;
///
/// let dinner = GroupEvent::expense(
///     MemberId::new("alice"),
///     dec!(60),
///     vec![
///         Share::new("alice", dec!(20)),
///         Share::new("bob", dec!(20)),
///         Share::new("carol", dec!(20)),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(dinner.kind().amount(), dec!(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEvent {
    id: Uuid,
    occurred_at: DateTime<Utc>,
    description: Option<String>,
    #[serde(flatten)]
    kind: EventKind,
}

impl GroupEvent {
    /// Record a shared expense.
    pub fn expense(
        payer: MemberId,
        amount: Decimal,
        shares: Vec<Share>,
    ) -> Result<Self, EventError> {
        if amount <= Decimal::ZERO {
            return Err(EventError::NonPositiveAmount(amount));
        }
        if shares.is_empty() {
            return Err(EventError::NoParticipants);
        }
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
        Ok(Self::from_kind(EventKind::Expense {
            payer,
            amount,
            shares,
        }))
    }

    /// Record a direct payment from one member to another.
    pub fn settlement(from: MemberId, to: MemberId, amount: Decimal) -> Result<Self, EventError> {
        if amount <= Decimal::ZERO {
            return Err(EventError::NonPositiveAmount(amount));
        }
        if from == to {
            return Err(EventError::SelfSettlement(from));
        }
        Ok(Self::from_kind(EventKind::Settlement { from, to, amount }))
    }

    fn from_kind(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            description: None,
            kind,
        }
    }

    /// Replace the generated id (useful for migrated records and tests).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = at;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }
}

/// Ordered history of a group's events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<GroupEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GroupEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GroupEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Stable sort by `occurred_at`; events at the same instant keep their order.
    pub fn sort_chronologically(&mut self) {
        self.events.sort_by_key(|e| e.occurred_at());
    }

    /// Sum of all shared expenses, settlements excluded.
    pub fn total_spent(&self) -> Decimal {
        self.events
            .iter()
            .filter(|e| !e.kind().is_settlement())
            .map(|e| e.kind().amount())
            .sum()
    }

    /// All members referenced by any event, sorted.
    pub fn members(&self) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = self
            .events
            .iter()
            .flat_map(|e| e.kind().members().into_iter().cloned())
            .collect();
        members.sort();
        members.dedup();
        members
    }
}

impl FromIterator<GroupEvent> for EventLog {
    fn from_iter<T: IntoIterator<Item = GroupEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl Extend<GroupEvent> for EventLog {
    fn extend<T: IntoIterator<Item = GroupEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
