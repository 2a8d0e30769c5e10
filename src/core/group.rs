use crate::core::balance::BalanceSheet;
use crate::core::currency::CurrencyCode;
use crate::core::event::{EventError, EventLog, GroupEvent};
use crate::core::member::MemberId;
use crate::core::split::SplitRule;
use crate::settlement::plan::SettlementPlan;
use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when recording into a group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("{0} is not a member of this group")]
    UnknownMember(MemberId),
    #[error(transparent)]
    Event(#[from] EventError),
}

/// A group of members sharing costs in one currency.
///
/// Holds the roster and the event log. Balances and settlement plans are
/// always derived from the log on demand.
///
/// # Examples
///
/// ```
/// use expense_settler::core::group::Group;
/// use expense_settler::core::member::MemberId;
/// use expense_settler::core::split::SplitRule;
/// use rust_decimal_macros::dec;
///
/// let alice = MemberId::new("alice");
/// let bob = MemberId::new("bob");
///
/// let mut trip = Group::new("Lisbon", "EUR".into());
/// trip.add_member(alice.clone());
/// trip.add_member(bob.clone());
///
/// trip.record_expense(
///     alice.clone(),
///     dec!(80),
///     &SplitRule::Equal(vec![alice.clone(), bob.clone()]),
/// )
/// .unwrap();
///
/// let plan = trip.settlement_plan();
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan.transfers()[0].from, bob);
/// assert_eq!(plan.transfers()[0].amount, dec!(40));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    id: Uuid,
    name: String,
    currency: CurrencyCode,
    members: BTreeSet<MemberId>,
    events: EventLog,
}

impl Group {
    pub fn new(name: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            currency,
            members: BTreeSet::new(),
            events: EventLog::new(),
        }
    }

    /// Rebuild a group around an existing (already migrated) event log.
    ///
    /// Every member referenced by the log joins the roster.
    pub fn from_log(name: impl Into<String>, currency: CurrencyCode, events: EventLog) -> Self {
        let members = events.members().into_iter().collect();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            currency,
            members,
            events,
        }
    }

    /// Add a member. Returns false if they were already present.
    pub fn add_member(&mut self, member: MemberId) -> bool {
        self.members.insert(member)
    }

    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    /// Split `amount` paid by `payer` according to `rule` and record it.
    pub fn record_expense(
        &mut self,
        payer: MemberId,
        amount: Decimal,
        rule: &SplitRule,
    ) -> Result<&GroupEvent, GroupError> {
        let shares = rule.allocate(amount, self.currency.minor_unit())?;
        let event = GroupEvent::expense(payer, amount, shares)?;
        self.record(event)
    }

    /// Record a direct payment between two members.
    pub fn record_settlement(
        &mut self,
        from: MemberId,
        to: MemberId,
        amount: Decimal,
    ) -> Result<&GroupEvent, GroupError> {
        let event = GroupEvent::settlement(from, to, amount)?;
        self.record(event)
    }

    /// Append an event after checking every member it touches belongs here.
    pub fn record(&mut self, event: GroupEvent) -> Result<&GroupEvent, GroupError> {
        if let Some(stranger) = event
            .kind()
            .members()
            .into_iter()
            .find(|m| !self.members.contains(*m))
        {
            return Err(GroupError::UnknownMember(stranger.clone()));
        }
        self.events.push(event);
        let recorded = &self.events.events()[self.events.len() - 1];
        Ok(recorded)
    }

    /// Current balances, including members with nothing recorded yet.
    pub fn balances(&self) -> BalanceSheet {
        let mut sheet = BalanceSheet::with_members(&self.members);
        for event in self.events.events() {
            sheet.apply_event(event);
        }
        sheet
    }

    pub fn settlement_plan(&self) -> SettlementPlan {
        SettlementPlan::from_balances(self.balances())
    }

    /// Record every transfer of the current plan as a settlement at `at`.
    ///
    /// Returns the number of settlements recorded.
    pub fn settle_all(&mut self, at: DateTime<Utc>) -> Result<usize, GroupError> {
        let settlements = self.settlement_plan().to_settlement_events(at)?;
        let count = settlements.len();
        for event in settlements {
            self.record(event)?;
        }
        info!("group '{}' settled with {} transfers", self.name, count);
        Ok(count)
    }

    /// A group can be archived once nothing is left to transfer.
    pub fn is_archivable(&self) -> bool {
        self.settlement_plan().is_archivable()
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn members(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
