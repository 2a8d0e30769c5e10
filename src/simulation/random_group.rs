//! Random expense histories for benchmarks, property tests and the CLI.
//!
//! Each generated expense has a random payer and is split equally over a
//! random non-empty subset of the group.

use crate::core::event::{EventError, EventLog, GroupEvent};
use crate::core::member::MemberId;
use crate::core::split::SplitRule;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Configuration for generating a random expense history.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Number of members in the group.
    pub member_count: usize,
    /// Number of expenses to generate.
    pub expense_count: usize,
    /// Minimum expense amount, in cents.
    pub min_cents: i64,
    /// Maximum expense amount, in cents.
    pub max_cents: i64,
    /// Seed for reproducible output; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            member_count: 6,
            expense_count: 20,
            min_cents: 100,
            max_cents: 50_000,
            seed: None,
        }
    }
}

/// Member ids used by generated histories: `member-000`, `member-001`, ...
pub fn member_ids(count: usize) -> Vec<MemberId> {
    (0..count)
        .map(|i| MemberId::new(format!("member-{:03}", i)))
        .collect()
}

/// Generate a random expense history.
pub fn generate_random_group(config: &GroupConfig) -> Result<EventLog, EventError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let members = member_ids(config.member_count);
    let mut log = EventLog::new();
    if members.is_empty() {
        return Ok(log);
    }

    let min = config.min_cents.max(1);
    let max = config.max_cents.max(min);

    for _ in 0..config.expense_count {
        let payer = members[rng.gen_range(0..members.len())].clone();
        let amount = Decimal::new(rng.gen_range(min..=max), 2);

        let take = rng.gen_range(1..=members.len());
        let participants: Vec<MemberId> = members
            .choose_multiple(&mut rng, take)
            .cloned()
            .collect();

        let shares = SplitRule::Equal(participants).allocate(amount, Decimal::new(1, 2))?;
        log.push(GroupEvent::expense(payer, amount, shares)?);
    }

    Ok(log)
}
