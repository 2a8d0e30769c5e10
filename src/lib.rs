//! # expense-settler
//!
//! Shared-expense ledger and debt simplification engine.
//!
//! Members of a group record expenses and direct payments; the engine folds
//! that history into net balances and computes a short list of transfers
//! that settles everyone up.
//!
//! ## Architecture
//!
//! - **core** — Members, events, split rules, balance sheets, groups, and
//!   migration of stored records
//! - **settlement** — Greedy debt simplification and settlement plans
//! - **simulation** — Random expense histories for testing and benchmarking

pub mod core;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::balance::{BalanceSheet, Standing};
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::event::{EventKind, EventLog, GroupEvent, Share};
    pub use crate::core::group::Group;
    pub use crate::core::member::MemberId;
    pub use crate::core::split::SplitRule;
    pub use crate::settlement::plan::SettlementPlan;
    pub use crate::settlement::simplifier::{simplify, DebtSimplifier, Transfer, PRECISION};
}
