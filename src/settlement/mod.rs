pub mod plan;
pub mod simplifier;
