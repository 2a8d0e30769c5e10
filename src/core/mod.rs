pub mod balance;
pub mod currency;
pub mod event;
pub mod group;
pub mod member;
pub mod migration;
pub mod split;
