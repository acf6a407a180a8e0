
// File: src/services/mod.rs

pub mod bounty_service;
pub mod ledger;
pub mod reward;

pub use bounty_service::BountyService;
pub use ledger::PlayerLedger;
