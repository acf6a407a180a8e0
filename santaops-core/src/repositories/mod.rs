// src/repositories/mod.rs

pub mod memory;
pub mod postgres;

pub use santaops_common::traits::repository_traits::{PlayerRepository, ResolutionRepository};

pub use memory::{MemoryPlayerRepository, MemoryResolutionRepository};
pub use postgres::{PostgresPlayerRepository, PostgresResolutionRepository};
