// src/repositories/memory/mod.rs
//
// DashMap-backed stores for local runs without Postgres and for tests.
// Every operation finishes inside one shard lock, so the same atomicity
// rules as the Postgres statements hold.

pub mod player;
pub mod review_resolution;

pub use player::MemoryPlayerRepository;
pub use review_resolution::MemoryResolutionRepository;
