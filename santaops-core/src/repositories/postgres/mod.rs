// src/repositories/postgres/mod.rs

pub mod player;
pub mod review_resolution;

pub use player::PostgresPlayerRepository;
pub use review_resolution::PostgresResolutionRepository;
