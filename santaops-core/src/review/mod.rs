// src/review/mod.rs

pub mod guard;
pub mod token;

pub use guard::{Activation, OneShotGuard};
