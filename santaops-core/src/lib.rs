// src/lib.rs

pub mod db;
pub mod catalog;
pub mod repositories;
pub mod review;
pub mod services;
pub mod platforms;
pub mod http;
pub mod test_utils;

pub use db::Database;
pub use santaops_common::error::Error;
pub use santaops_common::models;
