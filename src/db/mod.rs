// src/db/mod.rs

pub mod models;
pub mod store;

pub use models::{NewTrade, TradeRecord};
pub use store::Database;
