// src/services/mod.rs

pub mod cash_flow;
pub mod market;
pub mod store;
