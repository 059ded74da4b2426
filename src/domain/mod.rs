//! Core domain types and logic.

pub mod account;
pub mod analysis;
pub mod backtest;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod signal;
pub mod sweep;
