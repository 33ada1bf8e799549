//! Core domain + application logic for gatebot.
//!
//! This crate is framework-agnostic. The database and Telegram live behind
//! ports (traits) implemented in adapter crates.

pub mod access;
pub mod audit;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod gate;
pub mod logging;
pub mod messaging;
pub mod ports;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
