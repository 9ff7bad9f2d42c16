//! Shared types for the xBase reader.
//!
//! This crate provides the error type, reader configuration and decoded
//! value model used by the memo and table crates.

pub mod config;
pub mod error;
pub mod value;

pub use config::ReaderConfig;
pub use error::{Result, XbaseError};
pub use value::{Record, Value};
