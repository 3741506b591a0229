//! Data definitions shared with callers.

pub mod config;
