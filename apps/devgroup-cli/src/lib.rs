//! devgroup CLI library
//!
//! The binary in `main.rs` is a thin wrapper; everything it runs lives here so
//! integration tests can drive it with a scripted console and a mock Graph.

pub mod assign;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod output;
