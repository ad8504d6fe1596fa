// ABOUTME: Library root for deployline - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod apply;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod output;
pub mod pipeline;
pub mod poll;
pub mod tools;
pub mod types;
pub mod verify;
