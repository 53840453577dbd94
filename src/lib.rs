// ABOUTME: Library root for ecs-cutover - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod aws;
pub mod bluegreen;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod plan;
pub mod poll;
pub mod types;
