//! Integration tests for diam-kit.
//!
//! These tests run against an in-process mock of Horizon and friendbot
//! bound to a random local port; no external network is needed.
//!
//! Run with: `cargo test -p diam-kit --test integration`

mod common;

mod account_integration;
mod paths_integration;
mod stream_integration;
mod submission_integration;
