//! Integration tests for Outage Watch
//!
//! Engine tests drive the fallback chain with in-process adapters; adapter
//! tests use wiremock to stand in for carrier status endpoints.

mod engine_tests;
