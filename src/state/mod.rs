//! State module for tracking fallback-chain progress
//!
//! # Components
//!
//! - `ResolutionState`: where a single carrier/region resolution is in its
//!   walk through the prioritized sources

mod resolution_state;

pub use resolution_state::ResolutionState;
