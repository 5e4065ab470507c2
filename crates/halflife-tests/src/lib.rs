//! Scenario tests for the halflife simulator.
//!
//! Integration tests under `tests/` drive the engine through the public
//! command surface only, with seeded randomness, and check the statistical
//! and bookkeeping invariants of a whole run.

pub mod helpers;
