//! Crate-level test suites.
//!
//! - `helpers`: template and state factories shared by the suites
//! - `integration`: end-to-end flows across ledgers, tables and commits
//! - `properties`: seeded randomized invariant checks

mod helpers;
