//! Test infrastructure for the data block parser
//!
//! Provides fixture loading, stochastic test generation, and assertion helpers.

mod generators;
mod harness;
mod loader;

pub use generators::Gen;
pub use harness::{run_test, run_with_variations};
pub use loader::{load_fixtures_by_name, ExpectedError, TestCase};
