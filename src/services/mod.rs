//! Service layer: persistence verification and the scenario suites.

pub mod persistence_verifier;
pub mod scenarios;

pub use persistence_verifier::{Lookup, PersistenceVerifier};
pub use scenarios::{Scenario, ScenarioOutcome, ScenarioRunner, ScenarioStatus, Suite};
