//! Domain Metamodel Integration Test Framework
//!
//! Provides a fluent API for writing integration scenarios against the
//! metamodel builder.
//!
//! # Structure
//!
//! - **fixtures** - the standard basic-type universe and literal resolvers
//! - **scenario** - declarations applied to a builder, optionally on top of
//!   a base scenario
//! - **assertion** - checks run against the build outcome of a scenario
//!
//! # Example
//!
//! ```ignore
//! use domain_tests::prelude::*;
//!
//! pub fn scenario() -> Scenario {
//!     Scenario::new("person")
//!         .standard_universe()
//!         .declare(|b| {
//!             b.create_entity_type("Person").attribute("age", "Integer").done();
//!             Ok(())
//!         })
//!         .step("age_is_integer", |a| a.attribute("Person", "age", "Integer"))
//! }
//!
//! #[test]
//! fn test() {
//!     scenario().run().unwrap();
//! }
//! ```


pub use assertion::{Assertion, AssertionBuilder};
pub use error::{ScenarioError, ScenarioResult};
pub use fixtures::{standard_builder, standard_universe, StandardLiterals};
pub use scenario::{Scenario, Step};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{Assertion, AssertionBuilder};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::fixtures::{standard_builder, standard_universe, StandardLiterals};
    pub use crate::scenario::Scenario;
    pub use domain_core::{DomainOperator, DomainPredicate, HostTypeTag};
    pub use domain_registry::{DomainBuilder, DomainModel, TypeKind};
}
