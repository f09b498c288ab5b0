//! Domain Registry
//!
//! Builds and serves immutable, type checked domain models. A model is
//! assembled from type and function definitions with `DomainBuilder`, may
//! extend another model, and exposes resolved types, functions and the
//! type resolvers that let an expression engine type check operators,
//! predicates, function calls and literals.

mod builder;
mod context;
mod definition;
mod error;
mod literal;
mod model;
mod reconcile;
mod resolver;
mod resolvers;
mod serializer;
mod types;

pub use builder::{BasicTypeBuilder, DomainBuilder, EntityTypeBuilder, EnumTypeBuilder, FunctionBuilder};
pub use definition::*;
pub use error::*;
pub use literal::*;
pub use model::DomainModel;
pub use resolver::{
    Capability, FunctionTypeResolver, OperationTypeResolver, PredicateTypeResolver, ResolverTable,
};
pub use resolvers::*;
pub use serializer::*;
pub use types::*;
