//! Domain Metamodel Core Types
//!
//! This crate provides the vocabulary shared by every layer of the metamodel:
//! - Host type tags (opaque identifiers for host-language types)
//! - Operators and predicates that can be enabled per domain type
//! - Opaque metadata maps attached to definitions and resolved types
//! - Name maps with exact or folded-case key normalization
//! - Temporal interval values used by temporal literals

mod error;
mod metadata;
mod names;
mod operator;
mod tag;
mod temporal;

pub use error::*;
pub use metadata::*;
pub use names::*;
pub use operator::*;
pub use tag::*;
pub use temporal::*;
