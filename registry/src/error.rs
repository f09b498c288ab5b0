//! Error types for declaring, building and using a domain model.

use crate::TypeRef;
use domain_core::HostTypeTag;
use std::fmt;
use thiserror::Error;

/// Errors raised immediately while declaring definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("Can't mix positional and named parameters in function '{function}'")]
    MixedArguments { function: String },

    #[error("Unknown entity type to extend: {0}")]
    UnknownEntityType(String),
}

/// A single problem detected while building a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("The type name '{name}' is reserved for collection types")]
    ReservedTypeName { name: String },

    #[error("The type {type_ref} defined for the attribute '{attribute}' of entity '{entity}' is unknown")]
    UnknownAttributeType {
        entity: String,
        attribute: String,
        type_ref: TypeRef,
    },

    #[error("The type {type_ref} defined for the argument '{argument}' of function '{function}' is unknown")]
    UnknownArgumentType {
        function: String,
        argument: String,
        type_ref: TypeRef,
    },

    #[error("The result type {type_ref} defined for the function '{function}' is unknown")]
    UnknownResultType { function: String, type_ref: TypeRef },

    #[error("Duplicate attribute definition due to case insensitivity in entity '{entity}': [{first}, {second}]")]
    DuplicateAttribute {
        entity: String,
        first: String,
        second: String,
    },

    #[error("Duplicate enum value definition due to case insensitivity in enum '{enum_type}': [{first}, {second}]")]
    DuplicateEnumValue {
        enum_type: String,
        first: String,
        second: String,
    },

    #[error("Duplicate function definition due to case insensitivity: [{first}, {second}]")]
    DuplicateFunction { first: String, second: String },

    #[error("The host type '{tag}' is claimed by multiple types: [{first}, {second}]")]
    AmbiguousHostTag {
        tag: HostTypeTag,
        first: String,
        second: String,
    },

    #[error("A function type resolver was registered but no function with the name '{function}' was found: {resolver}")]
    UnknownFunctionResolverTarget { function: String, resolver: String },

    #[error("A {kind} type resolver was registered but no type {target} was found: {resolver}")]
    UnknownResolverTarget {
        kind: &'static str,
        target: TypeRef,
        resolver: String,
    },

    #[error("A {kind} type resolver was registered for a non enabled {capability_kind} '{capability}' on the type '{type_name}': {resolver}")]
    DisabledCapability {
        kind: &'static str,
        capability_kind: &'static str,
        capability: String,
        type_name: String,
        resolver: String,
    },
}

/// Aggregated failure of a model build, listing every detected problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBuildFailure {
    errors: Vec<BuildError>,
}

impl ModelBuildFailure {
    pub fn new(errors: Vec<BuildError>) -> Self {
        Self { errors }
    }

    /// The individual problems, in detection order.
    pub fn errors(&self) -> &[BuildError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<BuildError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ModelBuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Couldn't build the domain model because of {} error(s):",
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ModelBuildFailure {}

/// Errors raised by type, function and literal resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeResolveError {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Expected at least {expected} operand(s) but got {actual}")]
    MissingOperand { expected: usize, actual: usize },

    #[error("Unsupported operand type '{actual}' at position {index}, expected one of {expected:?}")]
    UnsupportedOperand {
        index: usize,
        actual: String,
        expected: Vec<String>,
    },

    #[error("Function '{function}' accepts {expected} argument(s) but got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("The argument '{argument}' of function '{function}' expects type '{expected}' but got '{actual}'")]
    ArgumentTypeMismatch {
        function: String,
        argument: String,
        expected: String,
        actual: String,
    },

    #[error("No common type for {0:?}")]
    NoCommonType(Vec<String>),

    #[error("Invalid literal '{literal}': {reason}")]
    InvalidLiteral { literal: String, reason: String },
}

/// Errors raised while serializing a model.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Serializer for format '{format}' produced a value of a different target type")]
    TargetMismatch { format: String },

    #[error("Invalid serializer property '{name}': {reason}")]
    InvalidProperty { name: String, reason: String },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
