//! Resolved domain types and functions.
//!
//! Everything in this module is produced once by `DomainBuilder::build` and
//! never mutated afterwards. Types refer to each other through
//! [`TypeHandle`]s into the owning model's arena, which keeps cyclic type
//! graphs (self-referencing or mutually referencing entities) representable
//! without shared mutable state.

use domain_core::{DomainOperator, DomainPredicate, HostTypeTag, Metadata, NameMap};
use std::collections::BTreeSet;
use std::fmt;

/// Name shared by every collection type.
pub const COLLECTION_TYPE_NAME: &str = "Collection";

/// Identifier of a resolved type inside a model's arena.
///
/// Handles of a base model stay valid in every model extending it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The kind of a domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Basic,
    Entity,
    Enum,
    Collection,
}

/// Kind-specific structure of a resolved type.
#[derive(Debug)]
pub enum TypeShape {
    Basic,
    Entity {
        attributes: NameMap<EntityAttribute>,
    },
    Enum {
        values: NameMap<EnumValue>,
    },
    Collection {
        element: TypeHandle,
        element_name: String,
    },
}

/// A resolved domain type.
#[derive(Debug)]
pub struct DomainType {
    handle: TypeHandle,
    name: String,
    tag: Option<HostTypeTag>,
    enabled_operators: BTreeSet<DomainOperator>,
    enabled_predicates: BTreeSet<DomainPredicate>,
    metadata: Metadata,
    shape: TypeShape,
}

impl DomainType {
    pub(crate) fn new(
        handle: TypeHandle,
        name: impl Into<String>,
        tag: Option<HostTypeTag>,
        enabled_operators: BTreeSet<DomainOperator>,
        enabled_predicates: BTreeSet<DomainPredicate>,
        metadata: Metadata,
        shape: TypeShape,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            tag,
            enabled_operators,
            enabled_predicates,
            metadata,
            shape,
        }
    }

    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host type tag this type was registered with, if any.
    pub fn tag(&self) -> Option<&HostTypeTag> {
        self.tag.as_ref()
    }

    pub fn kind(&self) -> TypeKind {
        match self.shape {
            TypeShape::Basic => TypeKind::Basic,
            TypeShape::Entity { .. } => TypeKind::Entity,
            TypeShape::Enum { .. } => TypeKind::Enum,
            TypeShape::Collection { .. } => TypeKind::Collection,
        }
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    pub fn enabled_operators(&self) -> &BTreeSet<DomainOperator> {
        &self.enabled_operators
    }

    pub fn enabled_predicates(&self) -> &BTreeSet<DomainPredicate> {
        &self.enabled_predicates
    }

    pub fn has_operator(&self, operator: DomainOperator) -> bool {
        self.enabled_operators.contains(&operator)
    }

    pub fn has_predicate(&self, predicate: DomainPredicate) -> bool {
        self.enabled_predicates.contains(&predicate)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_collection(&self) -> bool {
        self.kind() == TypeKind::Collection
    }

    /// Get an entity attribute by name. Honors the entity's case sensitivity.
    pub fn attribute(&self, name: &str) -> Option<&EntityAttribute> {
        match &self.shape {
            TypeShape::Entity { attributes } => attributes.get(name),
            _ => None,
        }
    }

    /// Get all entity attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &EntityAttribute> {
        let attributes = match &self.shape {
            TypeShape::Entity { attributes } => Some(attributes),
            _ => None,
        };
        attributes.into_iter().flat_map(|attrs| attrs.values())
    }

    /// Get an enum value by name. Honors the enum's case sensitivity.
    pub fn enum_value(&self, name: &str) -> Option<&EnumValue> {
        match &self.shape {
            TypeShape::Enum { values } => values.get(name),
            _ => None,
        }
    }

    /// Get all enum values in declaration order.
    pub fn enum_values(&self) -> impl Iterator<Item = &EnumValue> {
        let values = match &self.shape {
            TypeShape::Enum { values } => Some(values),
            _ => None,
        };
        values.into_iter().flat_map(|vals| vals.values())
    }

    /// Element type of a collection type.
    pub fn element_type(&self) -> Option<TypeHandle> {
        match &self.shape {
            TypeShape::Collection { element, .. } => Some(*element),
            _ => None,
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            TypeShape::Collection { element_name, .. } => {
                write!(f, "{}[{}]", self.name, element_name)
            }
            _ => f.write_str(&self.name),
        }
    }
}

/// A resolved attribute of an entity type.
#[derive(Debug)]
pub struct EntityAttribute {
    name: String,
    ty: TypeHandle,
    type_name: String,
    element_type_name: Option<String>,
    metadata: Metadata,
}

impl EntityAttribute {
    pub(crate) fn new(
        name: impl Into<String>,
        ty: TypeHandle,
        type_name: impl Into<String>,
        element_type_name: Option<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            type_name: type_name.into(),
            element_type_name,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle of the attribute's type in the owning model.
    pub fn ty(&self) -> TypeHandle {
        self.ty
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// For collection attributes, the name of the element type.
    pub fn element_type_name(&self) -> Option<&str> {
        self.element_type_name.as_deref()
    }

    pub fn is_collection(&self) -> bool {
        self.element_type_name.is_some()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// A resolved value of an enum type.
#[derive(Debug)]
pub struct EnumValue {
    name: String,
    metadata: Metadata,
}

impl EnumValue {
    pub(crate) fn new(name: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Evaluation-repeatability classification of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Volatility {
    /// Same arguments always produce the same result.
    Immutable,
    /// Same arguments produce the same result within one evaluation.
    Stable,
    /// Result may change between any two invocations.
    #[default]
    Volatile,
}

impl fmt::Display for Volatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Volatility::Immutable => "IMMUTABLE",
            Volatility::Stable => "STABLE",
            Volatility::Volatile => "VOLATILE",
        };
        f.write_str(name)
    }
}

/// A resolved function argument.
#[derive(Debug)]
pub struct FunctionArgument {
    name: Option<String>,
    index: usize,
    ty: Option<TypeHandle>,
    type_name: Option<String>,
    collection: bool,
    metadata: Metadata,
}

impl FunctionArgument {
    pub(crate) fn new(
        name: Option<String>,
        index: usize,
        ty: Option<TypeHandle>,
        type_name: Option<String>,
        collection: bool,
        metadata: Metadata,
    ) -> Self {
        Self {
            name,
            index,
            ty,
            type_name,
            collection,
            metadata,
        }
    }

    /// Argument name, `None` for positional arguments.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Declared type. `None` means the argument accepts any type, or any
    /// collection when [`FunctionArgument::is_collection`] is set.
    pub fn ty(&self) -> Option<TypeHandle> {
        self.ty
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn is_collection(&self) -> bool {
        self.collection
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl fmt::Display for FunctionArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "argument{}", self.index + 1),
        }
    }
}

/// A resolved domain function.
#[derive(Debug)]
pub struct DomainFunction {
    name: String,
    arguments: Vec<FunctionArgument>,
    min_argument_count: usize,
    argument_count: Option<usize>,
    result_type: Option<TypeHandle>,
    result_type_name: Option<String>,
    result_collection: bool,
    volatility: Volatility,
    metadata: Metadata,
}

impl DomainFunction {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: impl Into<String>,
        arguments: Vec<FunctionArgument>,
        min_argument_count: usize,
        argument_count: Option<usize>,
        result_type: Option<TypeHandle>,
        result_type_name: Option<String>,
        result_collection: bool,
        volatility: Volatility,
        metadata: Metadata,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
            min_argument_count,
            argument_count,
            result_type,
            result_type_name,
            result_collection,
            volatility,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[FunctionArgument] {
        &self.arguments
    }

    /// Get a named argument.
    pub fn argument(&self, name: &str) -> Option<&FunctionArgument> {
        self.arguments
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
    }

    pub fn min_argument_count(&self) -> usize {
        self.min_argument_count
    }

    /// Maximum number of arguments, `None` when the function is variadic.
    pub fn argument_count(&self) -> Option<usize> {
        self.argument_count
    }

    pub fn is_variadic(&self) -> bool {
        self.argument_count.is_none()
    }

    /// Check whether `count` arguments are acceptable.
    pub fn accepts_argument_count(&self, count: usize) -> bool {
        count >= self.min_argument_count && self.argument_count.map_or(true, |max| count <= max)
    }

    /// Declared result type, `None` for untyped functions.
    pub fn result_type(&self) -> Option<TypeHandle> {
        self.result_type
    }

    pub fn result_type_name(&self) -> Option<&str> {
        self.result_type_name.as_deref()
    }

    pub fn is_result_collection(&self) -> bool {
        self.result_collection
    }

    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl fmt::Display for DomainFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = if self.arguments.is_empty() {
            (1..=self.min_argument_count)
                .map(|i| format!("argument{}", i))
                .collect()
        } else {
            self.arguments.iter().map(|arg| arg.to_string()).collect()
        };
        if self.is_variadic() {
            parts.push("...".to_string());
        }
        write!(f, "{}({})", self.name, parts.join(", "))
    }
}
