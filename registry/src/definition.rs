//! Unresolved type and function definitions.
//!
//! Definitions refer to other types by [`TypeRef`] and are only checked when
//! the model is built. Registering a definition whose references cannot be
//! satisfied is not an error until then.

use crate::{TypeKind, Volatility};
use domain_core::{HostTypeTag, Metadata};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;

/// Reference to a type by name or by host type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Name(String),
    Tag(HostTypeTag),
}

impl TypeRef {
    pub fn name(name: impl Into<String>) -> Self {
        TypeRef::Name(name.into())
    }

    pub fn tag(tag: impl Into<HostTypeTag>) -> Self {
        TypeRef::Tag(tag.into())
    }

    /// Reference the type registered for the Rust type `T`.
    pub fn of<T: ?Sized>() -> Self {
        TypeRef::Tag(HostTypeTag::of::<T>())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Name(name) => write!(f, "'{}'", name),
            TypeRef::Tag(tag) => write!(f, "with host tag '{}'", tag),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Name(name)
    }
}

impl From<&String> for TypeRef {
    fn from(name: &String) -> Self {
        TypeRef::Name(name.clone())
    }
}

impl From<HostTypeTag> for TypeRef {
    fn from(tag: HostTypeTag) -> Self {
        TypeRef::Tag(tag)
    }
}

impl From<&HostTypeTag> for TypeRef {
    fn from(tag: &HostTypeTag) -> Self {
        TypeRef::Tag(tag.clone())
    }
}

/// Definition of a named type.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: String,
    pub tag: Option<HostTypeTag>,
    pub metadata: Metadata,
    pub body: DefinitionBody,
}

/// Kind-specific part of a [`TypeDefinition`].
#[derive(Debug, Clone)]
pub enum DefinitionBody {
    Basic,
    Entity(EntityDefinition),
    Enum(EnumDefinition),
}

impl TypeDefinition {
    pub fn basic(name: impl Into<String>) -> Self {
        Self::with_body(name, DefinitionBody::Basic)
    }

    pub fn entity(name: impl Into<String>, entity: EntityDefinition) -> Self {
        Self::with_body(name, DefinitionBody::Entity(entity))
    }

    pub fn enumeration(name: impl Into<String>, values: EnumDefinition) -> Self {
        Self::with_body(name, DefinitionBody::Enum(values))
    }

    fn with_body(name: impl Into<String>, body: DefinitionBody) -> Self {
        Self {
            name: name.into(),
            tag: None,
            metadata: Metadata::new(),
            body,
        }
    }

    /// Set the host type tag.
    pub fn tagged(mut self, tag: impl Into<HostTypeTag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attach a metadata value.
    pub fn with_metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.metadata.insert(value);
        self
    }

    pub fn kind(&self) -> TypeKind {
        match self.body {
            DefinitionBody::Basic => TypeKind::Basic,
            DefinitionBody::Entity(_) => TypeKind::Entity,
            DefinitionBody::Enum(_) => TypeKind::Enum,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityDefinition> {
        match &self.body {
            DefinitionBody::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDefinition> {
        match &self.body {
            DefinitionBody::Enum(values) => Some(values),
            _ => None,
        }
    }
}

/// Attributes of an entity definition, keyed by declared name.
#[derive(Debug, Clone)]
pub struct EntityDefinition {
    pub case_sensitive: bool,
    pub attributes: IndexMap<String, AttributeDefinition>,
}

impl Default for EntityDefinition {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            attributes: IndexMap::new(),
        }
    }
}

impl EntityDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, replacing one with the exact same name.
    pub fn attr(mut self, attribute: AttributeDefinition) -> Self {
        self.insert(attribute);
        self
    }

    pub fn insert(&mut self, attribute: AttributeDefinition) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(name)
    }
}

/// Definition of an entity attribute.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    pub name: String,
    pub type_ref: TypeRef,
    /// The attribute holds a collection of `type_ref`.
    pub collection: bool,
    pub metadata: Metadata,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            collection: false,
            metadata: Metadata::new(),
        }
    }

    /// Attribute holding a collection of `element`.
    pub fn collection(name: impl Into<String>, element: impl Into<TypeRef>) -> Self {
        Self {
            collection: true,
            ..Self::new(name, element)
        }
    }

    pub fn with_metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.metadata.insert(value);
        self
    }
}

/// Values of an enum definition, keyed by declared name.
#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub case_sensitive: bool,
    pub values: IndexMap<String, EnumValueDefinition>,
}

impl Default for EnumDefinition {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            values: IndexMap::new(),
        }
    }
}

impl EnumDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: EnumValueDefinition) -> Self {
        self.insert(value);
        self
    }

    pub fn insert(&mut self, value: EnumValueDefinition) {
        self.values.insert(value.name.clone(), value);
    }
}

#[derive(Debug, Clone)]
pub struct EnumValueDefinition {
    pub name: String,
    pub metadata: Metadata,
}

impl EnumValueDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.metadata.insert(value);
        self
    }
}

/// Definition of a function.
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub arguments: Vec<ArgumentDefinition>,
    /// Pinned minimum argument count. Defaults to the number of arguments.
    pub min_argument_count: Option<usize>,
    /// Pinned maximum argument count. Defaults to the number of arguments.
    pub argument_count: Option<usize>,
    /// Accepts any number of arguments beyond the minimum.
    pub variadic: bool,
    pub result_type: Option<TypeRef>,
    pub result_collection: bool,
    pub volatility: Volatility,
    pub metadata: Metadata,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            min_argument_count: None,
            argument_count: None,
            variadic: false,
            result_type: None,
            result_collection: false,
            volatility: Volatility::default(),
            metadata: Metadata::new(),
        }
    }

    /// Effective minimum argument count.
    pub fn min_argument_count(&self) -> usize {
        self.min_argument_count.unwrap_or(self.arguments.len())
    }

    /// Effective maximum argument count, `None` when variadic.
    pub fn argument_count(&self) -> Option<usize> {
        if self.variadic {
            return None;
        }
        let max = self.argument_count.unwrap_or(self.arguments.len());
        Some(max.max(self.min_argument_count()))
    }

    /// Whether the declared arguments are positional. `None` until the
    /// first argument is added.
    pub fn is_positional(&self) -> Option<bool> {
        self.arguments.first().map(|arg| arg.name.is_none())
    }
}

/// Definition of a function argument.
#[derive(Debug, Clone)]
pub struct ArgumentDefinition {
    /// `None` for positional arguments.
    pub name: Option<String>,
    /// `None` accepts any type (or any collection when `collection` is set).
    pub type_ref: Option<TypeRef>,
    pub collection: bool,
    pub metadata: Metadata,
}

impl ArgumentDefinition {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_ref: None,
            collection: false,
            metadata: Metadata::new(),
        }
    }

    pub fn positional() -> Self {
        Self {
            name: None,
            type_ref: None,
            collection: false,
            metadata: Metadata::new(),
        }
    }

    pub fn of_type(mut self, type_ref: impl Into<TypeRef>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }

    /// The argument takes a collection. Without a type the argument accepts
    /// any collection.
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn with_metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.metadata.insert(value);
        self
    }

    pub fn is_positional(&self) -> bool {
        self.name.is_none()
    }
}
