//! The DomainModel - immutable, type checked domain lookup.

use crate::resolvers::validate_argument_types;
use crate::resolver::ResolverTable;
use crate::{
    DomainFunction, DomainSerializer, DomainType, FunctionTypeResolver, LiteralResolvers,
    OperationTypeResolver, PredicateTypeResolver, ResolvedLiteral, SerializeError,
    SerializerProperties, TypeHandle, TypeKind, TypeRef, TypeResolveError, TypeShape,
};
use chrono::{DateTime, Utc};
use domain_core::{DomainOperator, DomainPredicate, HostTypeTag, NameMap, TemporalInterval};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// The DomainModel provides lookup of resolved types, functions and
/// resolvers. It is immutable after construction and can be shared across
/// threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct DomainModel {
    /// Every type, indexed by [`TypeHandle`]. Starts with the base model's
    /// arena when extending.
    pub(crate) arena: Vec<Arc<DomainType>>,
    /// Named types (everything except collections), in registration order.
    pub(crate) types_by_name: IndexMap<String, TypeHandle>,
    pub(crate) types_by_tag: HashMap<HostTypeTag, TypeHandle>,
    /// Element type to its collection type.
    pub(crate) collection_types: HashMap<TypeHandle, TypeHandle>,

    pub(crate) functions: NameMap<Arc<DomainFunction>>,
    pub(crate) function_type_resolvers: NameMap<Arc<dyn FunctionTypeResolver>>,
    pub(crate) operation_type_resolvers: ResolverTable<DomainOperator>,
    pub(crate) predicate_type_resolvers: ResolverTable<DomainPredicate>,

    pub(crate) literal_resolvers: LiteralResolvers,
    pub(crate) serializers: Vec<Arc<dyn DomainSerializer>>,
}

impl DomainModel {
    // ==================== Type Lookups ====================

    /// Get a named type.
    pub fn get_type(&self, name: &str) -> Option<&Arc<DomainType>> {
        self.type_handle(name).and_then(|handle| self.type_at(handle))
    }

    /// Get the type registered for a host type tag.
    pub fn get_type_by_tag(&self, tag: &HostTypeTag) -> Option<&Arc<DomainType>> {
        self.types_by_tag
            .get(tag)
            .and_then(|handle| self.type_at(*handle))
    }

    /// Get the type registered for the Rust type `T`.
    pub fn get_type_of<T: ?Sized>(&self) -> Option<&Arc<DomainType>> {
        self.get_type_by_tag(&HostTypeTag::of::<T>())
    }

    pub fn resolve_type_ref(&self, type_ref: &TypeRef) -> Option<&Arc<DomainType>> {
        match type_ref {
            TypeRef::Name(name) => self.get_type(name),
            TypeRef::Tag(tag) => self.get_type_by_tag(tag),
        }
    }

    /// Get a named entity type.
    pub fn get_entity_type(&self, name: &str) -> Option<&Arc<DomainType>> {
        self.get_type(name)
            .filter(|ty| ty.kind() == TypeKind::Entity)
    }

    /// Get a named enum type.
    pub fn get_enum_type(&self, name: &str) -> Option<&Arc<DomainType>> {
        self.get_type(name).filter(|ty| ty.kind() == TypeKind::Enum)
    }

    /// Get a type by handle.
    pub fn type_at(&self, handle: TypeHandle) -> Option<&Arc<DomainType>> {
        self.arena.get(handle.index())
    }

    pub(crate) fn type_handle(&self, name: &str) -> Option<TypeHandle> {
        self.types_by_name.get(name).copied()
    }

    pub(crate) fn collection_handle(&self, element: TypeHandle) -> Option<TypeHandle> {
        self.collection_types.get(&element).copied()
    }

    /// Get the collection type whose elements are of type `element`.
    pub fn get_collection_type(&self, element: &DomainType) -> Option<&Arc<DomainType>> {
        self.collection_handle(element.handle())
            .and_then(|handle| self.type_at(handle))
    }

    /// Name of a type, or of its element type for collections.
    pub(crate) fn element_or_self_name(&self, handle: TypeHandle) -> Option<String> {
        let ty = self.type_at(handle)?;
        match ty.shape() {
            TypeShape::Collection { element_name, .. } => Some(element_name.clone()),
            _ => Some(ty.name().to_string()),
        }
    }

    /// All named types, in registration order (base types first).
    pub fn types(&self) -> impl Iterator<Item = &Arc<DomainType>> {
        self.types_by_name
            .values()
            .filter_map(|handle| self.type_at(*handle))
    }

    /// All collection types.
    pub fn collection_types(&self) -> impl Iterator<Item = &Arc<DomainType>> {
        self.collection_types
            .values()
            .filter_map(|handle| self.type_at(*handle))
    }

    // ==================== Function Lookups ====================

    /// Get a function, honoring the function case sensitivity.
    pub fn get_function(&self, name: &str) -> Option<&Arc<DomainFunction>> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Arc<DomainFunction>> {
        self.functions.values()
    }

    pub fn is_function_case_sensitive(&self) -> bool {
        self.functions.mode().is_sensitive()
    }

    pub fn get_function_type_resolver(&self, name: &str) -> Option<&Arc<dyn FunctionTypeResolver>> {
        self.function_type_resolvers.get(name)
    }

    /// Compute the result type of a function invocation.
    ///
    /// Uses the function's type resolver when one is registered, otherwise
    /// checks the argument types against the declared arguments and returns
    /// the declared result type. `Ok(None)` means the function is untyped.
    pub fn resolve_function_type(
        &self,
        name: &str,
        argument_types: &[Arc<DomainType>],
    ) -> Result<Option<Arc<DomainType>>, TypeResolveError> {
        let function = self
            .get_function(name)
            .ok_or_else(|| TypeResolveError::UnknownFunction(name.to_string()))?;
        if let Some(resolver) = self.get_function_type_resolver(name) {
            return resolver
                .resolve_type(self, function, argument_types)
                .map(Some);
        }
        validate_argument_types(function, argument_types)?;
        Ok(function
            .result_type()
            .and_then(|handle| self.type_at(handle))
            .cloned())
    }

    // ==================== Resolver Lookups ====================

    pub fn get_operation_type_resolver(
        &self,
        type_name: &str,
        operator: DomainOperator,
    ) -> Option<&Arc<dyn OperationTypeResolver>> {
        self.operation_type_resolvers.get(type_name, operator)
    }

    pub fn get_operation_type_resolver_by_tag(
        &self,
        tag: &HostTypeTag,
        operator: DomainOperator,
    ) -> Option<&Arc<dyn OperationTypeResolver>> {
        self.operation_type_resolvers.get_by_tag(tag, operator)
    }

    pub fn operation_type_resolvers(&self) -> &ResolverTable<DomainOperator> {
        &self.operation_type_resolvers
    }

    pub fn get_predicate_type_resolver(
        &self,
        type_name: &str,
        predicate: DomainPredicate,
    ) -> Option<&Arc<dyn PredicateTypeResolver>> {
        self.predicate_type_resolvers.get(type_name, predicate)
    }

    pub fn get_predicate_type_resolver_by_tag(
        &self,
        tag: &HostTypeTag,
        predicate: DomainPredicate,
    ) -> Option<&Arc<dyn PredicateTypeResolver>> {
        self.predicate_type_resolvers.get_by_tag(tag, predicate)
    }

    pub fn predicate_type_resolvers(&self) -> &ResolverTable<DomainPredicate> {
        &self.predicate_type_resolvers
    }

    /// Resolve the result type of `operator` applied to `operands`, using
    /// the resolver of the first operand's type.
    pub fn resolve_operation_type(
        &self,
        operator: DomainOperator,
        operands: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        let first = first_operand(operands)?;
        let resolver = self
            .get_operation_type_resolver(first.name(), operator)
            .filter(|_| first.has_operator(operator))
            .ok_or_else(|| unsupported(first))?;
        resolver.resolve_type(self, operands)
    }

    /// Resolve the result type of `predicate` applied to `operands`, using
    /// the resolver of the first operand's type.
    pub fn resolve_predicate_type(
        &self,
        predicate: DomainPredicate,
        operands: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        let first = first_operand(operands)?;
        let resolver = self
            .get_predicate_type_resolver(first.name(), predicate)
            .filter(|_| first.has_predicate(predicate))
            .ok_or_else(|| unsupported(first))?;
        resolver.resolve_type(self, operands)
    }

    // ==================== Literals ====================

    pub fn literal_resolvers(&self) -> &LiteralResolvers {
        &self.literal_resolvers
    }

    /// `None` when the model has no numeric literal resolver.
    pub fn resolve_numeric_literal(&self, text: &str) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.numeric.as_ref()?;
        Some(resolver.resolve_literal(self, text))
    }

    pub fn resolve_boolean_literal(&self, value: bool) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.boolean.as_ref()?;
        Some(resolver.resolve_literal(self, value))
    }

    pub fn resolve_string_literal(&self, value: &str) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.string.as_ref()?;
        Some(resolver.resolve_literal(self, value))
    }

    pub fn resolve_timestamp_literal(
        &self,
        value: DateTime<Utc>,
    ) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.temporal.as_ref()?;
        Some(resolver.resolve_timestamp_literal(self, value))
    }

    pub fn resolve_interval_literal(
        &self,
        value: &TemporalInterval,
    ) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.temporal.as_ref()?;
        Some(resolver.resolve_interval_literal(self, value))
    }

    pub fn resolve_enum_literal(
        &self,
        enum_type: &Arc<DomainType>,
        value: &str,
    ) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.enumeration.as_ref()?;
        Some(resolver.resolve_literal(self, enum_type, value))
    }

    pub fn resolve_entity_literal(
        &self,
        entity_type: &Arc<DomainType>,
        attributes: Vec<(String, ResolvedLiteral)>,
    ) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.entity.as_ref()?;
        Some(resolver.resolve_literal(self, entity_type, attributes))
    }

    pub fn resolve_collection_literal(
        &self,
        elements: Vec<ResolvedLiteral>,
    ) -> Option<Result<ResolvedLiteral, TypeResolveError>> {
        let resolver = self.literal_resolvers.collection.as_ref()?;
        Some(resolver.resolve_literal(self, elements))
    }

    // ==================== Serialization ====================

    pub fn serializers(&self) -> &[Arc<dyn DomainSerializer>] {
        &self.serializers
    }

    /// Serialize the model into a `T` using the first serializer that
    /// handles `format` and `T`. `Ok(None)` when no serializer does.
    pub fn serialize<T: Any>(
        &self,
        format: &str,
        properties: &SerializerProperties,
    ) -> Result<Option<T>, SerializeError> {
        for serializer in &self.serializers {
            let Some(result) = serializer.serialize(self, TypeId::of::<T>(), format, properties) else {
                continue;
            };
            let value = result?
                .downcast::<T>()
                .map_err(|_| SerializeError::TargetMismatch {
                    format: format.to_string(),
                })?;
            return Ok(Some(*value));
        }
        Ok(None)
    }
}

fn first_operand(operands: &[Arc<DomainType>]) -> Result<&Arc<DomainType>, TypeResolveError> {
    operands.first().ok_or(TypeResolveError::MissingOperand {
        expected: 1,
        actual: 0,
    })
}

fn unsupported(operand: &DomainType) -> TypeResolveError {
    TypeResolveError::UnsupportedOperand {
        index: 0,
        actual: operand.to_string(),
        expected: Vec::new(),
    }
}
