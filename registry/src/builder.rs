//! DomainBuilder for constructing an immutable DomainModel.

use crate::context::BuildContext;
use crate::resolver::Registrations;
use crate::{
    ArgumentDefinition, AttributeDefinition, BooleanLiteralResolver, CollectionLiteralResolver,
    DeclarationError, DefinitionBody, DomainModel, DomainSerializer, EntityDefinition,
    EntityLiteralResolver, EnumDefinition, EnumLiteralResolver, EnumValueDefinition,
    FunctionDefinition, FunctionTypeResolver, LiteralResolvers, ModelBuildFailure,
    NumericLiteralResolver, OperationTypeResolver, PredicateTypeResolver, StringLiteralResolver,
    TemporalLiteralResolver, TypeDefinition, TypeRef, Volatility,
};
use domain_core::{DomainOperator, DomainPredicate, HostTypeTag, Metadata};
use indexmap::IndexMap;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Builder for constructing an immutable [`DomainModel`].
///
/// Definitions may reference types that are registered later or live in
/// the base model; references are only checked by [`DomainBuilder::build`].
#[derive(Debug)]
pub struct DomainBuilder {
    /// Model being extended, if any.
    pub(crate) base: Option<Arc<DomainModel>>,

    /// Type definitions by exact name, in registration order.
    pub(crate) types: IndexMap<String, TypeDefinition>,
    /// Function definitions by exact name, in registration order.
    pub(crate) functions: IndexMap<String, FunctionDefinition>,
    pub(crate) function_case_sensitive: bool,

    pub(crate) enabled_operators: HashMap<String, BTreeSet<DomainOperator>>,
    pub(crate) enabled_predicates: HashMap<String, BTreeSet<DomainPredicate>>,

    pub(crate) function_type_resolvers: IndexMap<String, Arc<dyn FunctionTypeResolver>>,
    pub(crate) operation_type_resolvers: Registrations<DomainOperator>,
    pub(crate) predicate_type_resolvers: Registrations<DomainPredicate>,

    pub(crate) literal_resolvers: LiteralResolvers,
    pub(crate) serializers: Vec<Arc<dyn DomainSerializer>>,
}

impl Default for DomainBuilder {
    fn default() -> Self {
        Self {
            base: None,
            types: IndexMap::new(),
            functions: IndexMap::new(),
            function_case_sensitive: true,
            enabled_operators: HashMap::new(),
            enabled_predicates: HashMap::new(),
            function_type_resolvers: IndexMap::new(),
            operation_type_resolvers: Registrations::default(),
            predicate_type_resolvers: Registrations::default(),
            literal_resolvers: LiteralResolvers::default(),
            serializers: Vec::new(),
        }
    }
}

impl DomainBuilder {
    /// Create a new builder for a standalone model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder whose model extends `base`.
    ///
    /// Literal resolvers, serializers and function case sensitivity are
    /// inherited from the base model and may be overridden.
    pub fn extending(base: Arc<DomainModel>) -> Self {
        Self {
            function_case_sensitive: base.is_function_case_sensitive(),
            literal_resolvers: base.literal_resolvers().clone(),
            serializers: base.serializers().to_vec(),
            base: Some(base),
            ..Self::default()
        }
    }

    /// Set whether function names are matched case sensitively.
    pub fn with_function_case_sensitive(&mut self, case_sensitive: bool) -> &mut Self {
        self.function_case_sensitive = case_sensitive;
        self
    }

    /// Register a type definition, replacing one with the exact same name.
    pub fn register_type(&mut self, definition: TypeDefinition) -> &mut Self {
        self.types.insert(definition.name.clone(), definition);
        self
    }

    /// Register a function definition, replacing one with the exact same name.
    pub fn register_function(
        &mut self,
        definition: FunctionDefinition,
    ) -> Result<&mut Self, DeclarationError> {
        let mut kinds = definition.arguments.iter().map(|arg| arg.is_positional());
        if let Some(first) = kinds.next() {
            if kinds.any(|positional| positional != first) {
                return Err(DeclarationError::MixedArguments {
                    function: definition.name,
                });
            }
        }
        self.functions.insert(definition.name.clone(), definition);
        Ok(self)
    }

    /// Add a basic type definition.
    pub fn create_basic_type(&mut self, name: impl Into<String>) -> BasicTypeBuilder<'_> {
        BasicTypeBuilder {
            builder: self,
            definition: TypeDefinition::basic(name),
            operators: BTreeSet::new(),
            predicates: BTreeSet::new(),
        }
    }

    /// Add an entity type definition.
    pub fn create_entity_type(&mut self, name: impl Into<String>) -> EntityTypeBuilder<'_> {
        EntityTypeBuilder {
            builder: self,
            name: name.into(),
            tag: None,
            metadata: Metadata::new(),
            entity: EntityDefinition::new(),
            operators: BTreeSet::new(),
            predicates: BTreeSet::new(),
        }
    }

    /// Add an entity type definition that starts with a copy of the
    /// attributes of `base_entity`, looked up locally and then in the base
    /// model.
    pub fn extend_entity_type(
        &mut self,
        name: impl Into<String>,
        base_entity: &str,
    ) -> Result<EntityTypeBuilder<'_>, DeclarationError> {
        let entity = self.copy_entity_attributes(base_entity)?;
        let mut builder = self.create_entity_type(name);
        builder.entity = entity;
        Ok(builder)
    }

    fn copy_entity_attributes(&self, base_entity: &str) -> Result<EntityDefinition, DeclarationError> {
        if let Some(entity) = self.types.get(base_entity).and_then(TypeDefinition::as_entity) {
            return Ok(entity.clone());
        }
        let resolved = self
            .base
            .as_ref()
            .and_then(|base| base.get_entity_type(base_entity))
            .ok_or_else(|| DeclarationError::UnknownEntityType(base_entity.to_string()))?;

        let mut entity = EntityDefinition::new();
        if let crate::TypeShape::Entity { attributes } = resolved.shape() {
            entity.case_sensitive = attributes.mode().is_sensitive();
        }
        for attribute in resolved.attributes() {
            let mut definition = match attribute.element_type_name() {
                Some(element) => AttributeDefinition::collection(attribute.name(), element),
                None => AttributeDefinition::new(attribute.name(), attribute.type_name()),
            };
            definition.metadata = attribute.metadata().clone();
            entity.insert(definition);
        }
        Ok(entity)
    }

    /// Add an enum type definition.
    pub fn create_enum_type(&mut self, name: impl Into<String>) -> EnumTypeBuilder<'_> {
        EnumTypeBuilder {
            builder: self,
            name: name.into(),
            tag: None,
            metadata: Metadata::new(),
            values: EnumDefinition::new(),
            operators: BTreeSet::new(),
            predicates: BTreeSet::new(),
        }
    }

    /// Add a function definition.
    pub fn create_function(&mut self, name: impl Into<String>) -> FunctionBuilder<'_> {
        FunctionBuilder {
            builder: self,
            definition: FunctionDefinition::new(name),
        }
    }

    /// Enable an operator on the named type.
    pub fn with_operator(&mut self, type_name: impl Into<String>, operator: DomainOperator) -> &mut Self {
        self.with_operators(type_name, [operator])
    }

    pub fn with_operators(
        &mut self,
        type_name: impl Into<String>,
        operators: impl IntoIterator<Item = DomainOperator>,
    ) -> &mut Self {
        self.enabled_operators
            .entry(type_name.into())
            .or_default()
            .extend(operators);
        self
    }

    /// Enable a predicate on the named type.
    pub fn with_predicate(&mut self, type_name: impl Into<String>, predicate: DomainPredicate) -> &mut Self {
        self.with_predicates(type_name, [predicate])
    }

    pub fn with_predicates(
        &mut self,
        type_name: impl Into<String>,
        predicates: impl IntoIterator<Item = DomainPredicate>,
    ) -> &mut Self {
        self.enabled_predicates
            .entry(type_name.into())
            .or_default()
            .extend(predicates);
        self
    }

    /// Register the result type resolver of a function.
    pub fn with_function_type_resolver<R>(&mut self, function: impl Into<String>, resolver: R) -> &mut Self
    where
        R: FunctionTypeResolver + 'static,
    {
        self.function_type_resolvers
            .insert(function.into(), Arc::new(resolver));
        self
    }

    /// Register the resolver of an operator on a type, by name or host tag.
    pub fn with_operation_type_resolver<R>(
        &mut self,
        target: impl Into<TypeRef>,
        operator: DomainOperator,
        resolver: R,
    ) -> &mut Self
    where
        R: OperationTypeResolver + 'static,
    {
        let resolver: Arc<dyn OperationTypeResolver> = Arc::new(resolver);
        match target.into() {
            TypeRef::Name(name) => self
                .operation_type_resolvers
                .register_by_name(name, operator, resolver),
            TypeRef::Tag(tag) => self
                .operation_type_resolvers
                .register_by_tag(tag, operator, resolver),
        }
        self
    }

    /// Register the resolver of a predicate on a type, by name or host tag.
    pub fn with_predicate_type_resolver<R>(
        &mut self,
        target: impl Into<TypeRef>,
        predicate: DomainPredicate,
        resolver: R,
    ) -> &mut Self
    where
        R: PredicateTypeResolver + 'static,
    {
        let resolver: Arc<dyn PredicateTypeResolver> = Arc::new(resolver);
        match target.into() {
            TypeRef::Name(name) => self
                .predicate_type_resolvers
                .register_by_name(name, predicate, resolver),
            TypeRef::Tag(tag) => self
                .predicate_type_resolvers
                .register_by_tag(tag, predicate, resolver),
        }
        self
    }

    pub fn with_numeric_literal_resolver(&mut self, resolver: impl NumericLiteralResolver + 'static) -> &mut Self {
        self.literal_resolvers.numeric = Some(Arc::new(resolver));
        self
    }

    pub fn with_boolean_literal_resolver(&mut self, resolver: impl BooleanLiteralResolver + 'static) -> &mut Self {
        self.literal_resolvers.boolean = Some(Arc::new(resolver));
        self
    }

    pub fn with_string_literal_resolver(&mut self, resolver: impl StringLiteralResolver + 'static) -> &mut Self {
        self.literal_resolvers.string = Some(Arc::new(resolver));
        self
    }

    pub fn with_temporal_literal_resolver(&mut self, resolver: impl TemporalLiteralResolver + 'static) -> &mut Self {
        self.literal_resolvers.temporal = Some(Arc::new(resolver));
        self
    }

    pub fn with_enum_literal_resolver(&mut self, resolver: impl EnumLiteralResolver + 'static) -> &mut Self {
        self.literal_resolvers.enumeration = Some(Arc::new(resolver));
        self
    }

    pub fn with_entity_literal_resolver(&mut self, resolver: impl EntityLiteralResolver + 'static) -> &mut Self {
        self.literal_resolvers.entity = Some(Arc::new(resolver));
        self
    }

    pub fn with_collection_literal_resolver(
        &mut self,
        resolver: impl CollectionLiteralResolver + 'static,
    ) -> &mut Self {
        self.literal_resolvers.collection = Some(Arc::new(resolver));
        self
    }

    /// Add a serializer. Serializers are consulted in registration order.
    pub fn with_serializer(&mut self, serializer: impl DomainSerializer + 'static) -> &mut Self {
        self.serializers.push(Arc::new(serializer));
        self
    }

    // ==================== Introspection ====================

    pub fn base_model(&self) -> Option<&Arc<DomainModel>> {
        self.base.as_ref()
    }

    pub fn is_function_case_sensitive(&self) -> bool {
        self.function_case_sensitive
    }

    pub fn type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Get the most recently registered type definition carrying `tag`.
    pub fn type_definition_by_tag(&self, tag: &HostTypeTag) -> Option<&TypeDefinition> {
        self.types
            .values()
            .rev()
            .find(|definition| definition.tag.as_ref() == Some(tag))
    }

    pub fn entity_definition(&self, name: &str) -> Option<&EntityDefinition> {
        self.types.get(name).and_then(TypeDefinition::as_entity)
    }

    pub fn type_definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    /// Get a function definition, honoring the function case sensitivity.
    pub fn function_definition(&self, name: &str) -> Option<&FunctionDefinition> {
        if self.function_case_sensitive {
            return self.functions.get(name);
        }
        let wanted = name.to_lowercase();
        self.functions
            .values()
            .rev()
            .find(|definition| definition.name.to_lowercase() == wanted)
    }

    pub fn function_definitions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.functions.values()
    }

    pub fn enabled_operators(&self, type_name: &str) -> Option<&BTreeSet<DomainOperator>> {
        self.enabled_operators.get(type_name)
    }

    pub fn enabled_predicates(&self, type_name: &str) -> Option<&BTreeSet<DomainPredicate>> {
        self.enabled_predicates.get(type_name)
    }

    pub fn function_type_resolver(&self, function: &str) -> Option<&Arc<dyn FunctionTypeResolver>> {
        self.function_type_resolvers.get(function)
    }

    pub fn operation_type_resolver(
        &self,
        type_name: &str,
        operator: DomainOperator,
    ) -> Option<&Arc<dyn OperationTypeResolver>> {
        self.operation_type_resolvers.by_name.get(type_name)?.get(&operator)
    }

    pub fn predicate_type_resolver(
        &self,
        type_name: &str,
        predicate: DomainPredicate,
    ) -> Option<&Arc<dyn PredicateTypeResolver>> {
        self.predicate_type_resolvers.by_name.get(type_name)?.get(&predicate)
    }

    pub fn literal_resolvers(&self) -> &LiteralResolvers {
        &self.literal_resolvers
    }

    pub fn serializers(&self) -> &[Arc<dyn DomainSerializer>] {
        &self.serializers
    }

    /// Build the immutable model.
    ///
    /// Either every definition resolves and a model is returned, or the
    /// failure lists every problem found. The builder is left untouched and
    /// can be built again.
    pub fn build(&self) -> Result<DomainModel, ModelBuildFailure> {
        BuildContext::new(self).build()
    }
}

/// Builder for a basic type definition.
pub struct BasicTypeBuilder<'a> {
    builder: &'a mut DomainBuilder,
    definition: TypeDefinition,
    operators: BTreeSet<DomainOperator>,
    predicates: BTreeSet<DomainPredicate>,
}

impl<'a> BasicTypeBuilder<'a> {
    /// Set the host type tag.
    pub fn tag(mut self, tag: impl Into<HostTypeTag>) -> Self {
        self.definition.tag = Some(tag.into());
        self
    }

    pub fn metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.definition.metadata.insert(value);
        self
    }

    pub fn operators(mut self, operators: impl IntoIterator<Item = DomainOperator>) -> Self {
        self.operators.extend(operators);
        self
    }

    pub fn predicates(mut self, predicates: impl IntoIterator<Item = DomainPredicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    /// Finish building this type.
    pub fn done(self) -> &'a mut DomainBuilder {
        let Self {
            builder,
            definition,
            operators,
            predicates,
        } = self;
        let name = definition.name.clone();
        builder
            .with_operators(name.clone(), operators)
            .with_predicates(name, predicates)
            .register_type(definition)
    }
}

/// Builder for an entity type definition.
pub struct EntityTypeBuilder<'a> {
    builder: &'a mut DomainBuilder,
    name: String,
    tag: Option<HostTypeTag>,
    metadata: Metadata,
    entity: EntityDefinition,
    operators: BTreeSet<DomainOperator>,
    predicates: BTreeSet<DomainPredicate>,
}

impl<'a> EntityTypeBuilder<'a> {
    /// Set the host type tag.
    pub fn tag(mut self, tag: impl Into<HostTypeTag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set whether attribute names are matched case sensitively.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.entity.case_sensitive = case_sensitive;
        self
    }

    /// Add an attribute of the given type.
    pub fn attribute(self, name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        self.attr(AttributeDefinition::new(name, type_ref))
    }

    /// Add an attribute holding a collection of `element`.
    pub fn collection_attribute(self, name: impl Into<String>, element: impl Into<TypeRef>) -> Self {
        self.attr(AttributeDefinition::collection(name, element))
    }

    /// Add a fully specified attribute.
    pub fn attr(mut self, attribute: AttributeDefinition) -> Self {
        self.entity.insert(attribute);
        self
    }

    pub fn metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.metadata.insert(value);
        self
    }

    pub fn operators(mut self, operators: impl IntoIterator<Item = DomainOperator>) -> Self {
        self.operators.extend(operators);
        self
    }

    pub fn predicates(mut self, predicates: impl IntoIterator<Item = DomainPredicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    /// Finish building this type.
    pub fn done(self) -> &'a mut DomainBuilder {
        let Self {
            builder,
            name,
            tag,
            metadata,
            entity,
            operators,
            predicates,
        } = self;
        let definition = TypeDefinition {
            name: name.clone(),
            tag,
            metadata,
            body: DefinitionBody::Entity(entity),
        };
        builder
            .with_operators(name.clone(), operators)
            .with_predicates(name, predicates)
            .register_type(definition)
    }
}

/// Builder for an enum type definition.
pub struct EnumTypeBuilder<'a> {
    builder: &'a mut DomainBuilder,
    name: String,
    tag: Option<HostTypeTag>,
    metadata: Metadata,
    values: EnumDefinition,
    operators: BTreeSet<DomainOperator>,
    predicates: BTreeSet<DomainPredicate>,
}

impl<'a> EnumTypeBuilder<'a> {
    pub fn tag(mut self, tag: impl Into<HostTypeTag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set whether value names are matched case sensitively.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.values.case_sensitive = case_sensitive;
        self
    }

    pub fn value(self, name: impl Into<String>) -> Self {
        self.enum_value(EnumValueDefinition::new(name))
    }

    pub fn enum_value(mut self, value: EnumValueDefinition) -> Self {
        self.values.insert(value);
        self
    }

    pub fn metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.metadata.insert(value);
        self
    }

    pub fn operators(mut self, operators: impl IntoIterator<Item = DomainOperator>) -> Self {
        self.operators.extend(operators);
        self
    }

    pub fn predicates(mut self, predicates: impl IntoIterator<Item = DomainPredicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    /// Finish building this type.
    pub fn done(self) -> &'a mut DomainBuilder {
        let Self {
            builder,
            name,
            tag,
            metadata,
            values,
            operators,
            predicates,
        } = self;
        let definition = TypeDefinition {
            name: name.clone(),
            tag,
            metadata,
            body: DefinitionBody::Enum(values),
        };
        builder
            .with_operators(name.clone(), operators)
            .with_predicates(name, predicates)
            .register_type(definition)
    }
}

/// Builder for a function definition.
///
/// Arguments are either all named or all positional; adding an argument of
/// the other kind fails immediately and discards the function.
pub struct FunctionBuilder<'a> {
    builder: &'a mut DomainBuilder,
    definition: FunctionDefinition,
}

impl<'a> FunctionBuilder<'a> {
    /// Add a fully specified argument.
    pub fn argument(mut self, argument: ArgumentDefinition) -> Result<Self, DeclarationError> {
        if let Some(positional) = self.definition.is_positional() {
            if positional != argument.is_positional() {
                return Err(DeclarationError::MixedArguments {
                    function: self.definition.name,
                });
            }
        }
        self.definition.arguments.push(argument);
        Ok(self)
    }

    /// Add a named argument of the given type.
    pub fn named_argument(
        self,
        name: impl Into<String>,
        type_ref: impl Into<TypeRef>,
    ) -> Result<Self, DeclarationError> {
        self.argument(ArgumentDefinition::named(name).of_type(type_ref))
    }

    /// Add a positional argument of the given type.
    pub fn positional_argument(self, type_ref: impl Into<TypeRef>) -> Result<Self, DeclarationError> {
        self.argument(ArgumentDefinition::positional().of_type(type_ref))
    }

    /// Pin the minimum argument count.
    pub fn min_argument_count(mut self, count: usize) -> Self {
        self.definition.min_argument_count = Some(count);
        self
    }

    /// Pin the argument count. Also pins the minimum.
    pub fn argument_count(mut self, count: usize) -> Self {
        self.definition.argument_count = Some(count);
        self.definition.min_argument_count = Some(count);
        self
    }

    /// Accept any number of arguments beyond the minimum.
    pub fn variadic(mut self) -> Self {
        self.definition.variadic = true;
        self
    }

    pub fn result_type(mut self, type_ref: impl Into<TypeRef>) -> Self {
        self.definition.result_type = Some(type_ref.into());
        self.definition.result_collection = false;
        self
    }

    /// The function returns a collection of `element`.
    pub fn collection_result_type(mut self, element: impl Into<TypeRef>) -> Self {
        self.definition.result_type = Some(element.into());
        self.definition.result_collection = true;
        self
    }

    pub fn volatility(mut self, volatility: Volatility) -> Self {
        self.definition.volatility = volatility;
        self
    }

    pub fn metadata<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.definition.metadata.insert(value);
        self
    }

    /// Finish building this function.
    pub fn done(self) -> &'a mut DomainBuilder {
        let Self {
            builder,
            definition,
        } = self;
        builder
            .functions
            .insert(definition.name.clone(), definition);
        builder
    }
}
