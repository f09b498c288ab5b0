//! One-shot build of a model from a builder.
//!
//! The build runs in phases. Binding resolves every type reference of every
//! definition into a [`DefRef`] and allocates collection slots. Realization
//! turns the definitions into arena entries; because every handle is known
//! before the first type is created, cyclic references need no fix-ups.
//! Reconciliation then validates and indexes the registered resolvers.
//! Each phase only runs if the previous one found no errors.

use crate::reconcile::{backfill, reconcile};
use crate::{
    BuildError, DefinitionBody, DomainBuilder, DomainFunction, DomainModel, DomainType,
    EntityAttribute, EnumValue, FunctionArgument, FunctionTypeResolver, ModelBuildFailure,
    TypeHandle, TypeRef, TypeShape, COLLECTION_TYPE_NAME,
};
use domain_core::{CaseMode, DomainPredicate, HostTypeTag, Metadata, NameMap};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// A bound type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DefRef {
    /// Index into the builder's type definitions.
    Local(usize),
    /// A type of the base model.
    Base(TypeHandle),
    /// Index into the collection slots of this build.
    Collection(usize),
}

/// A bound function argument or result.
#[derive(Debug, Clone, Copy)]
enum Binding {
    Untyped,
    /// A collection without a known element type. Never realized as a type.
    AnyCollection,
    Type(DefRef),
    Unresolved,
}

#[derive(Debug)]
struct FunctionBinding {
    arguments: Vec<Binding>,
    result: Binding,
}

pub(crate) struct BuildContext<'b> {
    builder: &'b DomainBuilder,
    base: Option<&'b DomainModel>,
    errors: Vec<BuildError>,
    /// Local definitions by host tag.
    tags: HashMap<&'b HostTypeTag, usize>,
    /// Element type of each collection slot.
    collections: Vec<DefRef>,
    collection_slots: HashMap<DefRef, usize>,
    /// Per local definition, the binding of each entity attribute.
    attributes: Vec<Vec<Option<DefRef>>>,
    functions: Vec<FunctionBinding>,
}

impl<'b> BuildContext<'b> {
    pub fn new(builder: &'b DomainBuilder) -> Self {
        Self {
            builder,
            base: builder.base.as_deref(),
            errors: Vec::new(),
            tags: HashMap::new(),
            collections: Vec::new(),
            collection_slots: HashMap::new(),
            attributes: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn build(mut self) -> Result<DomainModel, ModelBuildFailure> {
        debug!(
            types = self.builder.types.len(),
            functions = self.builder.functions.len(),
            extending = self.base.is_some(),
            "building domain model"
        );

        self.index_tags();
        self.bind_types();
        self.bind_functions();
        if !self.errors.is_empty() {
            return self.fail("bind");
        }
        debug!(collections = self.collections.len(), "definitions bound");

        let mut model = self.realize_types();
        self.realize_functions(&mut model);
        if !self.errors.is_empty() {
            return self.fail("realize");
        }

        self.reconcile_resolvers(&mut model);
        if !self.errors.is_empty() {
            return self.fail("reconcile");
        }

        let handles: Vec<TypeHandle> = model
            .types_by_name
            .values()
            .chain(model.collection_types.values())
            .copied()
            .collect();
        let types: Vec<Arc<DomainType>> = handles
            .iter()
            .filter_map(|handle| model.arena.get(handle.index()).cloned())
            .collect();
        backfill(&mut model.operation_type_resolvers, &types);
        backfill(&mut model.predicate_type_resolvers, &types);

        model.literal_resolvers = self.builder.literal_resolvers.clone();
        model.serializers = self.builder.serializers.clone();

        debug!(
            types = model.types_by_name.len(),
            arena = model.arena.len(),
            functions = model.functions.len(),
            "domain model built"
        );
        Ok(model)
    }

    fn fail(self, phase: &'static str) -> Result<DomainModel, ModelBuildFailure> {
        warn!(phase, errors = self.errors.len(), "domain model build failed");
        Err(ModelBuildFailure::new(self.errors))
    }

    // ==================== Binding ====================

    fn index_tags(&mut self) {
        let builder = self.builder;
        for (index, definition) in builder.types.values().enumerate() {
            let Some(tag) = &definition.tag else {
                continue;
            };
            if let Some(previous) = self.tags.insert(tag, index) {
                self.errors.push(BuildError::AmbiguousHostTag {
                    tag: tag.clone(),
                    first: builder.types[previous].name.clone(),
                    second: definition.name.clone(),
                });
            }
        }
    }

    /// Local definitions shadow types of the base model.
    fn lookup(&self, type_ref: &TypeRef) -> Option<DefRef> {
        match type_ref {
            TypeRef::Name(name) => self
                .builder
                .types
                .get_index_of(name.as_str())
                .map(DefRef::Local)
                .or_else(|| self.base?.type_handle(name).map(DefRef::Base)),
            TypeRef::Tag(tag) => self
                .tags
                .get(tag)
                .copied()
                .map(DefRef::Local)
                .or_else(|| {
                    self.base?
                        .get_type_by_tag(tag)
                        .map(|ty| DefRef::Base(ty.handle()))
                }),
        }
    }

    /// Get the collection of `element`, allocating a slot on first use.
    fn collection_of(&mut self, element: DefRef) -> DefRef {
        if let DefRef::Base(handle) = element {
            if let Some(existing) = self.base.and_then(|base| base.collection_handle(handle)) {
                return DefRef::Base(existing);
            }
        }
        let next = self.collections.len();
        let slot = *self.collection_slots.entry(element).or_insert(next);
        if slot == next {
            self.collections.push(element);
        }
        DefRef::Collection(slot)
    }

    fn bind_types(&mut self) {
        let builder = self.builder;

        // Slot i holds the collection of local type i.
        for index in 0..builder.types.len() {
            self.collection_of(DefRef::Local(index));
        }

        for definition in builder.types.values() {
            // Collection types share this name and are looked up by it.
            if definition.name == COLLECTION_TYPE_NAME {
                self.errors.push(BuildError::ReservedTypeName {
                    name: definition.name.clone(),
                });
            }
            let mut bindings = Vec::new();
            if let DefinitionBody::Entity(entity) = &definition.body {
                for attribute in entity.attributes.values() {
                    let binding = match self.lookup(&attribute.type_ref) {
                        Some(target) if attribute.collection => Some(self.collection_of(target)),
                        Some(target) => Some(target),
                        None => {
                            self.errors.push(BuildError::UnknownAttributeType {
                                entity: definition.name.clone(),
                                attribute: attribute.name.clone(),
                                type_ref: attribute.type_ref.clone(),
                            });
                            None
                        }
                    };
                    bindings.push(binding);
                }
            }
            self.attributes.push(bindings);
        }
    }

    fn bind_functions(&mut self) {
        let builder = self.builder;
        for definition in builder.functions.values() {
            let mut arguments = Vec::with_capacity(definition.arguments.len());
            for (index, argument) in definition.arguments.iter().enumerate() {
                let binding = self.bind_slot(argument.type_ref.as_ref(), argument.collection);
                if let (Binding::Unresolved, Some(type_ref)) = (binding, &argument.type_ref) {
                    let name = match &argument.name {
                        Some(name) => name.clone(),
                        None => format!("argument{}", index + 1),
                    };
                    self.errors.push(BuildError::UnknownArgumentType {
                        function: definition.name.clone(),
                        argument: name,
                        type_ref: type_ref.clone(),
                    });
                }
                arguments.push(binding);
            }

            let result = self.bind_slot(definition.result_type.as_ref(), definition.result_collection);
            if let (Binding::Unresolved, Some(type_ref)) = (result, &definition.result_type) {
                self.errors.push(BuildError::UnknownResultType {
                    function: definition.name.clone(),
                    type_ref: type_ref.clone(),
                });
            }
            self.functions.push(FunctionBinding { arguments, result });
        }
    }

    fn bind_slot(&mut self, type_ref: Option<&TypeRef>, collection: bool) -> Binding {
        match type_ref {
            None if collection => Binding::AnyCollection,
            None => Binding::Untyped,
            Some(type_ref) => match self.lookup(type_ref) {
                Some(target) if collection => Binding::Type(self.collection_of(target)),
                Some(target) => Binding::Type(target),
                None => Binding::Unresolved,
            },
        }
    }

    // ==================== Realization ====================

    fn handle(&self, def: DefRef) -> TypeHandle {
        let base_len = self.base.map_or(0, |base| base.arena.len());
        let index = match def {
            DefRef::Base(handle) => return handle,
            DefRef::Local(index) => base_len + index,
            DefRef::Collection(slot) => base_len + self.builder.types.len() + slot,
        };
        TypeHandle::new(index as u32)
    }

    /// Display name of a bound type.
    fn name_of(&self, def: DefRef) -> String {
        match def {
            DefRef::Local(index) => self.builder.types[index].name.clone(),
            DefRef::Base(handle) => self
                .base
                .and_then(|base| base.type_at(handle))
                .map(|ty| ty.to_string())
                .unwrap_or_default(),
            DefRef::Collection(slot) => {
                format!("{}[{}]", COLLECTION_TYPE_NAME, self.name_of(self.collections[slot]))
            }
        }
    }

    /// Element type name of a bound collection.
    fn element_name_of(&self, def: DefRef) -> Option<String> {
        match def {
            DefRef::Collection(slot) => Some(self.name_of(self.collections[slot])),
            DefRef::Base(handle) => match self.base?.type_at(handle)?.shape() {
                TypeShape::Collection { element_name, .. } => Some(element_name.clone()),
                _ => None,
            },
            DefRef::Local(_) => None,
        }
    }

    fn realize_types(&mut self) -> DomainModel {
        let builder = self.builder;
        let attribute_bindings = std::mem::take(&mut self.attributes);
        let mut model = match self.base {
            Some(base) => DomainModel {
                arena: base.arena.clone(),
                types_by_name: base.types_by_name.clone(),
                types_by_tag: base.types_by_tag.clone(),
                collection_types: base.collection_types.clone(),
                ..DomainModel::default()
            },
            None => DomainModel::default(),
        };

        for (index, definition) in builder.types.values().enumerate() {
            let handle = self.handle(DefRef::Local(index));
            let shape = match &definition.body {
                DefinitionBody::Basic => TypeShape::Basic,
                DefinitionBody::Entity(entity) => {
                    let mut attributes = NameMap::new(CaseMode::from_sensitive(entity.case_sensitive));
                    let bindings = &attribute_bindings[index];
                    for (attribute, binding) in entity.attributes.values().zip(bindings) {
                        let Some(target) = *binding else {
                            continue;
                        };
                        let element_name = if attribute.collection {
                            self.element_name_of(target)
                        } else {
                            None
                        };
                        let realized = EntityAttribute::new(
                            attribute.name.clone(),
                            self.handle(target),
                            self.name_of(target),
                            element_name,
                            attribute.metadata.clone(),
                        );
                        if let Some((previous, _)) = attributes.insert(attribute.name.clone(), realized) {
                            self.errors.push(BuildError::DuplicateAttribute {
                                entity: definition.name.clone(),
                                first: previous,
                                second: attribute.name.clone(),
                            });
                        }
                    }
                    TypeShape::Entity { attributes }
                }
                DefinitionBody::Enum(values) => {
                    let mut realized = NameMap::new(CaseMode::from_sensitive(values.case_sensitive));
                    for value in values.values.values() {
                        let enum_value = EnumValue::new(value.name.clone(), value.metadata.clone());
                        if let Some((previous, _)) = realized.insert(value.name.clone(), enum_value) {
                            self.errors.push(BuildError::DuplicateEnumValue {
                                enum_type: definition.name.clone(),
                                first: previous,
                                second: value.name.clone(),
                            });
                        }
                    }
                    TypeShape::Enum { values: realized }
                }
            };

            let ty = DomainType::new(
                handle,
                definition.name.clone(),
                definition.tag.clone(),
                builder
                    .enabled_operators
                    .get(&definition.name)
                    .cloned()
                    .unwrap_or_default(),
                builder
                    .enabled_predicates
                    .get(&definition.name)
                    .cloned()
                    .unwrap_or_default(),
                definition.metadata.clone(),
                shape,
            );
            model.arena.push(Arc::new(ty));
            model.types_by_name.insert(definition.name.clone(), handle);
            if let Some(tag) = &definition.tag {
                model.types_by_tag.insert(tag.clone(), handle);
            }
        }

        for (slot, element) in self.collections.iter().enumerate() {
            let handle = self.handle(DefRef::Collection(slot));
            let element_handle = self.handle(*element);
            let ty = DomainType::new(
                handle,
                COLLECTION_TYPE_NAME,
                None,
                BTreeSet::new(),
                BTreeSet::from([DomainPredicate::Collection]),
                Metadata::new(),
                TypeShape::Collection {
                    element: element_handle,
                    element_name: self.name_of(*element),
                },
            );
            model.arena.push(Arc::new(ty));
            model.collection_types.insert(element_handle, handle);
        }

        model
    }

    fn realize_slot(&self, binding: Binding) -> (Option<TypeHandle>, Option<String>) {
        match binding {
            Binding::Type(def) => (Some(self.handle(def)), Some(self.name_of(def))),
            Binding::Untyped | Binding::AnyCollection | Binding::Unresolved => (None, None),
        }
    }

    fn realize_functions(&mut self, model: &mut DomainModel) {
        let builder = self.builder;
        let mode = CaseMode::from_sensitive(builder.function_case_sensitive);

        let mut functions = NameMap::new(mode);
        let mut resolvers: NameMap<Arc<dyn FunctionTypeResolver>> = NameMap::new(mode);
        if let Some(base) = self.base {
            for function in base.functions.values() {
                let displaced = functions.insert(function.name().to_string(), Arc::clone(function));
                if let Some((previous, _)) = displaced {
                    self.errors.push(BuildError::DuplicateFunction {
                        first: previous,
                        second: function.name().to_string(),
                    });
                }
            }
            for (name, resolver) in base.function_type_resolvers.iter() {
                resolvers.insert(name.to_string(), Arc::clone(resolver));
            }
        }

        let bindings = std::mem::take(&mut self.functions);
        let mut declared = NameMap::new(mode);
        for (definition, binding) in builder.functions.values().zip(&bindings) {
            if let Some((previous, ())) = declared.insert(definition.name.clone(), ()) {
                self.errors.push(BuildError::DuplicateFunction {
                    first: previous,
                    second: definition.name.clone(),
                });
                continue;
            }

            let arguments = definition
                .arguments
                .iter()
                .zip(&binding.arguments)
                .enumerate()
                .map(|(index, (argument, binding))| {
                    let (ty, type_name) = self.realize_slot(*binding);
                    FunctionArgument::new(
                        argument.name.clone(),
                        index,
                        ty,
                        type_name,
                        argument.collection,
                        argument.metadata.clone(),
                    )
                })
                .collect();
            let (result_type, result_type_name) = self.realize_slot(binding.result);

            let function = DomainFunction::new(
                definition.name.clone(),
                arguments,
                definition.min_argument_count(),
                definition.argument_count(),
                result_type,
                result_type_name,
                definition.result_collection,
                definition.volatility,
                definition.metadata.clone(),
            );
            functions.insert(definition.name.clone(), Arc::new(function));
        }

        model.functions = functions;
        model.function_type_resolvers = resolvers;
    }

    // ==================== Reconciliation ====================

    fn reconcile_resolvers(&mut self, model: &mut DomainModel) {
        for (name, resolver) in &self.builder.function_type_resolvers {
            if model.functions.contains_key(name) {
                model
                    .function_type_resolvers
                    .insert(name.clone(), Arc::clone(resolver));
            } else {
                self.errors.push(BuildError::UnknownFunctionResolverTarget {
                    function: name.clone(),
                    resolver: format!("{:?}", resolver),
                });
            }
        }

        let index = TypeIndex {
            arena: &model.arena,
            by_name: &model.types_by_name,
            by_tag: &model.types_by_tag,
        };
        let operations = reconcile(
            &mut self.errors,
            &index,
            self.base.map(|base| &base.operation_type_resolvers),
            &self.builder.operation_type_resolvers,
        );
        let predicates = reconcile(
            &mut self.errors,
            &index,
            self.base.map(|base| &base.predicate_type_resolvers),
            &self.builder.predicate_type_resolvers,
        );
        model.operation_type_resolvers = operations;
        model.predicate_type_resolvers = predicates;
    }
}

/// Borrowed view of the realized type tables.
pub(crate) struct TypeIndex<'m> {
    pub arena: &'m [Arc<DomainType>],
    pub by_name: &'m IndexMap<String, TypeHandle>,
    pub by_tag: &'m HashMap<HostTypeTag, TypeHandle>,
}

impl TypeIndex<'_> {
    pub fn resolve(&self, target: &TypeRef) -> Option<&Arc<DomainType>> {
        let handle = match target {
            TypeRef::Name(name) => self.by_name.get(name.as_str())?,
            TypeRef::Tag(tag) => self.by_tag.get(tag)?,
        };
        self.arena.get(handle.index())
    }
}
