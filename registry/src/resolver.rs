//! Type resolver contracts and the per-type resolver tables.

use crate::{
    DomainFunction, DomainModel, DomainType, FixedTypeResolver, TypeResolveError,
};
use domain_core::{DomainOperator, DomainPredicate, HostTypeTag};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Computes the result type of applying an operator to operands.
pub trait OperationTypeResolver: fmt::Debug + Send + Sync {
    fn resolve_type(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError>;
}

/// Computes the result type of applying a predicate to operands.
pub trait PredicateTypeResolver: fmt::Debug + Send + Sync {
    fn resolve_type(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError>;
}

/// Computes the result type of a function invocation.
pub trait FunctionTypeResolver: fmt::Debug + Send + Sync {
    fn resolve_type(
        &self,
        model: &DomainModel,
        function: &DomainFunction,
        argument_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError>;
}

/// A capability that can be enabled on a type and carries a type resolver.
///
/// Implemented by [`DomainOperator`] and [`DomainPredicate`] so resolver
/// registration, reconciliation and default backfill share one code path.
pub trait Capability:
    Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    type Resolver: ?Sized + fmt::Debug + Send + Sync;

    /// Resolver family name used in diagnostics.
    const KIND: &'static str;
    /// Capability name used in diagnostics.
    const CAPABILITY_KIND: &'static str;

    /// The capabilities of this family enabled on `ty`.
    fn enabled_on(ty: &DomainType) -> &BTreeSet<Self>;

    /// Resolver installed when a type enables the capability without
    /// registering one.
    fn default_resolver(ty: &DomainType) -> Arc<Self::Resolver>;
}

impl Capability for DomainOperator {
    type Resolver = dyn OperationTypeResolver;

    const KIND: &'static str = "operation";
    const CAPABILITY_KIND: &'static str = "operator";

    fn enabled_on(ty: &DomainType) -> &BTreeSet<Self> {
        ty.enabled_operators()
    }

    /// Operators yield the operand type by default.
    fn default_resolver(ty: &DomainType) -> Arc<Self::Resolver> {
        Arc::new(FixedTypeResolver::new(ty.name()))
    }
}

impl Capability for DomainPredicate {
    type Resolver = dyn PredicateTypeResolver;

    const KIND: &'static str = "predicate";
    const CAPABILITY_KIND: &'static str = "predicate";

    fn enabled_on(ty: &DomainType) -> &BTreeSet<Self> {
        ty.enabled_predicates()
    }

    /// Predicates yield the type registered for `bool` by default.
    fn default_resolver(_ty: &DomainType) -> Arc<Self::Resolver> {
        Arc::new(FixedTypeResolver::by_tag(HostTypeTag::of::<bool>()))
    }
}

/// Resolver registrations collected by a builder, keyed by target type.
#[derive(Debug)]
pub(crate) struct Registrations<C: Capability> {
    pub by_name: IndexMap<String, IndexMap<C, Arc<C::Resolver>>>,
    pub by_tag: IndexMap<HostTypeTag, IndexMap<C, Arc<C::Resolver>>>,
}

impl<C: Capability> Default for Registrations<C> {
    fn default() -> Self {
        Self {
            by_name: IndexMap::new(),
            by_tag: IndexMap::new(),
        }
    }
}

impl<C: Capability> Registrations<C> {
    pub fn register_by_name(&mut self, type_name: String, capability: C, resolver: Arc<C::Resolver>) {
        self.by_name
            .entry(type_name)
            .or_default()
            .insert(capability, resolver);
    }

    pub fn register_by_tag(&mut self, tag: HostTypeTag, capability: C, resolver: Arc<C::Resolver>) {
        self.by_tag.entry(tag).or_default().insert(capability, resolver);
    }
}

/// Resolved resolver table of a model, indexed by type name and host tag.
#[derive(Debug)]
pub struct ResolverTable<C: Capability> {
    by_name: HashMap<String, HashMap<C, Arc<C::Resolver>>>,
    by_tag: HashMap<HostTypeTag, HashMap<C, Arc<C::Resolver>>>,
}

impl<C: Capability> Default for ResolverTable<C> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            by_tag: HashMap::new(),
        }
    }
}

impl<C: Capability> Clone for ResolverTable<C> {
    fn clone(&self) -> Self {
        Self {
            by_name: self.by_name.clone(),
            by_tag: self.by_tag.clone(),
        }
    }
}

impl<C: Capability> ResolverTable<C> {
    /// Get the resolver for a capability of the type with the given name.
    pub fn get(&self, type_name: &str, capability: C) -> Option<&Arc<C::Resolver>> {
        self.by_name.get(type_name)?.get(&capability)
    }

    /// Get the resolver for a capability of the type with the given tag.
    pub fn get_by_tag(&self, tag: &HostTypeTag, capability: C) -> Option<&Arc<C::Resolver>> {
        self.by_tag.get(tag)?.get(&capability)
    }

    /// All resolvers registered for the type with the given name.
    pub fn for_type(&self, type_name: &str) -> Option<&HashMap<C, Arc<C::Resolver>>> {
        self.by_name.get(type_name)
    }

    /// All resolvers registered for the type with the given tag.
    pub fn for_tag(&self, tag: &HostTypeTag) -> Option<&HashMap<C, Arc<C::Resolver>>> {
        self.by_tag.get(tag)
    }

    /// Register under the type's name and, when it has one, its tag.
    pub(crate) fn insert(&mut self, ty: &DomainType, capability: C, resolver: Arc<C::Resolver>) {
        if let Some(tag) = ty.tag() {
            self.by_tag
                .entry(tag.clone())
                .or_default()
                .insert(capability, Arc::clone(&resolver));
        }
        self.by_name
            .entry(ty.name().to_string())
            .or_default()
            .insert(capability, resolver);
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.values().all(HashMap::is_empty)
    }
}
