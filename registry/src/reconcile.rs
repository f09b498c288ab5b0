//! Resolver reconciliation and default backfill.
//!
//! Shared by operators and predicates through [`Capability`].

use crate::context::TypeIndex;
use crate::resolver::{Capability, Registrations, ResolverTable};
use crate::{BuildError, DomainType, TypeRef};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::trace;

/// Merge locally registered resolvers over the base model's table.
///
/// Every registration must target an existing type and a capability that
/// type enables; violations are collected into `errors`.
pub(crate) fn reconcile<C: Capability>(
    errors: &mut Vec<BuildError>,
    types: &TypeIndex<'_>,
    base: Option<&ResolverTable<C>>,
    local: &Registrations<C>,
) -> ResolverTable<C> {
    let mut table = base.cloned().unwrap_or_default();

    let targets = local
        .by_name
        .iter()
        .map(|(name, resolvers)| (TypeRef::Name(name.clone()), resolvers))
        .chain(
            local
                .by_tag
                .iter()
                .map(|(tag, resolvers)| (TypeRef::Tag(tag.clone()), resolvers)),
        );

    for (target, resolvers) in targets {
        match types.resolve(&target) {
            Some(ty) => register_all(errors, &mut table, ty, resolvers),
            None => {
                for resolver in resolvers.values() {
                    errors.push(BuildError::UnknownResolverTarget {
                        kind: C::KIND,
                        target: target.clone(),
                        resolver: format!("{:?}", resolver),
                    });
                }
            }
        }
    }

    table
}

fn register_all<C: Capability>(
    errors: &mut Vec<BuildError>,
    table: &mut ResolverTable<C>,
    ty: &DomainType,
    resolvers: &IndexMap<C, Arc<C::Resolver>>,
) {
    let enabled = C::enabled_on(ty);
    for (capability, resolver) in resolvers {
        if enabled.contains(capability) {
            table.insert(ty, *capability, Arc::clone(resolver));
        } else {
            errors.push(BuildError::DisabledCapability {
                kind: C::KIND,
                capability_kind: C::CAPABILITY_KIND,
                capability: capability.to_string(),
                type_name: ty.name().to_string(),
                resolver: format!("{:?}", resolver),
            });
        }
    }
}

/// Install the default resolver for every enabled capability that has none.
pub(crate) fn backfill<C: Capability>(table: &mut ResolverTable<C>, types: &[Arc<DomainType>]) {
    for ty in types {
        for capability in C::enabled_on(ty) {
            if table.get(ty.name(), *capability).is_some() {
                continue;
            }
            trace!(
                kind = C::KIND,
                type_name = ty.name(),
                capability = %capability,
                "installing default type resolver"
            );
            table.insert(ty, *capability, C::default_resolver(ty));
        }
    }
}
