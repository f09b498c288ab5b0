//! Stock type resolvers.
//!
//! Each resolver is a small value type that can be registered for
//! operators, predicates or functions where the contract fits.

use crate::{
    DomainFunction, DomainModel, DomainType, FunctionTypeResolver, OperationTypeResolver,
    PredicateTypeResolver, TypeRef, TypeResolveError,
};
use domain_core::HostTypeTag;
use std::sync::Arc;

/// Check argument types against a function's declared arguments.
///
/// Untyped arguments accept anything. Arguments declared as "any collection"
/// accept every collection type. Arguments beyond the declared list are
/// not checked.
pub fn validate_argument_types(
    function: &DomainFunction,
    argument_types: &[Arc<DomainType>],
) -> Result<(), TypeResolveError> {
    if !function.accepts_argument_count(argument_types.len()) {
        let expected = match function.argument_count() {
            Some(max) if max == function.min_argument_count() => max.to_string(),
            Some(max) => format!("{} to {}", function.min_argument_count(), max),
            None => format!("at least {}", function.min_argument_count()),
        };
        return Err(TypeResolveError::ArgumentCount {
            function: function.name().to_string(),
            expected,
            actual: argument_types.len(),
        });
    }

    for (argument, actual) in function.arguments().iter().zip(argument_types) {
        let compatible = match argument.ty() {
            Some(expected) => expected == actual.handle(),
            None if argument.is_collection() => actual.is_collection(),
            None => true,
        };
        if !compatible {
            let expected = match argument.type_name() {
                Some(name) => name.to_string(),
                None => crate::COLLECTION_TYPE_NAME.to_string(),
            };
            return Err(TypeResolveError::ArgumentTypeMismatch {
                function: function.name().to_string(),
                argument: argument.to_string(),
                expected,
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}

fn lookup(model: &DomainModel, target: &TypeRef) -> Result<Arc<DomainType>, TypeResolveError> {
    model
        .resolve_type_ref(target)
        .cloned()
        .ok_or_else(|| TypeResolveError::UnknownType(target.to_string()))
}

/// Always resolves to one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTypeResolver {
    target: TypeRef,
}

impl FixedTypeResolver {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            target: TypeRef::Name(type_name.into()),
        }
    }

    pub fn by_tag(tag: impl Into<HostTypeTag>) -> Self {
        Self {
            target: TypeRef::Tag(tag.into()),
        }
    }

    pub fn target(&self) -> &TypeRef {
        &self.target
    }
}

impl OperationTypeResolver for FixedTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        _operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        lookup(model, &self.target)
    }
}

impl PredicateTypeResolver for FixedTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        _operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        lookup(model, &self.target)
    }
}

impl FunctionTypeResolver for FixedTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        function: &DomainFunction,
        argument_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        validate_argument_types(function, argument_types)?;
        lookup(model, &self.target)
    }
}

/// Resolves to a fixed type when every operand has one of the supported
/// types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedTypeResolver {
    result: TypeRef,
    supported: Vec<String>,
}

impl RestrictedTypeResolver {
    pub fn new<I, S>(result: impl Into<TypeRef>, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            result: result.into(),
            supported: supported.into_iter().map(Into::into).collect(),
        }
    }

    fn resolve(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        for (index, operand) in operand_types.iter().enumerate() {
            check_supported(index, operand, &self.supported)?;
        }
        lookup(model, &self.result)
    }
}

impl OperationTypeResolver for RestrictedTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        self.resolve(model, operand_types)
    }
}

impl PredicateTypeResolver for RestrictedTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        self.resolve(model, operand_types)
    }
}

/// Like [`RestrictedTypeResolver`] with a separate allow-list per operand
/// position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandRestrictedTypeResolver {
    result: TypeRef,
    supported_per_operand: Vec<Vec<String>>,
}

impl OperandRestrictedTypeResolver {
    pub fn new(result: impl Into<TypeRef>, supported_per_operand: Vec<Vec<String>>) -> Self {
        Self {
            result: result.into(),
            supported_per_operand,
        }
    }

    fn resolve(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        for (index, operand) in operand_types.iter().enumerate() {
            let supported = self
                .supported_per_operand
                .get(index)
                .map(Vec::as_slice)
                .unwrap_or_default();
            check_supported(index, operand, supported)?;
        }
        lookup(model, &self.result)
    }
}

impl OperationTypeResolver for OperandRestrictedTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        self.resolve(model, operand_types)
    }
}

impl PredicateTypeResolver for OperandRestrictedTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        self.resolve(model, operand_types)
    }
}

fn check_supported(
    index: usize,
    operand: &DomainType,
    supported: &[String],
) -> Result<(), TypeResolveError> {
    if supported.iter().any(|name| name == operand.name()) {
        Ok(())
    } else {
        Err(TypeResolveError::UnsupportedOperand {
            index,
            actual: operand.to_string(),
            expected: supported.to_vec(),
        })
    }
}

/// Resolves to the widest operand type according to a precedence list,
/// ordered from widest to narrowest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidestTypeResolver {
    precedence: Vec<String>,
}

impl WidestTypeResolver {
    pub fn new<I, S>(precedence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            precedence: precedence.into_iter().map(Into::into).collect(),
        }
    }

    fn resolve(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        let mut widest = None;
        for (index, operand) in operand_types.iter().enumerate() {
            let position = self
                .precedence
                .iter()
                .position(|name| name == operand.name())
                .ok_or_else(|| TypeResolveError::UnsupportedOperand {
                    index,
                    actual: operand.to_string(),
                    expected: self.precedence.clone(),
                })?;
            widest = Some(widest.map_or(position, |current: usize| current.min(position)));
        }

        // No operands: the widest type of the list.
        let name = self
            .precedence
            .get(widest.unwrap_or(0))
            .ok_or_else(|| TypeResolveError::NoCommonType(Vec::new()))?;
        lookup(model, &TypeRef::Name(name.clone()))
    }
}

impl OperationTypeResolver for WidestTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        operand_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        self.resolve(model, operand_types)
    }
}

impl FunctionTypeResolver for WidestTypeResolver {
    fn resolve_type(
        &self,
        model: &DomainModel,
        function: &DomainFunction,
        argument_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        validate_argument_types(function, argument_types)?;
        self.resolve(model, argument_types)
    }
}

/// Resolves a function to the type of its first argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstArgumentTypeResolver;

impl FunctionTypeResolver for FirstArgumentTypeResolver {
    fn resolve_type(
        &self,
        _model: &DomainModel,
        function: &DomainFunction,
        argument_types: &[Arc<DomainType>],
    ) -> Result<Arc<DomainType>, TypeResolveError> {
        validate_argument_types(function, argument_types)?;
        argument_types
            .first()
            .cloned()
            .ok_or(TypeResolveError::MissingOperand {
                expected: 1,
                actual: 0,
            })
    }
}
