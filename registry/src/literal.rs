//! Literal resolvers.
//!
//! A model may carry one resolver per literal family. Resolvers turn the
//! textual or already-parsed form of a literal into a typed value.

use crate::{DomainModel, DomainType, TypeResolveError};
use chrono::{DateTime, Utc};
use domain_core::TemporalInterval;
use std::fmt;
use std::sync::Arc;

/// Value of a resolved literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, kept in its textual form.
    Numeric(String),
    Boolean(bool),
    String(String),
    Timestamp(DateTime<Utc>),
    Interval(TemporalInterval),
    /// Name of an enum value.
    Enum(String),
    /// Attribute name to attribute value.
    Entity(Vec<(String, ResolvedLiteral)>),
    Collection(Vec<ResolvedLiteral>),
}

/// A literal together with its domain type.
#[derive(Debug, Clone)]
pub struct ResolvedLiteral {
    ty: Arc<DomainType>,
    value: LiteralValue,
}

impl ResolvedLiteral {
    pub fn new(ty: Arc<DomainType>, value: LiteralValue) -> Self {
        Self { ty, value }
    }

    pub fn ty(&self) -> &Arc<DomainType> {
        &self.ty
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    pub fn into_value(self) -> LiteralValue {
        self.value
    }
}

impl PartialEq for ResolvedLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.ty.handle() == other.ty.handle() && self.value == other.value
    }
}

impl fmt::Display for ResolvedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            LiteralValue::Numeric(text) => f.write_str(text),
            LiteralValue::Boolean(value) => write!(f, "{}", value),
            LiteralValue::String(value) => write!(f, "'{}'", value),
            LiteralValue::Timestamp(instant) => write!(f, "{}", instant.to_rfc3339()),
            LiteralValue::Interval(interval) => write!(f, "{}", interval),
            LiteralValue::Enum(value) => write!(f, "{}.{}", self.ty, value),
            LiteralValue::Entity(attributes) => {
                write!(f, "{}(", self.ty)?;
                for (i, (name, value)) in attributes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", name, value)?;
                }
                f.write_str(")")
            }
            LiteralValue::Collection(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
        }
    }
}

pub trait NumericLiteralResolver: fmt::Debug + Send + Sync {
    fn resolve_literal(
        &self,
        model: &DomainModel,
        text: &str,
    ) -> Result<ResolvedLiteral, TypeResolveError>;
}

pub trait BooleanLiteralResolver: fmt::Debug + Send + Sync {
    fn resolve_literal(
        &self,
        model: &DomainModel,
        value: bool,
    ) -> Result<ResolvedLiteral, TypeResolveError>;
}

pub trait StringLiteralResolver: fmt::Debug + Send + Sync {
    fn resolve_literal(
        &self,
        model: &DomainModel,
        value: &str,
    ) -> Result<ResolvedLiteral, TypeResolveError>;
}

pub trait TemporalLiteralResolver: fmt::Debug + Send + Sync {
    fn resolve_timestamp_literal(
        &self,
        model: &DomainModel,
        value: DateTime<Utc>,
    ) -> Result<ResolvedLiteral, TypeResolveError>;

    fn resolve_interval_literal(
        &self,
        model: &DomainModel,
        value: &TemporalInterval,
    ) -> Result<ResolvedLiteral, TypeResolveError>;
}

pub trait EnumLiteralResolver: fmt::Debug + Send + Sync {
    fn resolve_literal(
        &self,
        model: &DomainModel,
        enum_type: &Arc<DomainType>,
        value: &str,
    ) -> Result<ResolvedLiteral, TypeResolveError>;
}

pub trait EntityLiteralResolver: fmt::Debug + Send + Sync {
    fn resolve_literal(
        &self,
        model: &DomainModel,
        entity_type: &Arc<DomainType>,
        attributes: Vec<(String, ResolvedLiteral)>,
    ) -> Result<ResolvedLiteral, TypeResolveError>;
}

pub trait CollectionLiteralResolver: fmt::Debug + Send + Sync {
    fn resolve_literal(
        &self,
        model: &DomainModel,
        elements: Vec<ResolvedLiteral>,
    ) -> Result<ResolvedLiteral, TypeResolveError>;
}

/// The literal resolvers of a builder or model. Unset families are `None`.
#[derive(Debug, Clone, Default)]
pub struct LiteralResolvers {
    pub numeric: Option<Arc<dyn NumericLiteralResolver>>,
    pub boolean: Option<Arc<dyn BooleanLiteralResolver>>,
    pub string: Option<Arc<dyn StringLiteralResolver>>,
    pub temporal: Option<Arc<dyn TemporalLiteralResolver>>,
    pub enumeration: Option<Arc<dyn EnumLiteralResolver>>,
    pub entity: Option<Arc<dyn EntityLiteralResolver>>,
    pub collection: Option<Arc<dyn CollectionLiteralResolver>>,
}
