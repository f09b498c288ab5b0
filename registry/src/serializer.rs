//! Model serializers.
//!
//! A serializer is asked for a target Rust type and a format name and may
//! decline by returning `None`. The model tries its serializers in
//! registration order.

use crate::{DomainFunction, DomainModel, DomainType, SerializeError, TypeShape};
use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Free-form serializer properties.
pub type SerializerProperties = serde_json::Map<String, Value>;

/// Output of a serializer before it is downcast to the requested target.
pub type SerializedModel = Box<dyn Any + Send>;

pub trait DomainSerializer: fmt::Debug + Send + Sync {
    /// Serialize `model` into a value of the type identified by `target`.
    ///
    /// Returns `None` when the serializer does not handle this combination
    /// of target and format.
    fn serialize(
        &self,
        model: &DomainModel,
        target: TypeId,
        format: &str,
        properties: &SerializerProperties,
    ) -> Option<Result<SerializedModel, SerializeError>>;
}

/// Serializes a model to JSON, either as a `String` or a `serde_json::Value`.
///
/// Understands the format `"json"` and the boolean property `"pretty"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelSerializer;

pub const JSON_FORMAT: &str = "json";

impl JsonModelSerializer {
    /// Render the model as a JSON value.
    pub fn to_value(model: &DomainModel) -> Result<Value, SerializeError> {
        let document = ModelDocument {
            types: model.types().map(TypeDocument::new).collect(),
            funcs: model
                .functions()
                .map(|function| FunctionDocument::new(model, function))
                .collect(),
        };
        Ok(serde_json::to_value(document)?)
    }
}

impl DomainSerializer for JsonModelSerializer {
    fn serialize(
        &self,
        model: &DomainModel,
        target: TypeId,
        format: &str,
        properties: &SerializerProperties,
    ) -> Option<Result<SerializedModel, SerializeError>> {
        if format != JSON_FORMAT {
            return None;
        }
        if target == TypeId::of::<Value>() {
            return Some(Self::to_value(model).map(|value| Box::new(value) as SerializedModel));
        }
        if target != TypeId::of::<String>() {
            return None;
        }

        let pretty = match properties.get("pretty") {
            None => false,
            Some(Value::Bool(pretty)) => *pretty,
            Some(other) => {
                return Some(Err(SerializeError::InvalidProperty {
                    name: "pretty".to_string(),
                    reason: format!("expected a boolean, got {}", other),
                }))
            }
        };
        let rendered = Self::to_value(model).and_then(|value| {
            let text = if pretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            Ok(Box::new(text) as SerializedModel)
        });
        Some(rendered)
    }
}

#[derive(Serialize)]
struct ModelDocument<'a> {
    types: Vec<TypeDocument<'a>>,
    funcs: Vec<FunctionDocument<'a>>,
}

#[derive(Serialize)]
struct TypeDocument<'a> {
    name: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ops: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    preds: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attrs: Vec<MemberDocument<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vals: Vec<MemberDocument<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc: Option<&'a str>,
}

impl<'a> TypeDocument<'a> {
    fn new(ty: &'a Arc<DomainType>) -> Self {
        let (kind, attrs, vals) = match ty.shape() {
            TypeShape::Basic => ("B", Vec::new(), Vec::new()),
            TypeShape::Entity { .. } => {
                let attrs = ty
                    .attributes()
                    .map(|attr| MemberDocument {
                        name: attr.name(),
                        ty: Some(
                            attr.element_type_name()
                                .unwrap_or_else(|| attr.type_name()),
                        ),
                        collection: attr.is_collection(),
                        doc: attr.metadata().documentation(),
                    })
                    .collect();
                ("E", attrs, Vec::new())
            }
            TypeShape::Enum { .. } => {
                let vals = ty
                    .enum_values()
                    .map(|value| MemberDocument {
                        name: value.name(),
                        ty: None,
                        collection: false,
                        doc: value.metadata().documentation(),
                    })
                    .collect();
                ("N", Vec::new(), vals)
            }
            TypeShape::Collection { .. } => ("C", Vec::new(), Vec::new()),
        };
        Self {
            name: ty.name(),
            kind,
            ops: ty
                .enabled_operators()
                .iter()
                .map(|op| op.code().to_string())
                .collect(),
            preds: ty
                .enabled_predicates()
                .iter()
                .map(|pred| pred.code().to_string())
                .collect(),
            attrs,
            vals,
            doc: ty.metadata().documentation(),
        }
    }
}

#[derive(Serialize)]
struct MemberDocument<'a> {
    name: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionDocument<'a> {
    name: &'a str,
    args: Vec<ArgumentDocument<'a>>,
    min_arg_count: usize,
    /// -1 for variadic functions.
    arg_count: i64,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    result_type: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    collection: bool,
    volatility: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc: Option<&'a str>,
}

impl<'a> FunctionDocument<'a> {
    fn new(model: &'a DomainModel, function: &'a DomainFunction) -> Self {
        Self {
            name: function.name(),
            args: function
                .arguments()
                .iter()
                .map(|arg| ArgumentDocument {
                    name: arg.name(),
                    ty: arg.ty().and_then(|handle| model.element_or_self_name(handle)),
                    collection: arg.is_collection(),
                    doc: arg.metadata().documentation(),
                })
                .collect(),
            min_arg_count: function.min_argument_count(),
            arg_count: function
                .argument_count()
                .map_or(-1, |count| count as i64),
            result_type: function
                .result_type()
                .and_then(|handle| model.element_or_self_name(handle)),
            collection: function.is_result_collection(),
            volatility: function.volatility().to_string(),
            doc: function.metadata().documentation(),
        }
    }
}

#[derive(Serialize)]
struct ArgumentDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    ty: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    collection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc: Option<&'a str>,
}
