//! Evaluation-time resolution: stock resolvers, function results,
//! literals and serialization of a built model.

use chrono::{TimeZone, Utc};
use domain_core::{Documentation, TemporalInterval};
use domain_registry::{
    ArgumentDefinition, FirstArgumentTypeResolver, FixedTypeResolver, JsonModelSerializer,
    LiteralValue, OperandRestrictedTypeResolver, RestrictedTypeResolver, SerializerProperties,
    TypeResolveError, WidestTypeResolver, JSON_FORMAT,
};
use domain_tests::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn types(model: &DomainModel, names: &[&str]) -> Vec<Arc<domain_registry::DomainType>> {
    names
        .iter()
        .map(|name| Arc::clone(model.get_type(name).unwrap()))
        .collect()
}

mod numeric_promotion {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("numeric_promotion")
            .standard_universe()
            .declare(|b| {
                for name in ["Integer", "Decimal"] {
                    for operator in [
                        DomainOperator::Plus,
                        DomainOperator::Minus,
                        DomainOperator::Multiplication,
                    ] {
                        b.with_operation_type_resolver(
                            name,
                            operator,
                            WidestTypeResolver::new(["Decimal", "Integer"]),
                        );
                    }
                }
                b.with_operation_type_resolver(
                    HostTypeTag::of::<i64>(),
                    DomainOperator::Division,
                    FixedTypeResolver::new("Decimal"),
                );
                b.with_predicate_type_resolver(
                    "Integer",
                    DomainPredicate::Relational,
                    RestrictedTypeResolver::new("Boolean", ["Integer", "Decimal"]),
                );
                Ok(())
            })
            .step("same_type_operands", |a| {
                a.operation("Integer", DomainOperator::Plus, "Integer")
                    .operation("Decimal", DomainOperator::Multiplication, "Decimal")
            })
            .step("division_by_tag", |a| {
                a.operation("Integer", DomainOperator::Division, "Decimal")
            })
            .step("untouched_defaults", |a| {
                a.operation("Integer", DomainOperator::Modulo, "Integer")
                    .predicate("Decimal", DomainPredicate::Relational, "Boolean")
            })
    }

    #[test]
    fn test_stock_operation_resolvers() {
        scenario().run().unwrap();
    }

    #[test]
    fn test_mixed_operands_promote() {
        let model = scenario().model().unwrap();

        let sum = model
            .resolve_operation_type(DomainOperator::Plus, &types(&model, &["Integer", "Decimal"]))
            .unwrap();
        let comparison = model
            .resolve_predicate_type(
                DomainPredicate::Relational,
                &types(&model, &["Integer", "Decimal"]),
            )
            .unwrap();
        let rejected = model.resolve_predicate_type(
            DomainPredicate::Relational,
            &types(&model, &["Integer", "String"]),
        );

        assert_eq!(sum.name(), "Decimal");
        assert_eq!(comparison.name(), "Boolean");
        assert_eq!(
            rejected.unwrap_err(),
            TypeResolveError::UnsupportedOperand {
                index: 1,
                actual: "String".to_string(),
                expected: vec!["Integer".to_string(), "Decimal".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_operand() {
        let model = scenario().model().unwrap();

        let result = model.resolve_operation_type(DomainOperator::Plus, &[]);

        assert!(matches!(
            result,
            Err(TypeResolveError::MissingOperand { expected: 1, actual: 0 })
        ));
    }
}

mod temporal_arithmetic {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("temporal_arithmetic")
            .standard_universe()
            .declare(|b| {
                b.with_operation_type_resolver(
                    "Timestamp",
                    DomainOperator::Plus,
                    OperandRestrictedTypeResolver::new(
                        "Timestamp",
                        vec![vec!["Timestamp".to_string()], vec!["Interval".to_string()]],
                    ),
                )
                .with_operation_type_resolver(
                    "Interval",
                    DomainOperator::Plus,
                    RestrictedTypeResolver::new("Interval", ["Interval"]),
                );
                StandardLiterals::install(b);
                Ok(())
            })
    }

    #[test]
    fn test_timestamp_plus_interval() {
        let model = scenario().model().unwrap();

        let shifted = model
            .resolve_operation_type(
                DomainOperator::Plus,
                &types(&model, &["Timestamp", "Interval"]),
            )
            .unwrap();
        let doubled = model.resolve_operation_type(
            DomainOperator::Plus,
            &types(&model, &["Timestamp", "Timestamp"]),
        );

        assert_eq!(shifted.name(), "Timestamp");
        assert!(matches!(
            doubled,
            Err(TypeResolveError::UnsupportedOperand { index: 1, .. })
        ));
    }

    #[test]
    fn test_temporal_literals() {
        let model = scenario().model().unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let interval = TemporalInterval::new(0, 1, 2, 0, 0, 0).unwrap();

        let timestamp = model.resolve_timestamp_literal(instant).unwrap().unwrap();
        let period = model.resolve_interval_literal(&interval).unwrap().unwrap();

        assert_eq!(timestamp.ty().name(), "Timestamp");
        assert_eq!(period.ty().name(), "Interval");
        assert_eq!(period.to_string(), "1 MONTHS 2 DAYS 0 SECONDS");

        // Month arithmetic clamps to the end of February in a leap year.
        let LiteralValue::Interval(value) = period.value() else {
            panic!("expected an interval literal");
        };
        assert_eq!(
            value.add_to(instant).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap()
        );
        let shifted = value.add_to(instant).unwrap();
        assert_eq!(value.subtract_from(shifted).unwrap(), instant);
    }
}

mod function_resolution {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("function_resolution")
            .standard_universe()
            .declare(|b| {
                b.create_function("LENGTH")
                    .named_argument("text", "String")?
                    .result_type("Integer")
                    .done();
                b.create_function("GREATEST")
                    .min_argument_count(1)
                    .variadic()
                    .done();
                b.create_function("COALESCE")
                    .min_argument_count(1)
                    .variadic()
                    .done();
                b.create_function("COUNT")
                    .argument(ArgumentDefinition::named("items").collection())?
                    .result_type("Integer")
                    .done();
                b.create_function("ROUND")
                    .named_argument("value", "Decimal")?
                    .done();
                b.with_function_type_resolver(
                    "GREATEST",
                    WidestTypeResolver::new(["Decimal", "Integer"]),
                )
                .with_function_type_resolver("COALESCE", FirstArgumentTypeResolver)
                .with_function_type_resolver("ROUND", FixedTypeResolver::new("Integer"));
                Ok(())
            })
            .step("declared_results", |a| {
                a.returns("LENGTH", "Integer")
                    .returns("COUNT", "Integer")
                    .untyped_result("GREATEST")
            })
    }

    #[test]
    fn test_declared_functions() {
        scenario().run().unwrap();
    }

    #[test]
    fn test_declared_result_type_after_validation() {
        let model = scenario().model().unwrap();

        let length = model
            .resolve_function_type("LENGTH", &types(&model, &["String"]))
            .unwrap();
        let mismatch = model.resolve_function_type("LENGTH", &types(&model, &["Integer"]));
        let unknown = model.resolve_function_type("REVERSE", &[]);

        assert_eq!(length.unwrap().name(), "Integer");
        assert!(matches!(
            mismatch,
            Err(TypeResolveError::ArgumentTypeMismatch { ref argument, .. }) if argument == "text"
        ));
        assert_eq!(
            unknown.unwrap_err(),
            TypeResolveError::UnknownFunction("REVERSE".to_string())
        );
    }

    #[test]
    fn test_registered_function_resolvers() {
        let model = scenario().model().unwrap();

        let greatest = model
            .resolve_function_type("GREATEST", &types(&model, &["Integer", "Decimal", "Integer"]))
            .unwrap();
        let coalesce = model
            .resolve_function_type("COALESCE", &types(&model, &["String", "String"]))
            .unwrap();
        let round = model
            .resolve_function_type("ROUND", &types(&model, &["Decimal"]))
            .unwrap();
        let round_wrong = model.resolve_function_type("ROUND", &types(&model, &["String"]));

        assert_eq!(greatest.unwrap().name(), "Decimal");
        assert_eq!(coalesce.unwrap().name(), "String");
        assert_eq!(round.unwrap().name(), "Integer");
        assert!(round_wrong.is_err());
    }

    #[test]
    fn test_any_collection_argument() {
        let model = scenario().model().unwrap();
        let string = model.get_type("String").unwrap();
        let strings = Arc::clone(model.get_collection_type(string).unwrap());

        let count = model.resolve_function_type("COUNT", &[strings]).unwrap();
        let scalar = model.resolve_function_type("COUNT", &types(&model, &["String"]));

        assert_eq!(count.unwrap().name(), "Integer");
        assert!(scalar.is_err());
    }
}

mod literals {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("literals").standard_universe().declare(|b| {
            StandardLiterals::install(b);
            Ok(())
        })
    }

    #[test]
    fn test_literal_forwarding() {
        let model = scenario().model().unwrap();

        let number = model.resolve_numeric_literal("12").unwrap().unwrap();
        let flag = model.resolve_boolean_literal(true).unwrap().unwrap();
        let text = model.resolve_string_literal("hello").unwrap().unwrap();

        assert_eq!(number.ty().name(), "Integer");
        assert_eq!(flag.ty().name(), "Boolean");
        assert_eq!(text.value(), &LiteralValue::String("hello".to_string()));
    }

    #[test]
    fn test_missing_literal_resolvers_are_none() {
        let model = scenario().model().unwrap();
        let status = Arc::clone(model.get_type("Integer").unwrap());

        assert!(model.resolve_enum_literal(&status, "ACTIVE").is_none());
        assert!(model.resolve_entity_literal(&status, Vec::new()).is_none());
        assert!(model.resolve_collection_literal(Vec::new()).is_none());
    }
}

mod json_export {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("json_export").declare(|b| {
            b.create_basic_type("Integer")
                .operators([DomainOperator::Plus])
                .predicates([DomainPredicate::Equality])
                .done()
                .create_enum_type("Status")
                .value("OPEN")
                .done()
                .create_entity_type("Ticket")
                .attribute("priority", "Integer")
                .collection_attribute("watchers", "Integer")
                .metadata(Documentation::new("A support ticket"))
                .done();
            b.create_function("MAX")
                .named_argument("values", "Integer")?
                .variadic()
                .result_type("Integer")
                .done();
            b.with_serializer(JsonModelSerializer);
            Ok(())
        })
    }

    #[test]
    fn test_json_value_export() {
        let model = scenario().model().unwrap();

        let value: Value = model
            .serialize(JSON_FORMAT, &SerializerProperties::new())
            .unwrap()
            .unwrap();

        assert_eq!(
            value["types"],
            json!([
                {"name": "Integer", "kind": "B", "ops": ["+"], "preds": ["E"]},
                {"name": "Status", "kind": "N", "vals": [{"name": "OPEN"}]},
                {
                    "name": "Ticket",
                    "kind": "E",
                    "attrs": [
                        {"name": "priority", "type": "Integer"},
                        {"name": "watchers", "type": "Integer", "collection": true}
                    ],
                    "doc": "A support ticket"
                }
            ])
        );
        assert_eq!(value["funcs"][0]["name"], json!("MAX"));
        assert_eq!(value["funcs"][0]["argCount"], json!(-1));
        assert_eq!(value["funcs"][0]["volatility"], json!("VOLATILE"));
    }

    #[test]
    fn test_json_operator_codes() {
        let scenario = Scenario::new("operator_codes").declare(|b| {
            b.create_basic_type("Decimal")
                .operators([
                    DomainOperator::Modulo,
                    DomainOperator::Plus,
                    DomainOperator::UnaryMinus,
                    DomainOperator::UnaryPlus,
                ])
                .predicates(DomainPredicate::COMPARABLE)
                .done();
            Ok(())
        });
        let model = scenario.model().unwrap();

        let value = JsonModelSerializer::to_value(&model).unwrap();

        // Unary operators get letter codes, binary ones their symbol.
        assert_eq!(value["types"][0]["ops"], json!(["P", "M", "+", "%"]));
    }

    #[test]
    fn test_json_string_export() {
        let model = scenario().model().unwrap();
        let mut properties = SerializerProperties::new();
        properties.insert("pretty".to_string(), json!(true));

        let text: String = model.serialize(JSON_FORMAT, &properties).unwrap().unwrap();
        let unknown: Option<String> = model.serialize("xml", &properties).unwrap();

        assert!(text.contains('\n'));
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            JsonModelSerializer::to_value(&model).unwrap()
        );
        assert!(unknown.is_none());
    }
}
