//! Building standalone models: types, entities, enums, collections and
//! functions over the standard universe.

use domain_registry::{ArgumentDefinition, Volatility};
use domain_tests::prelude::*;

mod end_to_end {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("end_to_end")
            .declare(|b| {
                b.create_basic_type("Integer")
                    .tag(HostTypeTag::of::<i64>())
                    .operators([DomainOperator::Plus])
                    .done()
                    .create_basic_type("Boolean")
                    .tag(HostTypeTag::of::<bool>())
                    .done()
                    .create_entity_type("Person")
                    .attribute("age", "Integer")
                    .done();
                b.create_function("MAX")
                    .argument(ArgumentDefinition::named("values").of_type("Integer").collection())?
                    .result_type("Integer")
                    .done();
                Ok(())
            })
            .step("types_registered", |a| {
                a.kind("Integer", TypeKind::Basic)
                    .kind("Person", TypeKind::Entity)
                    .tagged("Integer", HostTypeTag::of::<i64>().as_str())
            })
            .step("attribute_resolved", |a| a.attribute("Person", "age", "Integer"))
            .step("function_resolved", |a| {
                a.returns("MAX", "Integer").signature("MAX", "MAX(values)")
            })
            .step("default_plus_resolver", |a| {
                a.operation("Integer", DomainOperator::Plus, "Integer")
            })
            .step("operators_not_enabled", |a| {
                a.unsupported("Integer", DomainOperator::Minus)
            })
    }

    #[test]
    fn test_integer_person_max_plus() {
        scenario().run().unwrap();
    }

    #[test]
    fn test_max_argument_is_collection_of_integer() {
        let model = scenario().model().unwrap();
        let integer = model.get_type("Integer").unwrap();
        let collection = model.get_collection_type(integer).unwrap();

        let max = model.get_function("MAX").unwrap();
        let values = max.argument("values").unwrap();
        assert!(values.is_collection());
        assert_eq!(values.ty(), Some(collection.handle()));
        assert_eq!(collection.to_string(), "Collection[Integer]");
    }
}

mod default_resolvers {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("default_resolvers")
            .standard_universe()
            .step("operators_resolve_to_own_type", |a| {
                a.operation("Integer", DomainOperator::Plus, "Integer")
                    .operation("Integer", DomainOperator::UnaryMinus, "Integer")
                    .operation("Decimal", DomainOperator::Division, "Decimal")
                    .operation("String", DomainOperator::Plus, "String")
                    .operation("Boolean", DomainOperator::Not, "Boolean")
            })
            .step("predicates_resolve_to_boolean", |a| {
                a.predicate("Integer", DomainPredicate::Relational, "Boolean")
                    .predicate("String", DomainPredicate::Equality, "Boolean")
                    .predicate("Interval", DomainPredicate::Nullness, "Boolean")
            })
            .step("disabled_operators_unsupported", |a| {
                a.unsupported("Boolean", DomainOperator::Plus)
                    .unsupported("String", DomainOperator::Multiplication)
            })
    }

    #[test]
    fn test_enabled_capabilities_get_default_resolvers() {
        scenario().run().unwrap();
    }
}

mod entities_and_enums {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("entities_and_enums")
            .standard_universe()
            .declare(|b| {
                b.create_enum_type("Status")
                    .value("ACTIVE")
                    .value("SUSPENDED")
                    .value("CLOSED")
                    .predicates(DomainPredicate::DISTINGUISHABLE)
                    .done()
                    .create_entity_type("Address")
                    .attribute("street", "String")
                    .attribute("city", "String")
                    .done()
                    .create_entity_type("Customer")
                    .attribute("name", "String")
                    .attribute("status", "Status")
                    .attribute("address", "Address")
                    .collection_attribute("aliases", "String")
                    .done();
                Ok(())
            })
            .step("enum_values_in_order", |a| {
                a.kind("Status", TypeKind::Enum)
                    .enum_values("Status", ["ACTIVE", "SUSPENDED", "CLOSED"])
                    .predicate("Status", DomainPredicate::Equality, "Boolean")
            })
            .step("nested_entities", |a| {
                a.attribute("Customer", "address", "Address")
                    .attribute("Customer", "status", "Status")
                    .attribute_count("Customer", 4)
            })
            .step("collection_attribute", |a| {
                a.attribute("Customer", "aliases", "Collection[String]")
            })
    }

    #[test]
    fn test_entities_reference_enums_and_entities() {
        scenario().run().unwrap();
    }
}

mod self_referencing_entities {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("self_referencing_entities")
            .standard_universe()
            .declare(|b| {
                b.create_entity_type("Employee")
                    .attribute("name", "String")
                    .attribute("manager", "Employee")
                    .attribute("department", "Department")
                    .done()
                    .create_entity_type("Department")
                    .attribute("head", "Employee")
                    .collection_attribute("staff", "Employee")
                    .done();
                Ok(())
            })
            .step("cycles_resolve", |a| {
                a.attribute("Employee", "manager", "Employee")
                    .attribute("Employee", "department", "Department")
                    .attribute("Department", "head", "Employee")
                    .attribute("Department", "staff", "Collection[Employee]")
            })
    }

    #[test]
    fn test_mutually_referencing_entities_build() {
        scenario().run().unwrap();
    }

    #[test]
    fn test_cycle_points_at_the_same_type() {
        let model = scenario().model().unwrap();
        let employee = model.get_type("Employee").unwrap();
        let manager = employee.attribute("manager").unwrap();

        assert_eq!(manager.ty(), employee.handle());
        let department = model.type_at(employee.attribute("department").unwrap().ty()).unwrap();
        assert_eq!(department.attribute("head").unwrap().ty(), employee.handle());
    }
}

mod collection_singletons {
    use super::*;
    use std::sync::Arc;

    pub fn scenario() -> Scenario {
        Scenario::new("collection_singletons")
            .standard_universe()
            .declare(|b| {
                b.create_entity_type("Person")
                    .collection_attribute("nicknames", "String")
                    .done()
                    .create_entity_type("Pet")
                    .collection_attribute("tricks", "String")
                    .done();
                b.create_function("JOIN")
                    .argument(ArgumentDefinition::named("parts").of_type("String").collection())?
                    .result_type("String")
                    .done();
                Ok(())
            })
    }

    #[test]
    fn test_collection_of_string_is_shared() {
        let model = scenario().model().unwrap();
        let string = model.get_type("String").unwrap();
        let collection = model.get_collection_type(string).unwrap();

        let nicknames = model.get_type("Person").unwrap().attribute("nicknames").unwrap();
        let tricks = model.get_type("Pet").unwrap().attribute("tricks").unwrap();
        let parts = model.get_function("JOIN").unwrap().argument("parts").unwrap();

        assert_eq!(nicknames.ty(), collection.handle());
        assert_eq!(tricks.ty(), collection.handle());
        assert_eq!(parts.ty(), Some(collection.handle()));
        assert!(Arc::ptr_eq(
            model.type_at(nicknames.ty()).unwrap(),
            model.type_at(tricks.ty()).unwrap()
        ));
        assert_eq!(collection.kind(), TypeKind::Collection);
        assert_eq!(collection.element_type(), Some(string.handle()));
    }
}

mod case_sensitivity {
    use super::*;

    pub fn sensitive() -> Scenario {
        Scenario::new("case_sensitive_entity")
            .standard_universe()
            .declare(|b| {
                b.create_entity_type("Person")
                    .attribute("Name", "String")
                    .attribute("name", "String")
                    .done();
                Ok(())
            })
            .step("both_attributes_coexist", |a| {
                a.attribute("Person", "Name", "String")
                    .attribute("Person", "name", "String")
                    .attribute_count("Person", 2)
            })
    }

    pub fn insensitive() -> Scenario {
        Scenario::new("case_insensitive_entity")
            .standard_universe()
            .declare(|b| {
                b.create_entity_type("Person")
                    .case_sensitive(false)
                    .attribute("Name", "String")
                    .attribute("name", "String")
                    .done();
                Ok(())
            })
            .step("duplicate_rejected", |a| {
                a.errors(1)
                    .error("Duplicate attribute definition due to case insensitivity in entity 'Person'")
            })
    }

    pub fn insensitive_lookup() -> Scenario {
        Scenario::new("case_insensitive_lookup")
            .standard_universe()
            .declare(|b| {
                b.create_entity_type("Person")
                    .case_sensitive(false)
                    .attribute("FirstName", "String")
                    .done()
                    .create_enum_type("Color")
                    .case_sensitive(false)
                    .value("Red")
                    .done();
                Ok(())
            })
            .step("folded_lookup", |a| a.attribute("Person", "firstname", "String"))
    }

    #[test]
    fn test_case_sensitive_entity_keeps_both() {
        sensitive().run().unwrap();
    }

    #[test]
    fn test_case_insensitive_entity_rejects_duplicates() {
        insensitive().run().unwrap();
    }

    #[test]
    fn test_case_insensitive_lookup_folds() {
        insensitive_lookup().run().unwrap();

        let model = insensitive_lookup().model().unwrap();
        let color = model.get_enum_type("Color").unwrap();
        assert_eq!(color.enum_value("RED").unwrap().name(), "Red");
    }
}

mod functions {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("functions")
            .standard_universe()
            .declare(|b| {
                b.create_function("SUBSTRING")
                    .positional_argument("String")?
                    .positional_argument("Integer")?
                    .positional_argument("Integer")?
                    .min_argument_count(2)
                    .result_type("String")
                    .volatility(Volatility::Immutable)
                    .done();
                b.create_function("CONCAT")
                    .named_argument("first", "String")?
                    .variadic()
                    .result_type("String")
                    .done();
                b.create_function("NOW")
                    .result_type("Timestamp")
                    .done();
                b.create_function("SIZE")
                    .argument(ArgumentDefinition::named("items").collection())?
                    .result_type("Integer")
                    .done();
                b.create_function("DEBUG")
                    .argument(ArgumentDefinition::named("value"))?
                    .done();
                Ok(())
            })
            .step("signatures", |a| {
                a.signature("SUBSTRING", "SUBSTRING(argument1, argument2, argument3)")
                    .signature("CONCAT", "CONCAT(first, ...)")
                    .signature("NOW", "NOW()")
            })
            .step("results", |a| {
                a.returns("SUBSTRING", "String")
                    .returns("NOW", "Timestamp")
                    .returns("SIZE", "Integer")
                    .untyped_result("DEBUG")
            })
    }

    #[test]
    fn test_function_declarations() {
        scenario().run().unwrap();
    }

    #[test]
    fn test_function_arity() {
        let model = scenario().model().unwrap();

        let substring = model.get_function("SUBSTRING").unwrap();
        assert_eq!(substring.min_argument_count(), 2);
        assert_eq!(substring.argument_count(), Some(3));
        assert_eq!(substring.volatility(), Volatility::Immutable);
        assert!(substring.accepts_argument_count(2));
        assert!(!substring.accepts_argument_count(4));

        let concat = model.get_function("CONCAT").unwrap();
        assert!(concat.is_variadic());
        assert_eq!(concat.argument_count(), None);
        assert!(concat.accepts_argument_count(7));
        assert_eq!(concat.volatility(), Volatility::Volatile);

        let size = model.get_function("SIZE").unwrap();
        let items = size.argument("items").unwrap();
        assert!(items.is_collection());
        assert_eq!(items.ty(), None);
    }

    #[test]
    fn test_mixed_arguments_fail_before_build() {
        let scenario = Scenario::new("mixed_arguments").standard_universe().declare(|b| {
            b.create_function("F")
                .named_argument("a", "Integer")?
                .positional_argument("Integer")?
                .done();
            Ok(())
        });

        let err = scenario.run().unwrap_err();
        assert_eq!(
            err.to_string(),
            "declaration rejected in scenario 'mixed_arguments': \
             Can't mix positional and named parameters in function 'F'"
        );
    }
}
