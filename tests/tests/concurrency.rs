//! Built models are immutable and shared across threads.

use domain_tests::prelude::*;
use std::sync::Arc;
use std::thread;

fn shared_model() -> Arc<DomainModel> {
    let scenario = Scenario::new("shared").standard_universe().declare(|b| {
        b.create_entity_type("Person")
            .attribute("name", "String")
            .attribute("age", "Integer")
            .collection_attribute("friends", "Person")
            .done();
        b.create_function("MAX")
            .named_argument("a", "Integer")?
            .named_argument("b", "Integer")?
            .result_type("Integer")
            .done();
        StandardLiterals::install(b);
        Ok(())
    });
    Arc::new(scenario.model().unwrap())
}

#[test]
fn test_concurrent_reads() {
    let model = shared_model();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let model = Arc::clone(&model);
            thread::spawn(move || {
                for _ in 0..100 {
                    let integer = model.get_type("Integer").unwrap();
                    let person = model.get_type("Person").unwrap();
                    assert_eq!(person.attribute("age").unwrap().ty(), integer.handle());

                    let operands = vec![Arc::clone(integer), Arc::clone(integer)];
                    let sum = model
                        .resolve_operation_type(DomainOperator::Plus, &operands)
                        .unwrap();
                    assert_eq!(sum.name(), "Integer");

                    let max = model.resolve_function_type("MAX", &operands).unwrap();
                    assert_eq!(max.unwrap().name(), "Integer");

                    let literal = model
                        .resolve_numeric_literal(&i.to_string())
                        .unwrap()
                        .unwrap();
                    assert!(Arc::ptr_eq(literal.ty(), integer));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_extensions_of_one_base() {
    let base = shared_model();

    let models: Vec<DomainModel> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let base = Arc::clone(&base);
                scope.spawn(move || {
                    let mut builder = DomainBuilder::extending(base);
                    builder
                        .extend_entity_type(format!("Employee{}", i), "Person")
                        .unwrap()
                        .attribute("salary", "Decimal")
                        .done();
                    builder.build().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let base_person = base.get_type("Person").unwrap();
    for (i, model) in models.iter().enumerate() {
        let employee = model.get_type(&format!("Employee{}", i)).unwrap();
        assert_eq!(employee.attributes().count(), 4);
        assert!(Arc::ptr_eq(model.get_type("Person").unwrap(), base_person));
        // Each extension only sees its own layer.
        assert!(model.get_type(&format!("Employee{}", (i + 1) % 4)).is_none());
    }
}
