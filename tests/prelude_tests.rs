//! The facade re-exports work together from the prelude

use autowire::prelude::*;
use rstest::*;

struct Counter;

#[fixture]
fn container() -> Container {
	let settings = SettingsBuilder::new()
		.add_toml_str("forget_transient_receivers = false")
		.unwrap()
		.build()
		.unwrap();
	let container = Container::new().with_settings(settings).unwrap();
	container.describe(
		ClassDescriptor::builder::<Counter>("Counter")
			.without_constructor(|| Counter)
			.method("add", vec![FormalParameter::new("a"), FormalParameter::new("b")], |_, args| {
				Ok(Value::Int(args.int(0)? + args.int(1)?))
			})
			.build(),
	);
	container
}

#[rstest]
fn settings_from_the_facade_reach_the_container(container: Container) {
	// Act
	let sum = container.call("Counter@add", vec![Value::Int(2), Value::Int(3)]).unwrap();

	// Assert
	assert_eq!(sum, Value::Int(5));
	assert!(container.has("Counter"));
}

#[rstest]
#[case(Value::List(vec![Value::from("Counter"), Value::from("add"), Value::Null]))]
#[case(Value::Int(1))]
fn errors_are_re_exported(container: Container, #[case] target: Value) {
	let result: DiResult<Value> = container.call(target, vec![]);

	assert!(matches!(result, Err(DiError::NotCallable(_))));
}
