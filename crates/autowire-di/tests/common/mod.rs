//! Classes shared by the container behaviour tests

#![allow(dead_code)]

use autowire_di::{ClassDescriptor, Container, FormalParameter, Value};
use rstest::fixture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Dependency without a constructor of its own beyond a defaulted zone.
pub struct Clock {
	pub zone: String,
}

/// Depends on a `Clock` through a typed constructor parameter.
pub struct Scheduler {
	pub clock: Arc<Clock>,
}

/// Records the exact argument list its constructor received.
pub struct Probe {
	pub received: Vec<Value>,
}

/// Counts how often `greet` ran on this particular object.
#[derive(Default)]
pub struct Greeter {
	pub greeted: AtomicUsize,
}

pub fn clock_class() -> ClassDescriptor {
	ClassDescriptor::builder::<Clock>("Clock")
		.constructor(vec![FormalParameter::new("zone").with_default("UTC")], |args| {
			Ok(Clock {
				zone: args.str(0)?.to_string(),
			})
		})
		.build()
}

pub fn scheduler_class() -> ClassDescriptor {
	ClassDescriptor::builder::<Scheduler>("Scheduler")
		.constructor(vec![FormalParameter::new("clock").typed("Clock")], |args| {
			Ok(Scheduler {
				clock: args.object::<Clock>(0)?,
			})
		})
		.build()
}

/// A `Probe` class with the given constructor parameters.
pub fn probe_class(parameters: Vec<FormalParameter>) -> ClassDescriptor {
	ClassDescriptor::builder::<Probe>("Probe")
		.constructor(parameters, |args| {
			Ok(Probe {
				received: args.as_slice().to_vec(),
			})
		})
		.build()
}

pub fn greeter_class() -> ClassDescriptor {
	ClassDescriptor::builder::<Greeter>("Greeter")
		.default_constructed()
		.method("greet", vec![FormalParameter::new("name")], |greeter, args| {
			let count = greeter.greeted.fetch_add(1, Ordering::SeqCst) + 1;
			Ok(Value::from(format!("hello {} #{count}", args.str(0)?)))
		})
		.method("count", vec![], |greeter, _| {
			Ok(Value::from(greeter.greeted.load(Ordering::SeqCst) as i64))
		})
		.build()
}

/// A container that knows `Clock`, `Scheduler` and `Greeter`.
#[fixture]
pub fn container() -> Container {
	let container = Container::new();
	container
		.describe(clock_class())
		.describe(scheduler_class())
		.describe(greeter_class());
	container
}
