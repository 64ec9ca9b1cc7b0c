//! Resolve-once services keep a single identity for the container's lifetime

mod common;

use autowire_di::{Callable, Container, FormalParameter, Instance, Value};
use common::*;
use rstest::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn counting_recipe(counter: Arc<AtomicUsize>) -> Callable {
	Callable::from_fn(move || {
		let n = counter.fetch_add(1, Ordering::SeqCst) as i64;
		Ok(Value::Object(Instance::new("Counter", n)))
	})
}

#[rstest]
fn recipe_runs_once(container: Container) {
	// Arrange
	let runs = Arc::new(AtomicUsize::new(0));
	container.once("counter", counting_recipe(runs.clone()));

	// Act
	let first = container.get("counter").unwrap();
	let second = container.get("counter").unwrap();
	let third = container.make("counter", vec![Value::Int(1)]).unwrap();

	// Assert
	assert_eq!(runs.load(Ordering::SeqCst), 1);
	assert_eq!(first, second);
	assert_eq!(first, third);
}

#[rstest]
fn plain_set_runs_every_time(container: Container) {
	let runs = Arc::new(AtomicUsize::new(0));
	container.set("counter", counting_recipe(runs.clone()));

	container.get("counter").unwrap();
	container.get("counter").unwrap();

	assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[rstest]
fn nested_resolution_shares_the_memoized_object(container: Container) {
	// Arrange
	container.once("clock", "Clock");
	container.set("scheduler", "Scheduler");
	assert!(!container.is_resolved("clock"));

	// Act
	let scheduler = container.resolve::<Scheduler>("scheduler").unwrap();

	// Assert
	assert!(container.is_resolved("clock"));
	let clock = container.resolve::<Clock>("clock").unwrap();
	assert!(Arc::ptr_eq(&scheduler.clock, &clock));

	let again = container.resolve::<Scheduler>("scheduler").unwrap();
	assert!(!Arc::ptr_eq(&scheduler, &again));
	assert!(Arc::ptr_eq(&again.clock, &clock));
}

#[rstest]
fn memoized_object_is_used_as_call_argument(container: Container) {
	// Arrange
	container.once("clock", "Clock");
	let clock = container.get("clock").unwrap();
	let echo = Callable::new(vec![FormalParameter::new("clock").typed("Clock")], |args| {
		Ok(Value::Object(args.instance(0)?.clone()))
	});

	// Act
	let passed = container.call(echo, vec![]).unwrap();

	// Assert
	assert_eq!(passed, clock);
}

#[rstest]
fn once_literal_is_memoized(container: Container) {
	container.once("name", "app");

	assert_eq!(container.get("name").unwrap(), Value::from("app"));
	assert!(container.is_resolved("name"));
}

#[rstest]
fn failed_recipe_is_retried(container: Container) {
	// Arrange
	let attempts = Arc::new(AtomicUsize::new(0));
	let seen = attempts.clone();
	container.once(
		"flaky",
		Callable::from_fn(move || {
			if seen.fetch_add(1, Ordering::SeqCst) == 0 {
				Err(autowire_di::DiError::instantiation("Flaky", "not yet"))
			} else {
				Ok(Value::Int(7))
			}
		}),
	);

	// Act
	let first = container.get("flaky");
	let second = container.get("flaky");

	// Assert
	assert!(first.is_err());
	assert_eq!(second.unwrap(), Value::Int(7));
	assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[rstest]
fn concurrent_first_resolutions_run_the_recipe_once() {
	// Arrange
	let runs = Arc::new(AtomicUsize::new(0));
	let seen = runs.clone();
	let container = Arc::new(Container::new());
	container.once(
		"slow",
		Callable::from_fn(move || {
			seen.fetch_add(1, Ordering::SeqCst);
			thread::sleep(Duration::from_millis(20));
			Ok(Value::Object(Instance::new("Slow", ())))
		}),
	);
	let barrier = Arc::new(Barrier::new(8));

	// Act
	let handles: Vec<_> = (0..8)
		.map(|_| {
			let container = Arc::clone(&container);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				container.get("slow").unwrap()
			})
		})
		.collect();
	let values: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();

	// Assert
	assert_eq!(runs.load(Ordering::SeqCst), 1);
	assert!(values.windows(2).all(|pair| pair[0] == pair[1]));
}

#[rstest]
fn once_object_keeps_one_identity_across_paths(container: Container) {
	// Arrange
	let registered = Instance::new("Clock", Clock { zone: "CET".into() });
	container.once("clock", registered);
	let echo = Callable::new(vec![FormalParameter::new("clock").typed("Clock")], |args| {
		Ok(Value::Object(args.instance(0)?.clone()))
	});

	// Act
	let before = container.call(echo.clone(), vec![]).unwrap();
	let direct = container.get("clock").unwrap();
	let after = container.call(echo, vec![]).unwrap();

	// Assert
	assert_eq!(before, direct);
	assert_eq!(before, after);
}

#[rstest]
fn memoized_value_outlives_instance_replacement(container: Container) {
	// Arrange
	container.once("clock", "Clock");
	let memoized = container.get("clock").unwrap();

	// Act
	container.instance("clock", Instance::new("Clock", Clock { zone: "CET".into() }));

	// Assert
	assert_eq!(container.get("clock").unwrap(), memoized);
}
