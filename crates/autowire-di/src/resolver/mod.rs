//! Turning recipes into values
//!
//! A [`Resolver`] borrows the live container; it never owns registrations,
//! so services added or removed while a resolution is running are seen by
//! the rest of that resolution.
//!
//! Dispatch for a registered id tries, in order:
//!
//! 1. the memoized value, if the id has one;
//! 2. closure recipes, invoked with resolved arguments;
//! 3. object recipes and class names known to the catalog, constructed
//!    with resolved constructor arguments (prebuilt objects are returned
//!    untouched);
//! 4. anything else is returned as the literal it was registered as.
//!
//! Resolve-once ids run their recipe inside the instance store's per-id
//! cell, so the recipe executes at most once even when the id is first
//! needed deep inside another service's construction.

mod callable;
mod class;
mod parameters;

pub use callable::CallTarget;

use crate::container::Container;
use crate::cycle_detection;
use crate::error::{DiError, DiResult};
use crate::registry::{Recipe, ServiceEntry};
use crate::value::Value;

/// Resolution algorithm bound to one container.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'c> {
	container: &'c Container,
}

impl<'c> Resolver<'c> {
	pub fn new(container: &'c Container) -> Self {
		Self { container }
	}

	pub fn container(&self) -> &'c Container {
		self.container
	}

	/// Resolve a registered id, failing with `NotFound` when it is absent.
	pub fn resolve_id(&self, id: &str, args: Vec<Value>) -> DiResult<Value> {
		let entry = self
			.container
			.registry()
			.get(id)
			.ok_or_else(|| DiError::NotFound(id.to_string()))?;
		self.resolve_service(id, &entry, args)
	}

	/// Resolve `id`, registering it as a class recipe named after itself
	/// when it is not registered yet.
	pub fn make(&self, id: &str, args: Vec<Value>) -> DiResult<Value> {
		if self
			.container
			.registry()
			.insert_if_absent(id, ServiceEntry::new(Recipe::Class(id.to_string())))
		{
			tracing::debug!(id, "auto-registered class recipe");
		}
		self.resolve_id(id, args)
	}

	/// Full resolution of one entry, honouring memoization.
	pub fn resolve_service(&self, id: &str, entry: &ServiceEntry, args: Vec<Value>) -> DiResult<Value> {
		let store = self.container.store();
		if let Some(value) = store.get(id) {
			tracing::trace!(id, "memoized value reused");
			return Ok(value);
		}

		let _guard = cycle_detection::begin_resolution(
			self.container.id(),
			id,
			self.container.settings().max_resolution_depth,
		)?;
		let span = tracing::debug_span!("resolve", id);
		let _enter = span.enter();

		if entry.resolve_once() {
			store.get_or_try_init(id, || {
				tracing::debug!("running resolve-once recipe");
				self.produce(entry, args)
			})
		} else {
			self.produce(entry, args)
		}
	}

	fn produce(&self, entry: &ServiceEntry, args: Vec<Value>) -> DiResult<Value> {
		match entry.recipe() {
			Recipe::Callable(callable) => self.resolve_callable(callable, args),
			Recipe::Object(_) => self.resolve_class(entry, args),
			Recipe::Class(name) if self.container.catalog().contains(name) => {
				self.resolve_class(entry, args)
			}
			literal => Ok(literal.to_value()),
		}
	}
}

/// Flatten nested argument lists depth-first into one ordered sequence.
///
/// # Examples
///
/// ```
/// use autowire_di::{Value, resolver::collapse};
///
/// let flat = collapse(vec![
///     Value::Int(1),
///     Value::List(vec![Value::Int(2), Value::List(vec![Value::Int(3)])]),
///     Value::Int(4),
/// ]);
/// assert_eq!(flat, vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
/// ```
pub fn collapse(args: Vec<Value>) -> Vec<Value> {
	let mut flat = Vec::with_capacity(args.len());
	collapse_into(args, &mut flat);
	flat
}

fn collapse_into(args: Vec<Value>, flat: &mut Vec<Value>) {
	for arg in args {
		match arg {
			Value::List(items) => collapse_into(items, flat),
			other => flat.push(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn collapse_keeps_flat_lists_untouched() {
		let args = vec![Value::from("a"), Value::Int(1)];
		assert_eq!(collapse(args.clone()), args);
	}

	#[rstest]
	fn collapse_drops_empty_lists() {
		let args = vec![Value::List(vec![]), Value::Int(1)];
		assert_eq!(collapse(args), vec![Value::Int(1)]);
	}
}
