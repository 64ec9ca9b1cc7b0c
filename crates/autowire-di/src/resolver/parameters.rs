//! Argument resolution for formal parameters

use super::Resolver;
use crate::arguments::Arguments;
use crate::error::DiResult;
use crate::reflection::FormalParameter;
use crate::registry::Recipe;
use crate::value::{Instance, Value};

impl Resolver<'_> {
	/// Build the final argument list for `parameters`.
	///
	/// `args` must already be collapsed. The result is the slot list of
	/// [`resolve_slots`](Self::resolve_slots) with every falsy slot removed.
	pub fn resolve_arguments(&self, parameters: &[FormalParameter], args: &[Value]) -> DiResult<Arguments> {
		let slots = self.resolve_slots(parameters, args)?;
		Ok(Arguments::new(
			slots.into_iter().filter(Value::is_truthy).collect(),
		))
	}

	/// One pass over the formal parameters, in declaration order.
	///
	/// - A parameter whose declared type is a known class gets an object of
	///   exactly that class: the first registered one, or a directly
	///   constructed one when none is registered.
	/// - Otherwise, when any explicit arguments were given, the next one is
	///   consumed (an empty string once they run out), after which earlier
	///   string slots naming a class are upgraded to objects. The upgrade
	///   also reaches defaults appended for earlier parameters.
	/// - A declared default is appended as well, even when a value was
	///   already supplied for the same parameter.
	pub fn resolve_slots(&self, parameters: &[FormalParameter], args: &[Value]) -> DiResult<Vec<Value>> {
		let catalog = self.container.catalog();
		let mut slots = Vec::with_capacity(parameters.len());
		let mut explicit = args.iter();

		for parameter in parameters {
			match parameter.declared_type().filter(|ty| catalog.contains(ty)) {
				Some(declared_type) => {
					let object = self.object_for_type(declared_type)?;
					slots.push(Value::Object(object));
				}
				None if !args.is_empty() => {
					slots.push(explicit.next().cloned().unwrap_or_else(|| Value::Str(String::new())));
					self.upgrade_symbolic_arguments(&mut slots)?;
				}
				None => {}
			}

			if let Some(default) = parameter.default_value() {
				slots.push(default.to_value());
			}
		}

		Ok(slots)
	}

	/// Replace every string slot that names a known class with an object of
	/// that class, chosen the same way as for a typed parameter.
	pub fn upgrade_symbolic_arguments(&self, slots: &mut [Value]) -> DiResult<()> {
		let catalog = self.container.catalog();
		for slot in slots.iter_mut() {
			let Some(class) = slot
				.as_str()
				.filter(|name| catalog.contains(name))
				.map(str::to_owned)
			else {
				continue;
			};
			tracing::trace!(class = %class, "string argument upgraded to object");
			*slot = Value::Object(self.object_for_type(&class)?);
		}
		Ok(())
	}

	/// An object of exactly `class`: the first one found in registration
	/// order, else a new one built without injection.
	pub fn object_for_type(&self, class: &str) -> DiResult<Instance> {
		let descriptor = self.container.catalog().require_instantiable(class)?;
		if let Some(object) = self.find_registered_object(class)? {
			return Ok(object);
		}
		tracing::trace!(class, "no registered object matches; constructing directly");
		descriptor.construct_direct()
	}

	/// Walk registrations in order looking for an object of `class`.
	///
	/// Candidates are memoized objects, object recipes (the registered
	/// object itself) and resolve-once class or object recipes for exactly
	/// `class`, which are resolved and memoized on the spot so that every
	/// later path sees the same object. Closures are never run
	/// just to find out what they return.
	fn find_registered_object(&self, class: &str) -> DiResult<Option<Instance>> {
		let store = self.container.store();
		for (id, entry) in self.container.registry().snapshot() {
			if let Some(memoized) = store.get(&id) {
				match memoized {
					Value::Object(object) if object.class_name() == class => {
						tracing::trace!(id = %id, class, "matched memoized object");
						return Ok(Some(object));
					}
					_ => continue,
				}
			}

			match entry.recipe() {
				Recipe::Object(object) if object.class_name() == class && !entry.resolve_once() => {
					tracing::trace!(id = %id, class, "matched registered object");
					return Ok(Some(object.clone()));
				}
				Recipe::Object(object) if object.class_name() == class => {
					if let Value::Object(object) = self.resolve_service(&id, &entry, Vec::new())? {
						tracing::trace!(id = %id, class, "matched resolve-once object service");
						return Ok(Some(object));
					}
				}
				Recipe::Class(name) if entry.resolve_once() && name == class => {
					if let Value::Object(object) = self.resolve_service(&id, &entry, Vec::new())?
						&& object.class_name() == class
					{
						tracing::trace!(id = %id, class, "matched resolve-once service");
						return Ok(Some(object));
					}
				}
				_ => {}
			}
		}
		Ok(None)
	}
}
