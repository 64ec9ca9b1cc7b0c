//! Constructing classes with injected constructor arguments

use super::{Resolver, collapse};
use crate::arguments::Arguments;
use crate::error::DiResult;
use crate::reflection::Signature;
use crate::registry::{Recipe, ServiceEntry};
use crate::value::{Instance, Value};

impl Resolver<'_> {
	/// Resolve an object or class-name recipe.
	///
	/// Prebuilt objects come back untouched. Any other object recipe builds
	/// a new object of the same class.
	pub fn resolve_class(&self, entry: &ServiceEntry, args: Vec<Value>) -> DiResult<Value> {
		let class = match entry.recipe() {
			Recipe::Object(object) if entry.is_prebuilt() => return Ok(Value::Object(object.clone())),
			Recipe::Object(object) => object.class_name().to_string(),
			Recipe::Class(name) => name.clone(),
			other => return Ok(other.to_value()),
		};
		self.build(&class, args).map(Value::Object)
	}

	/// Construct `class`, resolving its constructor parameters.
	///
	/// A class without a declared constructor is built with no arguments.
	pub fn build(&self, class: &str, args: Vec<Value>) -> DiResult<Instance> {
		let descriptor = self.container.catalog().require_instantiable(class)?;
		let Some(constructor) = descriptor.constructor() else {
			tracing::debug!(class, "constructing without constructor");
			return descriptor.instantiate(&Arguments::empty());
		};

		let args = self.resolve_arguments(constructor.parameters(), &collapse(args))?;
		tracing::debug!(class, arguments = args.len(), "constructing");
		descriptor.instantiate(&args)
	}
}
