//! Service registrations
//!
//! The registry maps service ids to recipes. Iteration order is insertion
//! order and is significant: when several registered objects match a
//! parameter type, the first one in this order wins. Replacing an entry
//! keeps its position; removing one keeps the order of the rest.

use crate::value::{Callable, Instance, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;

/// How a service produces its value.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipe {
	/// Returned as-is.
	Literal(Value),
	/// Invoked with resolved arguments; its return value is the service.
	Callable(Callable),
	/// A class identifier. Confirmed against the catalog at resolution
	/// time; a name that is not a known class resolves to itself.
	Class(String),
	/// An object. Unless registered as prebuilt, resolving it builds a new
	/// object of the same class.
	Object(Instance),
}

impl Recipe {
	/// Runtime class of an object recipe.
	pub fn object_class(&self) -> Option<&str> {
		match self {
			Recipe::Object(instance) => Some(instance.class_name()),
			_ => None,
		}
	}

	/// The recipe as a plain value, for literal fallback.
	pub fn to_value(&self) -> Value {
		match self {
			Recipe::Literal(value) => value.clone(),
			Recipe::Callable(callable) => Value::Callable(callable.clone()),
			Recipe::Class(name) => Value::Str(name.clone()),
			Recipe::Object(instance) => Value::Object(instance.clone()),
		}
	}
}

impl From<Value> for Recipe {
	fn from(value: Value) -> Self {
		match value {
			Value::Callable(callable) => Recipe::Callable(callable),
			Value::Object(instance) => Recipe::Object(instance),
			Value::Str(name) => Recipe::Class(name),
			other => Recipe::Literal(other),
		}
	}
}

/// A registered recipe and its lifecycle flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEntry {
	recipe: Recipe,
	resolve_once: bool,
	prebuilt: bool,
}

impl ServiceEntry {
	pub fn new(recipe: Recipe) -> Self {
		Self {
			recipe,
			resolve_once: false,
			prebuilt: false,
		}
	}

	/// The first produced value is memoized for the container's lifetime.
	pub fn once(recipe: Recipe) -> Self {
		Self {
			resolve_once: true,
			..Self::new(recipe)
		}
	}

	/// An already constructed object, returned without injection.
	pub fn prebuilt(instance: Instance) -> Self {
		Self {
			prebuilt: true,
			..Self::new(Recipe::Object(instance))
		}
	}

	pub fn recipe(&self) -> &Recipe {
		&self.recipe
	}

	pub fn resolve_once(&self) -> bool {
		self.resolve_once
	}

	pub fn is_prebuilt(&self) -> bool {
		self.prebuilt
	}
}

/// Insertion-ordered, thread-safe id -> entry map.
#[derive(Debug, Default)]
pub struct Registry {
	entries: RwLock<IndexMap<String, ServiceEntry>>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace. Returns the replaced entry, if any.
	pub fn insert(&self, id: impl Into<String>, entry: ServiceEntry) -> Option<ServiceEntry> {
		self.entries.write().insert(id.into(), entry)
	}

	/// Insert only when `id` is absent. Returns whether it was inserted.
	pub fn insert_if_absent(&self, id: &str, entry: ServiceEntry) -> bool {
		let mut entries = self.entries.write();
		if entries.contains_key(id) {
			return false;
		}
		entries.insert(id.to_string(), entry);
		true
	}

	pub fn get(&self, id: &str) -> Option<ServiceEntry> {
		self.entries.read().get(id).cloned()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.read().contains_key(id)
	}

	pub fn remove(&self, id: &str) -> Option<ServiceEntry> {
		self.entries.write().shift_remove(id)
	}

	/// Ordered copy of every entry.
	///
	/// Resolution walks a snapshot so that no lock is held while recipes run;
	/// recipes are free to register or remove services themselves.
	pub fn snapshot(&self) -> Vec<(String, ServiceEntry)> {
		self.entries
			.read()
			.iter()
			.map(|(id, entry)| (id.clone(), entry.clone()))
			.collect()
	}

	pub fn ids(&self) -> Vec<String> {
		self.entries.read().keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
