//! The service container
//!
//! [`Container`] owns the [`Registry`] of recipes and the [`InstanceStore`]
//! of memoized values, and hands both to a [`Resolver`] whenever something
//! has to be produced.

use crate::error::{DiError, DiResult};
use crate::reflection::{ClassCatalog, ClassDescriptor};
use crate::registry::{Recipe, Registry, ServiceEntry};
use crate::resolver::Resolver;
use crate::scope::InstanceStore;
use crate::value::{Value, rust_type_name};
use autowire_conf::{ContainerSettings, SettingsError};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Registry of service recipes with autowired resolution.
///
/// # Examples
///
/// ```
/// use autowire_di::{ClassDescriptor, Container, FormalParameter, Value};
///
/// struct Logger;
/// struct Mailer {
///     logger: std::sync::Arc<Logger>,
/// }
///
/// let container = Container::new();
/// container
///     .describe(ClassDescriptor::builder::<Logger>("Logger").without_constructor(|| Logger).build())
///     .describe(
///         ClassDescriptor::builder::<Mailer>("Mailer")
///             .constructor(vec![FormalParameter::new("logger").typed("Logger")], |args| {
///                 Ok(Mailer { logger: args.object::<Logger>(0)? })
///             })
///             .build(),
///     );
///
/// let mailer = container.make("Mailer", vec![]).unwrap();
/// assert!(mailer.downcast::<Mailer>().is_some());
/// ```
pub struct Container {
	id: u64,
	registry: Registry,
	store: InstanceStore,
	catalog: Arc<ClassCatalog>,
	settings: ContainerSettings,
}

impl Container {
	/// Create an empty container with its own class catalog and default settings.
	pub fn new() -> Self {
		let id = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);
		tracing::debug!(container = id, "container created");
		Self {
			id,
			registry: Registry::new(),
			store: InstanceStore::new(),
			catalog: Arc::new(ClassCatalog::new()),
			settings: ContainerSettings::default(),
		}
	}

	/// Share a catalog of class descriptors with other containers.
	pub fn with_catalog(mut self, catalog: Arc<ClassCatalog>) -> Self {
		self.catalog = catalog;
		self
	}

	/// Replace the default settings, rejecting values that fail
	/// [`ContainerSettings::validate`].
	pub fn with_settings(mut self, settings: ContainerSettings) -> Result<Self, SettingsError> {
		settings.validate()?;
		self.settings = settings;
		Ok(self)
	}

	/// Make a class known to this container's catalog.
	pub fn describe(&self, descriptor: ClassDescriptor) -> &Self {
		self.catalog.register(descriptor);
		self
	}

	/// Resolve a registered id.
	///
	/// Fails with [`DiError::NotFound`] when the id was never registered.
	pub fn get(&self, id: &str) -> DiResult<Value> {
		self.resolver().resolve_id(id, Vec::new())
	}

	/// Resolve `id`, registering it as a class recipe of the same name first
	/// when it is unknown. `args` feed the explicit parameter slots.
	pub fn make(&self, id: &str, args: Vec<Value>) -> DiResult<Value> {
		self.resolver().make(id, args)
	}

	/// Resolve `id` and downcast the produced object.
	pub fn resolve<T: Any + Send + Sync>(&self, id: &str) -> DiResult<Arc<T>> {
		let value = self.get(id)?;
		value.downcast::<T>().ok_or_else(|| DiError::TypeMismatch {
			expected: rust_type_name::<T>(),
			found: value.kind(),
		})
	}

	pub fn has(&self, id: &str) -> bool {
		self.registry.contains(id)
	}

	/// Register a recipe, replacing any previous one for `id`.
	///
	/// Closures become callable recipes, objects become object recipes,
	/// strings become class recipes and everything else is a literal.
	pub fn set(&self, id: impl Into<String>, recipe: impl Into<Value>) -> &Self {
		self.register(id.into(), ServiceEntry::new(Recipe::from(recipe.into())))
	}

	/// Like [`set`](Self::set), but the recipe runs at most once and its
	/// result is returned for every later resolution.
	pub fn once(&self, id: impl Into<String>, recipe: impl Into<Value>) -> &Self {
		self.register(id.into(), ServiceEntry::once(Recipe::from(recipe.into())))
	}

	/// Register an already-built object, returned as-is on every resolution.
	///
	/// Values that are not objects are ignored. An id whose resolve-once
	/// value was already produced keeps returning that value.
	pub fn instance(&self, id: impl Into<String>, object: impl Into<Value>) -> &Self {
		let id = id.into();
		match object.into() {
			Value::Object(instance) => self.register(id, ServiceEntry::prebuilt(instance)),
			other => {
				tracing::warn!(id = %id, kind = %other.kind(), "instance registration ignored: not an object");
				self
			}
		}
	}

	fn register(&self, id: String, entry: ServiceEntry) -> &Self {
		tracing::debug!(
			id = %id,
			resolve_once = entry.resolve_once(),
			prebuilt = entry.is_prebuilt(),
			"service registered"
		);
		self.registry.insert(id, entry);
		self
	}

	/// Remove a registration. Removing an unknown id does nothing.
	pub fn remove(&self, id: &str) -> &Self {
		if self.registry.remove(id).is_some() {
			tracing::debug!(id, "service removed");
		}
		self
	}

	/// Invoke a closure, a `[receiver, method]` pair or a `"Class@method"`
	/// string with autowired arguments.
	pub fn call(&self, target: impl Into<Value>, args: Vec<Value>) -> DiResult<Value> {
		self.resolver().call(target.into(), args)
	}

	pub fn resolver(&self) -> Resolver<'_> {
		Resolver::new(self)
	}

	pub fn catalog(&self) -> &Arc<ClassCatalog> {
		&self.catalog
	}

	pub fn settings(&self) -> &ContainerSettings {
		&self.settings
	}

	pub fn len(&self) -> usize {
		self.registry.len()
	}

	pub fn is_empty(&self) -> bool {
		self.registry.is_empty()
	}

	/// Registered ids in registration order.
	pub fn ids(&self) -> Vec<String> {
		self.registry.ids()
	}

	/// Whether a resolve-once id has produced its value yet.
	pub fn is_resolved(&self, id: &str) -> bool {
		self.store.contains(id)
	}

	pub(crate) fn registry(&self) -> &Registry {
		&self.registry
	}

	pub(crate) fn store(&self) -> &InstanceStore {
		&self.store
	}

	pub(crate) fn id(&self) -> u64 {
		self.id
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Container {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Container")
			.field("id", &self.id)
			.field("services", &self.registry.len())
			.field("resolved", &self.store.len())
			.field("classes", &self.catalog.len())
			.finish()
	}
}
