//! Class and signature descriptions
//!
//! Rust has no runtime reflection, so every class the container may build is
//! described once in a [`ClassCatalog`]: its kind, its constructor's formal
//! parameters, the factory that actually builds the value and the methods
//! that can be invoked on it. The resolver only ever looks at these
//! descriptions; it never needs to know the concrete Rust types.

use crate::arguments::Arguments;
use crate::error::{DiError, DiResult};
use crate::value::{Instance, Value, rust_type_name};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Default value declared by a formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
	Value(Value),
	/// A named constant. It is passed on by name, not by value.
	Constant(String),
}

impl DefaultValue {
	/// The value appended to the argument list for this default.
	pub fn to_value(&self) -> Value {
		match self {
			DefaultValue::Value(value) => value.clone(),
			DefaultValue::Constant(name) => Value::Str(name.clone()),
		}
	}
}

/// One formal parameter of a closure, constructor or method.
#[derive(Debug, Clone, PartialEq)]
pub struct FormalParameter {
	name: String,
	declared_type: Option<String>,
	default: Option<DefaultValue>,
}

impl FormalParameter {
	/// An untyped parameter without default.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::FormalParameter;
	///
	/// let level = FormalParameter::new("level").with_default("info");
	/// assert!(level.has_default());
	/// assert!(level.declared_type().is_none());
	///
	/// let db = FormalParameter::new("db").typed("Database");
	/// assert_eq!(db.declared_type(), Some("Database"));
	/// ```
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			declared_type: None,
			default: None,
		}
	}

	/// Declare the parameter's type by class or interface name.
	pub fn typed(mut self, declared_type: impl Into<String>) -> Self {
		self.declared_type = Some(declared_type.into());
		self
	}

	pub fn with_default(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(DefaultValue::Value(value.into()));
		self
	}

	pub fn with_constant_default(mut self, constant: impl Into<String>) -> Self {
		self.default = Some(DefaultValue::Constant(constant.into()));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn declared_type(&self) -> Option<&str> {
		self.declared_type.as_deref().filter(|ty| !ty.is_empty())
	}

	pub fn has_default(&self) -> bool {
		self.default.is_some()
	}

	pub fn default_value(&self) -> Option<&DefaultValue> {
		self.default.as_ref()
	}
}

/// Anything whose formal parameters can be described.
pub trait Signature {
	fn parameters(&self) -> &[FormalParameter];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
	Concrete,
	Abstract,
	Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	Public,
	Private,
}

/// Declared constructor of a class.
#[derive(Debug, Clone)]
pub struct Constructor {
	parameters: Vec<FormalParameter>,
	visibility: Visibility,
}

impl Constructor {
	pub fn visibility(&self) -> Visibility {
		self.visibility
	}
}

impl Signature for Constructor {
	fn parameters(&self) -> &[FormalParameter] {
		&self.parameters
	}
}

type Factory = Arc<dyn Fn(&Arguments) -> DiResult<Arc<dyn Any + Send + Sync>> + Send + Sync>;
type MethodFn = Arc<dyn Fn(&Instance, &Arguments) -> DiResult<Value> + Send + Sync>;

/// A method that can be invoked on instances of a class.
#[derive(Clone)]
pub struct Method {
	name: String,
	parameters: Vec<FormalParameter>,
	func: MethodFn,
}

impl Method {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn invoke(&self, receiver: &Instance, args: &Arguments) -> DiResult<Value> {
		(self.func)(receiver, args)
	}
}

impl Signature for Method {
	fn parameters(&self) -> &[FormalParameter] {
		&self.parameters
	}
}

impl fmt::Debug for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Method")
			.field("name", &self.name)
			.field("parameters", &self.parameters)
			.finish()
	}
}

/// Everything the container knows about one class.
#[derive(Clone)]
pub struct ClassDescriptor {
	name: String,
	kind: ClassKind,
	constructor: Option<Constructor>,
	factory: Option<Factory>,
	methods: HashMap<String, Method>,
}

impl ClassDescriptor {
	/// Start describing a concrete class backed by the Rust type `T`.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::{Arguments, ClassDescriptor, FormalParameter};
	///
	/// struct Logger {
	///     level: String,
	/// }
	///
	/// let logger = ClassDescriptor::builder::<Logger>("Logger")
	///     .constructor(
	///         vec![FormalParameter::new("level").with_default("info")],
	///         |args| Ok(Logger { level: args.str(0)?.to_string() }),
	///     )
	///     .build();
	///
	/// assert!(logger.is_instantiable());
	/// let instance = logger.instantiate(&Arguments::new(vec!["debug".into()])).unwrap();
	/// assert_eq!(instance.downcast_ref::<Logger>().unwrap().level, "debug");
	/// ```
	pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> ClassBuilder<T> {
		ClassBuilder {
			descriptor: Self::bare(name, ClassKind::Concrete),
			_marker: PhantomData,
		}
	}

	/// An interface: known to the catalog, never instantiable.
	pub fn interface(name: impl Into<String>) -> Self {
		Self::bare(name, ClassKind::Interface)
	}

	/// An abstract class: known to the catalog, never instantiable.
	pub fn abstract_class(name: impl Into<String>) -> Self {
		Self::bare(name, ClassKind::Abstract)
	}

	fn bare(name: impl Into<String>, kind: ClassKind) -> Self {
		Self {
			name: name.into(),
			kind,
			constructor: None,
			factory: None,
			methods: HashMap::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> ClassKind {
		self.kind
	}

	pub fn constructor(&self) -> Option<&Constructor> {
		self.constructor.as_ref()
	}

	pub fn method(&self, name: &str) -> Option<&Method> {
		self.methods.get(name)
	}

	/// Concrete, buildable, and not guarded by a private constructor.
	pub fn is_instantiable(&self) -> bool {
		self.kind == ClassKind::Concrete
			&& self.factory.is_some()
			&& self
				.constructor
				.as_ref()
				.is_none_or(|ctor| ctor.visibility == Visibility::Public)
	}

	/// Build a new object from an already resolved argument list.
	pub fn instantiate(&self, args: &Arguments) -> DiResult<Instance> {
		let factory = match &self.factory {
			Some(factory) if self.is_instantiable() => factory,
			_ => return Err(DiError::NotInstantiable(self.name.clone())),
		};
		let object = factory(args)?;
		Ok(Instance::from_arc(self.name.as_str(), object))
	}

	/// Build a new object without any injection.
	///
	/// Every formal parameter receives its declared default, `Null` where it
	/// has none, which mirrors calling the constructor with no arguments.
	pub fn construct_direct(&self) -> DiResult<Instance> {
		let args = self
			.constructor
			.as_ref()
			.map(|ctor| {
				ctor.parameters
					.iter()
					.map(|param| {
						param
							.default_value()
							.map_or(Value::Null, DefaultValue::to_value)
					})
					.collect::<Vec<_>>()
			})
			.unwrap_or_default();
		self.instantiate(&Arguments::new(args))
	}
}

impl fmt::Debug for ClassDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
		methods.sort_unstable();
		f.debug_struct("ClassDescriptor")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("constructor", &self.constructor)
			.field("methods", &methods)
			.finish()
	}
}

/// Typed builder for [`ClassDescriptor`].
pub struct ClassBuilder<T> {
	descriptor: ClassDescriptor,
	_marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
	/// Declare a constructor and the factory that runs it.
	pub fn constructor<F>(mut self, parameters: Vec<FormalParameter>, factory: F) -> Self
	where
		F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
	{
		self.descriptor.constructor = Some(Constructor {
			parameters,
			visibility: Visibility::Public,
		});
		self.descriptor.factory = Some(Arc::new(move |args| {
			factory(args).map(|object| Arc::new(object) as Arc<dyn Any + Send + Sync>)
		}));
		self
	}

	/// The class declares no constructor; `factory` builds it directly.
	pub fn without_constructor<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		self.descriptor.constructor = None;
		self.descriptor.factory = Some(Arc::new(move |_| {
			Ok(Arc::new(factory()) as Arc<dyn Any + Send + Sync>)
		}));
		self
	}

	/// Mark the declared constructor as private.
	pub fn private_constructor(mut self) -> Self {
		let ctor = self.descriptor.constructor.get_or_insert_with(|| Constructor {
			parameters: Vec::new(),
			visibility: Visibility::Private,
		});
		ctor.visibility = Visibility::Private;
		self
	}

	/// Add a method callable as `Class@name` or `[receiver, name]`.
	pub fn method<F>(mut self, name: impl Into<String>, parameters: Vec<FormalParameter>, func: F) -> Self
	where
		F: Fn(&T, &Arguments) -> DiResult<Value> + Send + Sync + 'static,
	{
		let name = name.into();
		let method = Method {
			name: name.clone(),
			parameters,
			func: Arc::new(move |receiver, args| {
				let this = receiver
					.downcast_ref::<T>()
					.ok_or_else(|| DiError::TypeMismatch {
						expected: rust_type_name::<T>(),
						found: receiver.class_name().to_string(),
					})?;
				func(this, args)
			}),
		};
		self.descriptor.methods.insert(name, method);
		self
	}

	pub fn build(self) -> ClassDescriptor {
		self.descriptor
	}
}

impl<T: Any + Send + Sync + Default> ClassBuilder<T> {
	/// No constructor; instances are `T::default()`.
	pub fn default_constructed(self) -> Self {
		self.without_constructor(T::default)
	}
}

/// Registry of class descriptions, standing in for the runtime type system.
#[derive(Default)]
pub struct ClassCatalog {
	classes: RwLock<HashMap<String, Arc<ClassDescriptor>>>,
}

impl ClassCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Describe a class, replacing any previous description of that name.
	pub fn register(&self, descriptor: ClassDescriptor) -> Option<Arc<ClassDescriptor>> {
		let name = descriptor.name.clone();
		tracing::debug!(class = %name, kind = ?descriptor.kind, "class described");
		self.classes.write().insert(name, Arc::new(descriptor))
	}

	pub fn get(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
		self.classes.read().get(name).cloned()
	}

	/// Whether `name` is a known class or interface.
	pub fn contains(&self, name: &str) -> bool {
		self.classes.read().contains_key(name)
	}

	pub fn is_instantiable(&self, name: &str) -> bool {
		self.get(name).is_some_and(|class| class.is_instantiable())
	}

	/// The description of `name`, failing unless it can be instantiated.
	pub fn require_instantiable(&self, name: &str) -> DiResult<Arc<ClassDescriptor>> {
		self.get(name)
			.filter(|class| class.is_instantiable())
			.ok_or_else(|| DiError::NotInstantiable(name.to_string()))
	}

	pub fn len(&self) -> usize {
		self.classes.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.read().is_empty()
	}
}

impl fmt::Debug for ClassCatalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let classes = self.classes.read();
		let mut names: Vec<&str> = classes.keys().map(String::as_str).collect();
		names.sort_unstable();
		f.debug_struct("ClassCatalog").field("classes", &names).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[derive(Default)]
	struct Clock;

	struct Greeter {
		greeting: String,
	}

	#[fixture]
	fn catalog() -> ClassCatalog {
		let catalog = ClassCatalog::new();
		catalog.register(ClassDescriptor::builder::<Clock>("Clock").default_constructed().build());
		catalog.register(
			ClassDescriptor::builder::<Greeter>("Greeter")
				.constructor(
					vec![FormalParameter::new("greeting").with_default("hello")],
					|args| {
						Ok(Greeter {
							greeting: args.str(0)?.to_string(),
						})
					},
				)
				.method("greet", vec![FormalParameter::new("name")], |this, args| {
					Ok(Value::from(format!("{} {}", this.greeting, args.str(0)?)))
				})
				.build(),
		);
		catalog.register(ClassDescriptor::interface("Cache"));
		catalog.register(ClassDescriptor::abstract_class("Repository"));
		catalog.register(
			ClassDescriptor::builder::<Clock>("Singleton")
				.default_constructed()
				.private_constructor()
				.build(),
		);
		catalog
	}

	#[rstest]
	#[case("Clock", true)]
	#[case("Greeter", true)]
	#[case("Cache", false)]
	#[case("Repository", false)]
	#[case("Singleton", false)]
	#[case("Missing", false)]
	fn instantiability(catalog: ClassCatalog, #[case] name: &str, #[case] expected: bool) {
		assert_eq!(catalog.is_instantiable(name), expected);
	}

	#[rstest]
	fn interfaces_are_known_but_not_buildable(catalog: ClassCatalog) {
		assert!(catalog.contains("Cache"));
		assert_eq!(
			catalog.require_instantiable("Cache").unwrap_err(),
			DiError::NotInstantiable("Cache".to_string())
		);
	}

	#[rstest]
	fn direct_construction_uses_declared_defaults(catalog: ClassCatalog) {
		// Act
		let greeter = catalog.get("Greeter").unwrap().construct_direct().unwrap();

		// Assert
		assert_eq!(greeter.class_name(), "Greeter");
		assert_eq!(greeter.downcast_ref::<Greeter>().unwrap().greeting, "hello");
	}

	#[rstest]
	fn methods_receive_their_instance(catalog: ClassCatalog) {
		let class = catalog.get("Greeter").unwrap();
		let greeter = class.construct_direct().unwrap();
		let greet = class.method("greet").unwrap();

		let out = greet
			.invoke(&greeter, &Arguments::new(vec![Value::from("ada")]))
			.unwrap();

		assert_eq!(out, Value::from("hello ada"));
		assert_eq!(greet.parameters().len(), 1);
	}

	#[rstest]
	fn method_rejects_foreign_receiver(catalog: ClassCatalog) {
		let greet = catalog.get("Greeter").unwrap().method("greet").cloned().unwrap();
		let clock = Instance::new("Clock", Clock);

		let err = greet.invoke(&clock, &Arguments::empty()).unwrap_err();

		assert!(matches!(err, DiError::TypeMismatch { .. }));
	}

	#[rstest]
	fn constant_defaults_are_passed_by_name() {
		let param = FormalParameter::new("level").with_constant_default("DEFAULT_LEVEL");
		assert_eq!(param.default_value().unwrap().to_value(), Value::from("DEFAULT_LEVEL"));
	}
}
