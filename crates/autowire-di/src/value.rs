//! Dynamic values produced and consumed by the container
//!
//! A recipe can yield anything from a plain literal to a fully wired object,
//! so resolution works over a small tagged value type instead of generics.
//! Objects and closures are reference counted; cloning a [`Value`] never
//! duplicates the underlying object, which is what lets resolve-once and
//! prebuilt services keep their identity across every resolution path.

use crate::arguments::Arguments;
use crate::error::DiResult;
use crate::reflection::{FormalParameter, Signature};
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// A value flowing through the container.
#[derive(Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	List(Vec<Value>),
	Object(Instance),
	Callable(Callable),
}

impl Value {
	/// Truthiness used to drop empty argument slots before invocation.
	///
	/// `Null`, `false`, `0`, `0.0`, `""`, `"0"` and empty lists are falsy.
	/// Objects and callables are always truthy.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::Value;
	///
	/// assert!(!Value::from("0").is_truthy());
	/// assert!(!Value::Int(0).is_truthy());
	/// assert!(Value::from("info").is_truthy());
	/// ```
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null => false,
			Value::Bool(b) => *b,
			Value::Int(i) => *i != 0,
			Value::Float(f) => *f != 0.0,
			Value::Str(s) => !(s.is_empty() || s == "0"),
			Value::List(items) => !items.is_empty(),
			Value::Object(_) | Value::Callable(_) => true,
		}
	}

	/// Short description of the variant, used in error messages.
	pub fn kind(&self) -> String {
		match self {
			Value::Null => "null".to_string(),
			Value::Bool(_) => "bool".to_string(),
			Value::Int(_) => "int".to_string(),
			Value::Float(_) => "float".to_string(),
			Value::Str(_) => "string".to_string(),
			Value::List(_) => "list".to_string(),
			Value::Object(instance) => format!("object({})", instance.class_name()),
			Value::Callable(_) => "callable".to_string(),
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&Instance> {
		match self {
			Value::Object(instance) => Some(instance),
			_ => None,
		}
	}

	pub fn as_callable(&self) -> Option<&Callable> {
		match self {
			Value::Callable(callable) => Some(callable),
			_ => None,
		}
	}

	/// Downcast an object value to its concrete Rust type.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.as_object().and_then(Instance::downcast::<T>)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::List(a), Value::List(b)) => a == b,
			(Value::Object(a), Value::Object(b)) => a == b,
			(Value::Callable(a), Value::Callable(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("Null"),
			Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
			Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
			Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
			Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
			Value::List(items) => f.debug_tuple("List").field(items).finish(),
			Value::Object(instance) => instance.fmt(f),
			Value::Callable(callable) => callable.fmt(f),
		}
	}
}

impl From<()> for Value {
	fn from(_: ()) -> Self {
		Value::Null
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Int(i64::from(value))
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Value::Int(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Str(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Str(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::List(value)
	}
}

impl From<Instance> for Value {
	fn from(value: Instance) -> Self {
		Value::Object(value)
	}
}

impl From<Callable> for Value {
	fn from(value: Callable) -> Self {
		Value::Callable(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

/// An already-produced object together with its runtime class name.
///
/// Cloning an `Instance` shares the same object; two clones are
/// [`ptr_eq`](Instance::ptr_eq).
#[derive(Clone)]
pub struct Instance {
	class: Arc<str>,
	object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
	/// Wrap a Rust value as an object of the given runtime class.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::Instance;
	///
	/// struct Mailer;
	///
	/// let mailer = Instance::new("Mailer", Mailer);
	/// assert_eq!(mailer.class_name(), "Mailer");
	/// assert!(mailer.downcast_ref::<Mailer>().is_some());
	/// ```
	pub fn new<T: Any + Send + Sync>(class: impl Into<Arc<str>>, object: T) -> Self {
		Self {
			class: class.into(),
			object: Arc::new(object),
		}
	}

	/// Wrap an object that is already shared.
	pub fn from_arc(class: impl Into<Arc<str>>, object: Arc<dyn Any + Send + Sync>) -> Self {
		Self {
			class: class.into(),
			object,
		}
	}

	pub fn class_name(&self) -> &str {
		&self.class
	}

	pub fn is<T: Any>(&self) -> bool {
		self.object.is::<T>()
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.object.downcast_ref::<T>()
	}

	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.object.clone().downcast::<T>().ok()
	}

	/// Identity comparison: true when both handles point at the same object.
	pub fn ptr_eq(&self, other: &Instance) -> bool {
		Arc::ptr_eq(&self.object, &other.object)
	}
}

impl PartialEq for Instance {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instance")
			.field("class", &self.class)
			.field("at", &Arc::as_ptr(&self.object).cast::<()>())
			.finish()
	}
}

type CallableFn = dyn Fn(&Arguments) -> DiResult<Value> + Send + Sync;

/// A closure recipe with an explicit parameter schema.
#[derive(Clone)]
pub struct Callable {
	name: Option<Arc<str>>,
	parameters: Arc<[FormalParameter]>,
	func: Arc<CallableFn>,
}

impl Callable {
	/// Create a closure that declares the given formal parameters.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::{Callable, FormalParameter, Signature, Value};
	///
	/// let greet = Callable::new(vec![FormalParameter::new("name")], |args| {
	///     Ok(Value::from(format!("hello {}", args.str(0)?)))
	/// });
	/// assert_eq!(greet.parameters().len(), 1);
	/// ```
	pub fn new<F>(parameters: Vec<FormalParameter>, func: F) -> Self
	where
		F: Fn(&Arguments) -> DiResult<Value> + Send + Sync + 'static,
	{
		Self {
			name: None,
			parameters: parameters.into(),
			func: Arc::new(func),
		}
	}

	/// Closure without formal parameters.
	pub fn from_fn<F>(func: F) -> Self
	where
		F: Fn() -> DiResult<Value> + Send + Sync + 'static,
	{
		Self::new(Vec::new(), move |_| func())
	}

	/// Attach a name used in logs and error messages.
	pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn invoke(&self, args: &Arguments) -> DiResult<Value> {
		(self.func)(args)
	}

	pub fn ptr_eq(&self, other: &Callable) -> bool {
		Arc::ptr_eq(&self.func, &other.func)
	}
}

impl Signature for Callable {
	fn parameters(&self) -> &[FormalParameter] {
		&self.parameters
	}
}

impl PartialEq for Callable {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl fmt::Debug for Callable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callable")
			.field("name", &self.name.as_deref().unwrap_or("{closure}"))
			.field("parameters", &self.parameters.len())
			.finish()
	}
}

/// Name of a Rust type, used when a downcast fails.
pub(crate) fn rust_type_name<T>() -> String {
	type_name::<T>().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Value::Null, false)]
	#[case(Value::Bool(false), false)]
	#[case(Value::Int(0), false)]
	#[case(Value::Float(0.0), false)]
	#[case(Value::from(""), false)]
	#[case(Value::from("0"), false)]
	#[case(Value::List(vec![]), false)]
	#[case(Value::Int(42), true)]
	#[case(Value::from("00"), true)]
	#[case(Value::List(vec![Value::Null]), true)]
	#[case(Value::Object(Instance::new("Unit", ())), true)]
	fn truthiness(#[case] value: Value, #[case] expected: bool) {
		assert_eq!(value.is_truthy(), expected);
	}

	#[rstest]
	fn objects_compare_by_identity() {
		// Arrange
		let first = Instance::new("Counter", 1u8);
		let second = Instance::new("Counter", 1u8);

		// Assert
		assert_eq!(Value::Object(first.clone()), Value::Object(first.clone()));
		assert_ne!(Value::Object(first), Value::Object(second));
	}

	#[rstest]
	fn downcast_to_concrete_type() {
		let value = Value::Object(Instance::new("Port", 8080u16));

		assert_eq!(value.downcast::<u16>().as_deref(), Some(&8080));
		assert!(value.downcast::<u32>().is_none());
		assert_eq!(value.kind(), "object(Port)");
	}
}
