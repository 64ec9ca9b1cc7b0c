//! Invoking closures and methods with resolved arguments

use super::{Resolver, collapse};
use crate::error::{DiError, DiResult};
use crate::reflection::Signature;
use crate::registry::{Recipe, ServiceEntry};
use crate::value::{Callable, Value};

const GENERIC_TARGET: &str = "Closure or Function";
const GENERIC_METHOD: &str = "Method";

/// A call target after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
	Closure(Callable),
	/// `[receiver, method]`; the receiver is an object or a class name.
	Method { receiver: Value, method: Value },
	/// Anything that cannot be invoked.
	Invalid(Value),
}

impl CallTarget {
	/// Normalize the accepted call shapes.
	///
	/// - `"Class@method"` with exactly one `@` becomes a method target.
	/// - A two element list becomes `(receiver, method)`; lists of any other
	///   length are not callable.
	/// - A closure stays a closure.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::{CallTarget, Value};
	///
	/// let target = CallTarget::normalize(Value::from("Mailer@send"));
	/// assert_eq!(
	///     target,
	///     CallTarget::Method {
	///         receiver: Value::from("Mailer"),
	///         method: Value::from("send"),
	///     }
	/// );
	/// ```
	pub fn normalize(target: Value) -> Self {
		match target {
			Value::Str(text) if text.contains('@') => {
				let parts: Vec<String> = text.split('@').map(str::to_owned).collect();
				if parts.len() != 2 {
					return CallTarget::Invalid(Value::Str(text));
				}
				let mut parts = parts.into_iter().map(Value::Str);
				CallTarget::Method {
					receiver: parts.next().unwrap_or_default(),
					method: parts.next().unwrap_or_default(),
				}
			}
			Value::List(items) if items.len() == 2 => {
				let mut items = items.into_iter();
				let receiver = items.next().unwrap_or_default();
				let method = items.next().unwrap_or_default();
				CallTarget::Method { receiver, method }
			}
			Value::List(_) => CallTarget::Invalid(Value::List(Vec::new())),
			Value::Callable(callable) => CallTarget::Closure(callable),
			other => CallTarget::Invalid(other),
		}
	}
}

impl Resolver<'_> {
	/// Invoke a closure recipe with resolved arguments.
	pub fn resolve_callable(&self, callable: &Callable, args: Vec<Value>) -> DiResult<Value> {
		let args = self.resolve_arguments(callable.parameters(), &collapse(args))?;
		tracing::debug!(
			callable = callable.name().unwrap_or("{closure}"),
			arguments = args.len(),
			"invoking closure"
		);
		callable.invoke(&args)
	}

	/// Invoke any supported call target.
	pub fn call(&self, target: Value, args: Vec<Value>) -> DiResult<Value> {
		match CallTarget::normalize(target) {
			CallTarget::Closure(callable) => self.resolve_callable(&callable, args),
			CallTarget::Method { receiver, method } => {
				let receiver = match receiver {
					Value::Str(class) => self.receiver_for_class(&class)?,
					other => other,
				};
				self.call_method(&receiver, &method, args)
			}
			CallTarget::Invalid(_) => Err(DiError::NotCallable(GENERIC_TARGET.to_string())),
		}
	}

	fn call_method(&self, receiver: &Value, method: &Value, args: Vec<Value>) -> DiResult<Value> {
		let Some(name) = method.as_str() else {
			return Err(DiError::NotCallable(GENERIC_METHOD.to_string()));
		};
		let not_callable = || DiError::NotCallable(name.to_string());
		let object = receiver.as_object().ok_or_else(not_callable)?;
		let method = self
			.container
			.catalog()
			.get(object.class_name())
			.and_then(|class| class.method(name).cloned())
			.ok_or_else(not_callable)?;

		let args = self.resolve_arguments(method.parameters(), &collapse(args))?;
		tracing::debug!(
			class = object.class_name(),
			method = name,
			arguments = args.len(),
			"invoking method"
		);
		method.invoke(object, &args)
	}

	/// The receiver for a `(class-name, method)` target.
	///
	/// A registered service producing an object of `class` is used when
	/// one exists. Only services whose class is known without running a
	/// closure are considered. Otherwise a transient object is made and
	/// the registration created for it is dropped again.
	fn receiver_for_class(&self, class: &str) -> DiResult<Value> {
		let catalog = self.container.catalog();
		let store = self.container.store();

		for (id, entry) in self.container.registry().snapshot() {
			let produced_class = match store.get(&id) {
				Some(Value::Object(object)) => Some(object.class_name().to_string()),
				Some(_) => None,
				None => match entry.recipe() {
					Recipe::Object(object) => Some(object.class_name().to_string()),
					Recipe::Class(name) if catalog.contains(name) => Some(name.clone()),
					_ => None,
				},
			};
			if produced_class.as_deref() == Some(class) {
				tracing::trace!(id = %id, class, "receiver taken from registered service");
				return self.resolve_service(&id, &entry, Vec::new());
			}
		}

		let registry = self.container.registry();
		let auto_registered =
			registry.insert_if_absent(class, ServiceEntry::new(Recipe::Class(class.to_string())));
		let receiver = self.resolve_id(class, Vec::new());
		if auto_registered && self.container.settings().forget_transient_receivers {
			registry.remove(class);
			tracing::debug!(class, "transient receiver registration removed");
		}
		receiver
	}
}
