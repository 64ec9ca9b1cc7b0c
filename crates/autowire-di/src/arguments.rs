//! Positional argument lists handed to closures, constructors and methods

use crate::error::{DiError, DiResult};
use crate::value::{Instance, Value, rust_type_name};
use std::any::Any;
use std::sync::Arc;

/// The concrete argument list produced by parameter resolution.
///
/// Arguments are positional. Because resolution drops falsy slots and may
/// append a declared default next to a supplied value, a slot index does not
/// always line up with the formal parameter index; factories should read
/// what they need by position and fall back when a slot is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
	values: Vec<Value>,
}

impl Arguments {
	pub fn new(values: Vec<Value>) -> Self {
		Self { values }
	}

	pub fn empty() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Value> {
		self.values.get(index)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Value> {
		self.values.iter()
	}

	pub fn as_slice(&self) -> &[Value] {
		&self.values
	}

	pub fn into_vec(self) -> Vec<Value> {
		self.values
	}

	/// The slot at `index`, or an error when it is missing.
	pub fn value(&self, index: usize) -> DiResult<&Value> {
		self.values.get(index).ok_or(DiError::Argument {
			index,
			expected: "a value",
			found: "nothing".to_string(),
		})
	}

	/// The object at `index`, whatever its class.
	pub fn instance(&self, index: usize) -> DiResult<&Instance> {
		let value = self.value(index)?;
		value.as_object().ok_or_else(|| mismatch(index, "an object", value))
	}

	/// The object at `index`, downcast to `T`.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::{Arguments, Instance, Value};
	///
	/// struct Pool(u8);
	///
	/// let args = Arguments::new(vec![Value::Object(Instance::new("Pool", Pool(4)))]);
	/// assert_eq!(args.object::<Pool>(0).unwrap().0, 4);
	/// assert!(args.object::<String>(0).is_err());
	/// ```
	pub fn object<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
		let instance = self.instance(index)?;
		instance.downcast::<T>().ok_or_else(|| DiError::TypeMismatch {
			expected: rust_type_name::<T>(),
			found: instance.class_name().to_string(),
		})
	}

	pub fn int(&self, index: usize) -> DiResult<i64> {
		let value = self.value(index)?;
		value.as_int().ok_or_else(|| mismatch(index, "an int", value))
	}

	pub fn float(&self, index: usize) -> DiResult<f64> {
		match self.value(index)? {
			Value::Float(f) => Ok(*f),
			Value::Int(i) => Ok(*i as f64),
			other => Err(mismatch(index, "a float", other)),
		}
	}

	pub fn bool(&self, index: usize) -> DiResult<bool> {
		match self.value(index)? {
			Value::Bool(b) => Ok(*b),
			other => Err(mismatch(index, "a bool", other)),
		}
	}

	pub fn str(&self, index: usize) -> DiResult<&str> {
		let value = self.value(index)?;
		value.as_str().ok_or_else(|| mismatch(index, "a string", value))
	}
}

impl From<Vec<Value>> for Arguments {
	fn from(values: Vec<Value>) -> Self {
		Self::new(values)
	}
}

impl IntoIterator for Arguments {
	type Item = Value;
	type IntoIter = std::vec::IntoIter<Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.values.into_iter()
	}
}

fn mismatch(index: usize, expected: &'static str, found: &Value) -> DiError {
	DiError::Argument {
		index,
		expected,
		found: found.kind(),
	}
}
