//! Error types for service resolution

use crate::cycle_detection::CycleError;

/// Result alias used throughout the container.
pub type DiResult<T> = Result<T, DiError>;

/// Errors raised while registering, resolving or invoking services.
///
/// Every failure is raised at the point of detection and propagated to the
/// caller unchanged; the container never retries or falls back.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiError {
	/// `get` was called with an id that has no registration.
	#[error("No entry was found for '{0}' identifier.")]
	NotFound(String),

	/// A class required for construction is abstract, an interface, has a
	/// private constructor or has no factory at all.
	#[error("Class {0} is not instantiable")]
	NotInstantiable(String),

	/// A normalized call target is neither a closure nor a valid
	/// `(receiver, method)` pair.
	#[error("'{0}' is not callable")]
	NotCallable(String),

	/// A service id was re-entered while it was still being resolved.
	#[error("Circular dependency detected: {id}\n  Path: {path}")]
	CircularDependency {
		/// Id that was re-entered
		id: String,
		/// Resolution path, formatted as `a -> b -> a`
		path: String,
	},

	/// The resolution chain grew deeper than the configured limit.
	#[error("Maximum resolution depth exceeded: {0}")]
	MaxDepthExceeded(usize),

	/// A positional argument was missing or of the wrong kind.
	#[error("Argument #{index}: expected {expected}, found {found}")]
	Argument {
		index: usize,
		expected: &'static str,
		found: String,
	},

	/// A produced value could not be viewed as the requested Rust type.
	#[error("Type mismatch: expected {expected}, found {found}")]
	TypeMismatch { expected: String, found: String },

	/// A class factory reported a failure of its own.
	#[error("Failed to instantiate {class}: {message}")]
	Instantiation { class: String, message: String },
}

impl DiError {
	/// Build an [`DiError::Instantiation`] from inside a class factory.
	pub fn instantiation(class: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Instantiation {
			class: class.into(),
			message: message.into(),
		}
	}

	/// Whether this error means the requested id is simply absent.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}
}

impl From<CycleError> for DiError {
	fn from(err: CycleError) -> Self {
		match err {
			CycleError::CircularDependency { id, path } => Self::CircularDependency { id, path },
			CycleError::MaxDepthExceeded(depth) => Self::MaxDepthExceeded(depth),
		}
	}
}
