//! Memoized values of resolve-once services

use crate::error::DiResult;
use crate::value::Value;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Values produced by resolve-once services, keyed by service id.
///
/// Each id owns its own cell, so the first resolution of an id is single
/// flight: concurrent first resolutions wait for one producer instead of
/// running the recipe twice. A failed producer leaves the cell empty.
/// Once a value is stored it is never replaced.
#[derive(Default)]
pub struct InstanceStore {
	cells: RwLock<HashMap<String, Arc<OnceCell<Value>>>>,
}

impl InstanceStore {
	/// Creates an empty store.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::InstanceStore;
	///
	/// let store = InstanceStore::new();
	/// assert!(store.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// The memoized value of `id`, if it has been produced.
	///
	/// # Examples
	///
	/// ```
	/// use autowire_di::{InstanceStore, Value};
	///
	/// let store = InstanceStore::new();
	/// assert!(store.get("config").is_none());
	///
	/// store.get_or_try_init("config", || Ok(Value::Int(1))).unwrap();
	/// assert_eq!(store.get("config"), Some(Value::Int(1)));
	/// ```
	pub fn get(&self, id: &str) -> Option<Value> {
		let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
		cells.get(id).and_then(|cell| cell.get().cloned())
	}

	pub fn contains(&self, id: &str) -> bool {
		self.get(id).is_some()
	}

	/// Return the memoized value of `id`, producing it first if needed.
	///
	/// `produce` runs at most once per id across all threads unless it
	/// fails. It must not re-enter this method for the same id; the
	/// resolver guarantees that through cycle detection.
	pub fn get_or_try_init<F>(&self, id: &str, produce: F) -> DiResult<Value>
	where
		F: FnOnce() -> DiResult<Value>,
	{
		let cell = self.cell(id);
		cell.get_or_try_init(produce).cloned()
	}

	fn cell(&self, id: &str) -> Arc<OnceCell<Value>> {
		{
			let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
			if let Some(cell) = cells.get(id) {
				return Arc::clone(cell);
			}
		}
		let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
		Arc::clone(cells.entry(id.to_string()).or_default())
	}

	/// Number of memoized values.
	pub fn len(&self) -> usize {
		let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
		cells.values().filter(|cell| cell.get().is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drop every memoized value. Only meant for container teardown.
	pub fn clear(&self) {
		let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
		cells.clear();
	}
}

impl std::fmt::Debug for InstanceStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InstanceStore")
			.field("memoized", &self.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DiError;
	use rstest::rstest;
	use std::sync::Barrier;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::thread;

	#[rstest]
	fn first_value_wins() {
		// Arrange
		let store = InstanceStore::new();

		// Act
		let first = store.get_or_try_init("id", || Ok(Value::Int(1))).unwrap();
		let second = store.get_or_try_init("id", || Ok(Value::Int(2))).unwrap();

		// Assert
		assert_eq!(first, Value::Int(1));
		assert_eq!(second, Value::Int(1));
		assert_eq!(store.len(), 1);
	}

	#[rstest]
	fn failure_leaves_cell_empty() {
		let store = InstanceStore::new();

		let err = store
			.get_or_try_init("id", || Err(DiError::NotInstantiable("X".into())))
			.unwrap_err();

		assert_eq!(err, DiError::NotInstantiable("X".into()));
		assert!(!store.contains("id"));
		assert_eq!(store.get_or_try_init("id", || Ok(Value::Int(3))).unwrap(), Value::Int(3));
	}

	#[rstest]
	fn concurrent_first_resolution_runs_once() {
		// Arrange
		let store = Arc::new(InstanceStore::new());
		let runs = Arc::new(AtomicUsize::new(0));
		let barrier = Arc::new(Barrier::new(8));

		// Act
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let store = Arc::clone(&store);
				let runs = Arc::clone(&runs);
				let barrier = Arc::clone(&barrier);
				thread::spawn(move || {
					barrier.wait();
					store
						.get_or_try_init("shared", || {
							runs.fetch_add(1, Ordering::SeqCst);
							Ok(Value::from("value"))
						})
						.unwrap()
				})
			})
			.collect();

		// Assert
		for handle in handles {
			assert_eq!(handle.join().unwrap(), Value::from("value"));
		}
		assert_eq!(runs.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	fn clear_forgets_everything() {
		let store = InstanceStore::new();
		store.get_or_try_init("a", || Ok(Value::Int(1))).unwrap();

		store.clear();

		assert!(store.is_empty());
	}
}
