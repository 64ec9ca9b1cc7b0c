//! Thread-local circular dependency detection
//!
//! Resolution is a plain synchronous call chain, so the ids currently being
//! resolved on this thread form a stack. Entering an id that is already on
//! the stack means the recipe (directly or transitively) needs itself.
//!
//! ## Features
//!
//! - **O(1) Circular Detection**: `HashSet` lookup per container and id
//! - **Depth Limiting**: a configurable maximum depth stops runaway chains
//! - **Per container**: two containers on the same thread never interfere
//! - **RAII**: automatic cleanup via [`ResolutionGuard`]

use std::cell::RefCell;
use std::collections::HashSet;

/// Default maximum resolution depth.
pub const MAX_RESOLUTION_DEPTH: usize = autowire_conf::DEFAULT_MAX_RESOLUTION_DEPTH;

type Key = (u64, String);

#[derive(Default)]
struct CycleDetectionState {
	resolution_set: HashSet<Key>,
	resolution_path: Vec<Key>,
}

thread_local! {
	static CYCLE_STATE: RefCell<CycleDetectionState> = RefCell::new(CycleDetectionState::default());
}

/// Record the start of resolving `id` in container `container`.
///
/// The returned guard removes the id from the stack when dropped.
pub fn begin_resolution(
	container: u64,
	id: &str,
	max_depth: usize,
) -> Result<ResolutionGuard, CycleError> {
	CYCLE_STATE.with(|state| {
		let mut state = state.borrow_mut();
		let key = (container, id.to_string());

		if state.resolution_set.contains(&key) {
			return Err(CycleError::CircularDependency {
				id: id.to_string(),
				path: build_cycle_path(&state, &key),
			});
		}

		let depth = state
			.resolution_path
			.iter()
			.filter(|(owner, _)| *owner == container)
			.count() + 1;
		if depth > max_depth {
			return Err(CycleError::MaxDepthExceeded(depth));
		}

		state.resolution_set.insert(key.clone());
		state.resolution_path.push(key.clone());
		Ok(ResolutionGuard { key })
	})
}

/// Ids of `container` currently being resolved on this thread, outermost first.
pub fn resolution_path(container: u64) -> Vec<String> {
	CYCLE_STATE.with(|state| {
		state
			.borrow()
			.resolution_path
			.iter()
			.filter(|(owner, _)| *owner == container)
			.map(|(_, id)| id.clone())
			.collect()
	})
}

fn build_cycle_path(state: &CycleDetectionState, key: &Key) -> String {
	let start = state
		.resolution_path
		.iter()
		.position(|entry| entry == key)
		.unwrap_or(0);
	let cycle: Vec<&str> = state.resolution_path[start..]
		.iter()
		.filter(|(owner, _)| *owner == key.0)
		.map(|(_, id)| id.as_str())
		.collect();
	format!("{} -> {}", cycle.join(" -> "), key.1)
}

/// RAII guard: removes its id from the resolution stack on drop.
#[derive(Debug)]
pub struct ResolutionGuard {
	key: Key,
}

impl Drop for ResolutionGuard {
	fn drop(&mut self) {
		let _ = CYCLE_STATE.try_with(|state| {
			let mut state = state.borrow_mut();
			state.resolution_set.remove(&self.key);
			if let Some(pos) = state.resolution_path.iter().rposition(|entry| *entry == self.key) {
				state.resolution_path.remove(pos);
			}
		});
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
	#[error("Circular dependency detected: {id}\n  Path: {path}")]
	CircularDependency { id: String, path: String },

	#[error("Maximum resolution depth exceeded: {0}")]
	MaxDepthExceeded(usize),
}
