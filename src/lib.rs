//! # Autowire
//!
//! A service container that builds objects from registered recipes and
//! injects their constructor and call parameters automatically.
//!
//! ## Feature Flags
//!
//! - `di` - the container ([`autowire_di`])
//! - `conf` - layered settings ([`autowire_conf`])
//! - `full` (default) - both
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire::prelude::*;
//!
//! struct Greeter;
//!
//! let container = Container::new();
//! container.describe(
//!     ClassDescriptor::builder::<Greeter>("Greeter")
//!         .without_constructor(|| Greeter)
//!         .method("greet", vec![FormalParameter::new("name")], |_, args| {
//!             Ok(Value::from(format!("hello {}", args.str(0)?)))
//!         })
//!         .build(),
//! );
//!
//! let greeting = container.call("Greeter@greet", vec![Value::from("world")]).unwrap();
//! assert_eq!(greeting, Value::from("hello world"));
//! assert!(!container.has("Greeter"));
//! ```

#[cfg(feature = "di")]
pub use autowire_di as di;

#[cfg(feature = "conf")]
pub use autowire_conf as conf;

#[cfg(feature = "di")]
pub use autowire_di::{
	Arguments, Callable, ClassCatalog, ClassDescriptor, Container, DiError, DiResult,
	FormalParameter, Instance, Value,
};

#[cfg(feature = "conf")]
pub use autowire_conf::{ContainerSettings, SettingsBuilder, SettingsError};

/// Commonly used types
pub mod prelude {
	#[cfg(feature = "di")]
	pub use crate::{
		Arguments, Callable, ClassCatalog, ClassDescriptor, Container, DiError, DiResult,
		FormalParameter, Instance, Value,
	};

	#[cfg(feature = "conf")]
	pub use crate::{ContainerSettings, SettingsBuilder};
}
